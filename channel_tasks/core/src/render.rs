//! Markdown listings of a single task list, as shown in reply to chat commands.

use crate::filter::{Bucket, DayWindow, TaskFilter, filter_tasks};
use crate::task::{TaskItem, TaskList};
use std::fmt::Write;

/// Where a listing comes from, which decides its title and empty-state wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope<'a> {
    Channel { name: &'a str },
    Private,
}

impl ListingScope<'_> {
    fn icon(&self) -> &'static str {
        match self {
            ListingScope::Channel { .. } => "📋",
            ListingScope::Private => "🔒",
        }
    }

    fn title(&self, filter: TaskFilter) -> String {
        match self {
            ListingScope::Channel { name } => format!("### {} Tasks ({})", name, filter.label()),
            ListingScope::Private => format!("### 🔒 Private Tasks ({})", filter.label()),
        }
    }

    fn location(&self) -> String {
        match self {
            ListingScope::Channel { name } => format!("in **{}**", name),
            ListingScope::Private => "in your private tasks".to_string(),
        }
    }
}

/// Colored square describing a task's completion and urgency.
pub fn status_icon(item: &TaskItem, window: &DayWindow) -> &'static str {
    if item.completed {
        return "🟩";
    }
    match window.bucket(item.deadline) {
        Bucket::Overdue => "🟥",
        Bucket::Today => "🟧",
        Bucket::ThisWeek => "🟨",
        Bucket::Other => "⬜",
    }
}

/// Renders the tasks of `list` selected by `filter`.
///
/// `requester` is the user asking, used by the assignment-aware filters.
pub fn render_listing(
    list: &TaskList,
    filter: TaskFilter,
    window: &DayWindow,
    scope: ListingScope<'_>,
    requester: Option<&str>,
) -> String {
    if list.items.is_empty() {
        return empty_list_message(scope, list.has_ever_had_tasks);
    }

    let selected = filter_tasks(&list.items, filter, window, requester);
    if selected.is_empty() {
        return empty_filter_message(filter, scope);
    }

    let group_names = list.group_names();
    let mut listing = format!("{}\n\n", scope.title(filter));
    for item in selected {
        let group = item
            .group_id
            .as_deref()
            .and_then(|id| group_names.get(id))
            .map(|name| format!(" | **{}**", name))
            .unwrap_or_default();
        let deadline = item
            .deadline
            .map(|deadline| format!(" | _due {}_", window.relative_deadline(deadline)))
            .unwrap_or_default();
        let _ = writeln!(
            listing,
            "- {} {}{}{}",
            status_icon(item, window),
            item.text,
            group,
            deadline
        );
    }
    listing
}

fn empty_list_message(scope: ListingScope<'_>, has_ever_had_tasks: bool) -> String {
    match scope {
        ListingScope::Private => {
            "🔒 No private tasks yet. Use the task sidebar to add some!".to_string()
        }
        ListingScope::Channel { name } if has_ever_had_tasks => {
            format!("📋 No tasks in **{}**.", name)
        }
        ListingScope::Channel { name } => format!(
            "📋 No tasks in **{}** yet. Use the task sidebar to add some!",
            name
        ),
    }
}

pub fn empty_filter_message(filter: TaskFilter, scope: ListingScope<'_>) -> String {
    let icon = scope.icon();
    let location = scope.location();
    match filter {
        TaskFilter::Mine => format!("{} No tasks assigned to you {}.", icon, location),
        TaskFilter::Today => format!("{} No tasks due today {}. 🎉", icon, location),
        TaskFilter::Incomplete => format!("{} All tasks are complete {}! 🎉", icon, location),
        TaskFilter::Complete => format!("{} No completed tasks {} yet.", icon, location),
        TaskFilter::Todo => match scope {
            ListingScope::Private => format!("{} Nothing on your private to-do list! 🎉", icon),
            ListingScope::Channel { .. } => {
                format!("{} Nothing on your to-do list {}! 🎉", icon, location)
            }
        },
        TaskFilter::All | TaskFilter::Overdue => {
            format!("{} No tasks match this filter {}.", icon, location)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskGroup;
    use chrono::{DateTime, TimeZone, Utc};

    fn utc(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
    }

    fn window() -> DayWindow {
        DayWindow::new(utc(5, 10).fixed_offset())
    }

    #[test]
    fn can_pick_status_icons() {
        let window = window();
        assert_eq!(status_icon(&TaskItem::new("a").completed(), &window), "🟩");
        assert_eq!(status_icon(&TaskItem::new("a"), &window), "⬜");
        assert_eq!(status_icon(&TaskItem::new("a").with_deadline(utc(1, 0)), &window), "🟥");
        assert_eq!(status_icon(&TaskItem::new("a").with_deadline(utc(5, 20)), &window), "🟧");
        assert_eq!(status_icon(&TaskItem::new("a").with_deadline(utc(9, 0)), &window), "🟨");
        assert_eq!(status_icon(&TaskItem::new("a").with_deadline(utc(20, 0)), &window), "⬜");
    }

    #[test]
    fn can_render_channel_listing_with_groups_and_deadlines() {
        let mut list = TaskList::new();
        let group_id = list.add_group(TaskGroup::new("Launch")).id.clone();
        list.add_item(TaskItem::new("Write notes"), utc(1, 0));
        list.add_item(
            TaskItem::new("Ship it").with_deadline(utc(6, 9)).in_group(group_id),
            utc(1, 0),
        );
        list.add_item(TaskItem::new("Fix bug").with_deadline(utc(3, 9)), utc(1, 0));

        let listing = render_listing(
            &list,
            TaskFilter::All,
            &window(),
            ListingScope::Channel { name: "Town Square" },
            None,
        );

        assert_eq!(
            listing,
            "### Town Square Tasks (All)\n\n\
             - 🟥 Fix bug | _due Mon Jun 3_\n\
             - 🟨 Ship it | **Launch** | _due Tomorrow_\n\
             - ⬜ Write notes\n"
        );
    }

    #[test]
    fn private_listing_has_private_title() {
        let mut list = TaskList::new();
        list.add_item(TaskItem::new("Dentist").with_deadline(utc(5, 15)), utc(1, 0));

        let listing = render_listing(&list, TaskFilter::Todo, &window(), ListingScope::Private, None);

        assert_eq!(
            listing,
            "### 🔒 Private Tasks (To Do)\n\n- 🟧 Dentist | _due Today_\n"
        );
    }

    #[test]
    fn never_used_channel_gets_first_run_message() {
        let listing = render_listing(
            &TaskList::new(),
            TaskFilter::All,
            &window(),
            ListingScope::Channel { name: "dev" },
            None,
        );

        assert_eq!(
            listing,
            "📋 No tasks in **dev** yet. Use the task sidebar to add some!"
        );
    }

    #[test]
    fn emptied_channel_gets_plain_empty_message() {
        let mut list = TaskList::new();
        let id = list.add_item(TaskItem::new("a"), utc(1, 0)).id.clone();
        list.remove_item(&id).unwrap();

        let listing = render_listing(
            &list,
            TaskFilter::All,
            &window(),
            ListingScope::Channel { name: "dev" },
            None,
        );

        assert_eq!(listing, "📋 No tasks in **dev**.");
    }

    #[test]
    fn empty_filter_result_explains_itself() {
        let mut list = TaskList::new();
        list.add_item(TaskItem::new("a").with_assignee("bob"), utc(1, 0));

        let listing = render_listing(
            &list,
            TaskFilter::Mine,
            &window(),
            ListingScope::Channel { name: "dev" },
            Some("alice"),
        );

        assert_eq!(listing, "📋 No tasks assigned to you in **dev**.");
    }

    #[test]
    fn private_todo_empty_message_mentions_private_list() {
        assert_eq!(
            empty_filter_message(TaskFilter::Todo, ListingScope::Private),
            "🔒 Nothing on your private to-do list! 🎉"
        );
        assert_eq!(
            empty_filter_message(TaskFilter::Complete, ListingScope::Private),
            "🔒 No completed tasks in your private tasks yet."
        );
    }
}
