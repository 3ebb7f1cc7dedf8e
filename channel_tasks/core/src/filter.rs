//! Deadline buckets, named filters and ordering for task collections.

use crate::task::TaskItem;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use std::cmp::Ordering;

/// Deadline classification of a task relative to the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Overdue,
    Today,
    ThisWeek,
    Other,
}

/// The day boundaries every classification is computed against.
///
/// `today_start` is local midnight in the offset `now` was observed in. The end of
/// today and the end of the week are exclusive upper bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayWindow {
    offset: FixedOffset,
    today: NaiveDate,
    today_start: DateTime<Utc>,
    today_end: DateTime<Utc>,
    tomorrow_end: DateTime<Utc>,
    week_end: DateTime<Utc>,
}

impl DayWindow {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        let offset = *now.offset();
        let today = now.date_naive();
        let local_midnight = today.and_time(NaiveTime::MIN);
        let today_start = (local_midnight
            - TimeDelta::seconds(i64::from(offset.local_minus_utc())))
        .and_utc();
        Self {
            offset,
            today,
            today_start,
            today_end: today_start + TimeDelta::days(1),
            tomorrow_end: today_start + TimeDelta::days(2),
            week_end: today_start + TimeDelta::days(7),
        }
    }

    pub fn today_start(&self) -> DateTime<Utc> {
        self.today_start
    }

    /// The calendar date of today as `YYYY-MM-DD`.
    pub fn today_key(&self) -> String {
        self.today.format("%Y-%m-%d").to_string()
    }

    /// Classifies a deadline. Tasks without a deadline always land in [`Bucket::Other`].
    pub fn bucket(&self, deadline: Option<DateTime<Utc>>) -> Bucket {
        match deadline {
            None => Bucket::Other,
            Some(deadline) if deadline < self.today_start => Bucket::Overdue,
            Some(deadline) if deadline < self.today_end => Bucket::Today,
            Some(deadline) if deadline < self.week_end => Bucket::ThisWeek,
            Some(_) => Bucket::Other,
        }
    }

    /// Returns whether `at` falls on the local calendar day before today.
    pub fn is_yesterday(&self, at: DateTime<Utc>) -> bool {
        at.with_timezone(&self.offset).date_naive().succ_opt() == Some(self.today)
    }

    /// Formats a timestamp as a short local date such as `Mon Jun 3`.
    pub fn short_date(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).format("%a %b %-d").to_string()
    }

    /// Describes a deadline relative to today: `Today`, `Tomorrow`, or a short date.
    pub fn relative_deadline(&self, deadline: DateTime<Utc>) -> String {
        if deadline < self.today_start {
            self.short_date(deadline)
        } else if deadline < self.today_end {
            "Today".to_string()
        } else if deadline < self.tomorrow_end {
            "Tomorrow".to_string()
        } else {
            self.short_date(deadline)
        }
    }
}

/// Named selections over a task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskFilter {
    All,
    Mine,
    Today,
    Overdue,
    Incomplete,
    Complete,
    /// Incomplete tasks for the requester, narrowed to the most urgent non-empty bucket.
    Todo,
}

impl TaskFilter {
    /// Human readable title used in listing headers.
    pub fn label(&self) -> &'static str {
        match self {
            TaskFilter::All => "All",
            TaskFilter::Mine => "Assigned to Me",
            TaskFilter::Today => "Due Today",
            TaskFilter::Overdue => "Overdue",
            TaskFilter::Incomplete => "Incomplete",
            TaskFilter::Complete => "Complete",
            TaskFilter::Todo => "To Do",
        }
    }
}

/// Selects the tasks matching `filter` and returns them in display order.
///
/// `requester` restricts `Mine` and `Todo` to tasks assigned to that user. Private
/// lists pass `None`, which leaves assignment unconstrained.
pub fn filter_tasks<'a>(
    items: &'a [TaskItem],
    filter: TaskFilter,
    window: &DayWindow,
    requester: Option<&str>,
) -> Vec<&'a TaskItem> {
    let assigned = |item: &TaskItem| requester.is_none_or(|user| item.is_assigned_to(user));

    let mut selected: Vec<&TaskItem> = match filter {
        TaskFilter::All => items.iter().collect(),
        TaskFilter::Mine => items.iter().filter(|item| assigned(*item)).collect(),
        TaskFilter::Today => items
            .iter()
            .filter(|item| item.deadline.is_some() && window.bucket(item.deadline) == Bucket::Today)
            .collect(),
        TaskFilter::Overdue => items
            .iter()
            .filter(|item| window.bucket(item.deadline) == Bucket::Overdue)
            .collect(),
        TaskFilter::Incomplete => items.iter().filter(|item| !item.completed).collect(),
        TaskFilter::Complete => items.iter().filter(|item| item.completed).collect(),
        TaskFilter::Todo => {
            let candidates = items
                .iter()
                .filter(|item| !item.completed && assigned(*item))
                .collect();
            most_urgent(candidates, window)
        }
    };
    sort_tasks(&mut selected);
    selected
}

/// Narrows tasks to overdue ones if any, else due today, else due this week, else all of them.
fn most_urgent<'a>(candidates: Vec<&'a TaskItem>, window: &DayWindow) -> Vec<&'a TaskItem> {
    for bucket in [Bucket::Overdue, Bucket::Today, Bucket::ThisWeek] {
        let matching: Vec<&TaskItem> = candidates
            .iter()
            .copied()
            .filter(|item| item.deadline.is_some() && window.bucket(item.deadline) == bucket)
            .collect();
        if !matching.is_empty() {
            return matching;
        }
    }
    candidates
}

/// Orders by deadline ascending with undated tasks last, then by text.
pub fn compare_by_deadline(a: &TaskItem, b: &TaskItem) -> Ordering {
    let by_deadline = match (a.deadline, b.deadline) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_deadline.then_with(|| a.text.cmp(&b.text))
}

pub fn sort_tasks(tasks: &mut [&TaskItem]) {
    tasks.sort_by(|a, b| compare_by_deadline(a, b));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
    }

    /// Wednesday 2024-06-05 10:00 UTC.
    fn window() -> DayWindow {
        DayWindow::new(utc(5, 10).fixed_offset())
    }

    mod day_window_tests {
        use super::*;

        #[test]
        fn today_starts_at_local_midnight() {
            let tz = FixedOffset::east_opt(2 * 3600).unwrap();
            let now = tz.with_ymd_and_hms(2024, 6, 5, 1, 30, 0).unwrap();

            let window = DayWindow::new(now);

            assert_eq!(window.today_start(), Utc.with_ymd_and_hms(2024, 6, 4, 22, 0, 0).unwrap());
            assert_eq!(
                window.bucket(Some(Utc.with_ymd_and_hms(2024, 6, 5, 22, 0, 0).unwrap())),
                Bucket::ThisWeek
            );
            assert_eq!(window.today_key(), "2024-06-05");
        }

        #[test]
        fn deadline_at_start_of_today_is_due_today() {
            assert_eq!(window().bucket(Some(utc(5, 0))), Bucket::Today);
        }

        #[test]
        fn deadline_just_before_start_of_today_is_overdue() {
            let deadline = utc(5, 0) - TimeDelta::seconds(1);
            assert_eq!(window().bucket(Some(deadline)), Bucket::Overdue);
        }

        #[test]
        fn deadline_at_end_of_today_is_this_week() {
            assert_eq!(window().bucket(Some(utc(6, 0))), Bucket::ThisWeek);
        }

        #[test]
        fn deadline_at_end_of_week_is_other() {
            assert_eq!(window().bucket(Some(utc(12, 0))), Bucket::Other);
        }

        #[test]
        fn deadline_just_before_end_of_week_is_this_week() {
            let deadline = utc(12, 0) - TimeDelta::seconds(1);
            assert_eq!(window().bucket(Some(deadline)), Bucket::ThisWeek);
        }

        #[test]
        fn missing_deadline_is_other() {
            assert_eq!(window().bucket(None), Bucket::Other);
        }

        #[test]
        fn can_tell_yesterday_apart() {
            let window = window();
            assert!(window.is_yesterday(utc(4, 23)));
            assert!(window.is_yesterday(utc(4, 0)));
            assert!(!window.is_yesterday(utc(5, 0)));
            assert!(!window.is_yesterday(utc(3, 23)));
        }

        #[test]
        fn describes_deadlines_relative_to_today() {
            let window = window();
            assert_eq!(window.relative_deadline(utc(5, 18)), "Today");
            assert_eq!(window.relative_deadline(utc(6, 9)), "Tomorrow");
            assert_eq!(window.relative_deadline(utc(7, 9)), "Fri Jun 7");
            assert_eq!(window.relative_deadline(utc(3, 9)), "Mon Jun 3");
        }
    }

    mod filter_tests {
        use super::*;

        fn texts(tasks: &[&TaskItem]) -> Vec<String> {
            tasks.iter().map(|task| task.text.clone()).collect()
        }

        #[test]
        fn mine_keeps_only_tasks_assigned_to_requester() {
            let items = vec![
                TaskItem::new("mine").with_assignee("alice"),
                TaskItem::new("theirs").with_assignee("bob"),
                TaskItem::new("shared").with_assignee("bob").with_assignee("alice"),
            ];

            let selected = filter_tasks(&items, TaskFilter::Mine, &window(), Some("alice"));

            assert_eq!(texts(&selected), vec!["mine", "shared"]);
        }

        #[test]
        fn today_and_overdue_ignore_undated_tasks() {
            let items = vec![
                TaskItem::new("undated"),
                TaskItem::new("late").with_deadline(utc(4, 9)),
                TaskItem::new("due").with_deadline(utc(5, 17)),
            ];

            let today = filter_tasks(&items, TaskFilter::Today, &window(), None);
            let overdue = filter_tasks(&items, TaskFilter::Overdue, &window(), None);

            assert_eq!(texts(&today), vec!["due"]);
            assert_eq!(texts(&overdue), vec!["late"]);
        }

        #[test]
        fn complete_and_incomplete_split_on_completion() {
            let items = vec![TaskItem::new("open"), TaskItem::new("done").completed()];

            let complete = filter_tasks(&items, TaskFilter::Complete, &window(), None);
            let incomplete = filter_tasks(&items, TaskFilter::Incomplete, &window(), None);

            assert_eq!(texts(&complete), vec!["done"]);
            assert_eq!(texts(&incomplete), vec!["open"]);
        }

        #[test]
        fn todo_prefers_overdue_over_this_week() {
            let items = vec![
                TaskItem::new("next week").with_deadline(utc(8, 9)).with_assignee("alice"),
                TaskItem::new("late").with_deadline(utc(2, 9)).with_assignee("alice"),
            ];

            let selected = filter_tasks(&items, TaskFilter::Todo, &window(), Some("alice"));

            assert_eq!(texts(&selected), vec!["late"]);
        }

        #[test]
        fn todo_falls_back_to_every_incomplete_assigned_task() {
            let items = vec![
                TaskItem::new("someday").with_assignee("alice"),
                TaskItem::new("far").with_deadline(utc(28, 9)).with_assignee("alice"),
                TaskItem::new("done").with_deadline(utc(5, 12)).with_assignee("alice").completed(),
                TaskItem::new("not mine").with_deadline(utc(5, 12)).with_assignee("bob"),
            ];

            let selected = filter_tasks(&items, TaskFilter::Todo, &window(), Some("alice"));

            assert_eq!(texts(&selected), vec!["far", "someday"]);
        }

        #[test]
        fn todo_without_requester_considers_every_task() {
            let items = vec![
                TaskItem::new("soon").with_deadline(utc(5, 20)),
                TaskItem::new("later").with_deadline(utc(9, 9)),
            ];

            let selected = filter_tasks(&items, TaskFilter::Todo, &window(), None);

            assert_eq!(texts(&selected), vec!["soon"]);
        }
    }

    mod sort_tests {
        use super::*;

        #[test]
        fn dated_tasks_come_first_in_ascending_order() {
            let items = vec![
                TaskItem::new("b").with_deadline(utc(3, 0)),
                TaskItem::new("a"),
                TaskItem::new("c").with_deadline(utc(1, 0)),
            ];
            let mut tasks: Vec<&TaskItem> = items.iter().collect();

            sort_tasks(&mut tasks);

            let deadlines: Vec<Option<DateTime<Utc>>> =
                tasks.iter().map(|task| task.deadline).collect();
            assert_eq!(deadlines, vec![Some(utc(1, 0)), Some(utc(3, 0)), None]);
        }

        #[test]
        fn equal_deadlines_are_ordered_by_text() {
            let items = vec![
                TaskItem::new("zebra").with_deadline(utc(3, 0)),
                TaskItem::new("apple").with_deadline(utc(3, 0)),
                TaskItem::new("undated b"),
                TaskItem::new("undated a"),
            ];
            let mut tasks: Vec<&TaskItem> = items.iter().collect();

            sort_tasks(&mut tasks);

            let texts: Vec<&str> = tasks.iter().map(|task| task.text.as_str()).collect();
            assert_eq!(texts, vec!["apple", "zebra", "undated a", "undated b"]);
        }
    }
}
