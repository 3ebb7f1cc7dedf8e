//! The once-a-day task summary: who gets it, what goes in it, and how it reads.

use crate::filter::{Bucket, DayWindow, compare_by_deadline};
use crate::task::{TaskItem, TaskList};
use std::cmp::Ordering;
use std::fmt::Write;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const PRIVATE_SOURCE_NAME: &str = "Private Tasks";

/// Per-user reminder preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DailyPrefs {
    #[cfg_attr(feature = "serde", serde(default = "enabled_by_default"))]
    pub enabled: bool,
    /// Day of the last digest as `YYYY-MM-DD`, empty if none was ever sent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub last_message_date: String,
}

#[cfg(feature = "serde")]
fn enabled_by_default() -> bool {
    true
}

impl Default for DailyPrefs {
    fn default() -> Self {
        Self {
            enabled: true,
            last_message_date: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestState {
    Disabled,
    Armed,
    NotifiedToday,
}

impl DailyPrefs {
    pub fn state(&self, today: &str) -> DigestState {
        if !self.enabled {
            DigestState::Disabled
        } else if self.last_message_date == today {
            DigestState::NotifiedToday
        } else {
            DigestState::Armed
        }
    }

    /// Records today's digest if one is due. Returns `true` when the caller should send it.
    pub fn mark_notified(&mut self, today: &str) -> bool {
        if self.state(today) != DigestState::Armed {
            return false;
        }
        self.last_message_date = today.to_string();
        true
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Forgets the last digest and re-enables reminders.
    pub fn reset(&mut self) {
        self.last_message_date.clear();
        self.enabled = true;
    }
}

/// Where a digest task was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestSource {
    Channel(String),
    Private,
}

impl DigestSource {
    pub fn name(&self) -> &str {
        match self {
            DigestSource::Channel(name) => name,
            DigestSource::Private => PRIVATE_SOURCE_NAME,
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, DigestSource::Private)
    }
}

/// A task together with the context needed to place it in the digest.
#[derive(Debug, Clone, PartialEq)]
pub struct DigestEntry {
    pub task: TaskItem,
    pub source: DigestSource,
}

impl DigestEntry {
    /// Collects the tasks of a channel list assigned to `user_id`.
    pub fn from_channel(list: &TaskList, channel_name: &str, user_id: &str) -> Vec<DigestEntry> {
        let source = DigestSource::Channel(channel_name.to_string());
        entries(list, |item| item.is_assigned_to(user_id), source)
    }

    /// Collects every task of a user's private list.
    pub fn from_private(list: &TaskList) -> Vec<DigestEntry> {
        entries(list, |_| true, DigestSource::Private)
    }
}

fn entries(
    list: &TaskList,
    keep: impl Fn(&TaskItem) -> bool,
    source: DigestSource,
) -> Vec<DigestEntry> {
    list.items
        .iter()
        .filter(|item| keep(*item))
        .map(|item| DigestEntry {
            task: item.clone(),
            source: source.clone(),
        })
        .collect()
}

/// Digest entries sorted into the sections of the message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DigestSections {
    pub completed_yesterday: Vec<DigestEntry>,
    pub overdue: Vec<DigestEntry>,
    pub today: Vec<DigestEntry>,
    pub this_week: Vec<DigestEntry>,
    pub other: Vec<DigestEntry>,
}

impl DigestSections {
    /// Files each entry under its section.
    ///
    /// Completed tasks only appear if they were completed yesterday. Private tasks
    /// without a deadline are left out.
    pub fn categorize(entries: Vec<DigestEntry>, window: &DayWindow) -> Self {
        let mut sections = Self::default();
        for entry in entries {
            if entry.task.completed {
                if entry
                    .task
                    .completed_at
                    .is_some_and(|completed_at| window.is_yesterday(completed_at))
                {
                    sections.completed_yesterday.push(entry);
                }
                continue;
            }
            if entry.source.is_private() && entry.task.deadline.is_none() {
                continue;
            }
            match window.bucket(entry.task.deadline) {
                Bucket::Overdue => sections.overdue.push(entry),
                Bucket::Today => sections.today.push(entry),
                Bucket::ThisWeek => sections.this_week.push(entry),
                Bucket::Other => sections.other.push(entry),
            }
        }
        for section in [
            &mut sections.completed_yesterday,
            &mut sections.overdue,
            &mut sections.today,
            &mut sections.this_week,
            &mut sections.other,
        ] {
            section.sort_by(compare_entries);
        }
        sections
    }

    pub fn is_empty(&self) -> bool {
        self.completed_yesterday.is_empty()
            && self.overdue.is_empty()
            && self.today.is_empty()
            && self.this_week.is_empty()
            && self.other.is_empty()
    }

    /// Renders the digest message, or `None` when there is nothing to report.
    pub fn compose(&self, window: &DayWindow) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let mut message = String::from("### Your Daily Task Summary\n\n\n---\n");
        let sections = [
            ("🟩 **Completed Yesterday**", &self.completed_yesterday),
            ("🟥 **Past Due**", &self.overdue),
            ("🟧 **Due Today**", &self.today),
            ("🟨 **Due Within 1 Week**", &self.this_week),
            ("⬜ **Everything Else**", &self.other),
        ];
        for (heading, entries) in sections {
            if entries.is_empty() {
                continue;
            }
            let _ = write!(message, "{}\n\n", heading);
            write_entries(&mut message, entries, window);
            message.push_str("\n---\n");
        }
        message.push_str("_Use `/tasks-message-off` to disable these reminders._\n\n---\n");
        Some(message)
    }
}

/// Channel tasks before private ones, then by channel name, then by deadline and text.
fn compare_entries(a: &DigestEntry, b: &DigestEntry) -> Ordering {
    a.source
        .is_private()
        .cmp(&b.source.is_private())
        .then_with(|| a.source.name().cmp(b.source.name()))
        .then_with(|| compare_by_deadline(&a.task, &b.task))
}

fn write_entries(message: &mut String, entries: &[DigestEntry], window: &DayWindow) {
    let mut current_source: Option<&str> = None;
    for entry in entries {
        let source = entry.source.name();
        if current_source != Some(source) {
            let _ = writeln!(message, "**{}**", source);
            current_source = Some(source);
        }
        let deadline = entry
            .task
            .deadline
            .map(|deadline| format!(" | _due {}_", window.short_date(deadline)))
            .unwrap_or_default();
        let _ = writeln!(message, "- {}{}", entry.task.text, deadline);
    }
}
