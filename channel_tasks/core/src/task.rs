use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize};

pub type TaskId = String;
pub type GroupId = String;
pub type UserId = String;

/// Generates a new opaque identifier for a task or a group.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// A single entry of a task list.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskItem {
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: TaskId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub text: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub notes: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub completed: bool,
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            skip_serializing_if = "Vec::is_empty",
            deserialize_with = "null_as_empty"
        )
    )]
    pub assignee_ids: Vec<UserId>,
    /// Reference to a group of the same list. An empty string on the wire means ungrouped.
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            skip_serializing_if = "Option::is_none",
            deserialize_with = "empty_as_none"
        )
    )]
    pub group_id: Option<GroupId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub created_at: DateTime<Utc>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub completed_at: Option<DateTime<Utc>>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub deadline: Option<DateTime<Utc>>,
}

impl TaskItem {
    /// Creates an incomplete, unassigned task with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_assignee(mut self, user_id: impl Into<UserId>) -> Self {
        self.assignee_ids.push(user_id.into());
        self
    }

    pub fn in_group(mut self, group_id: impl Into<GroupId>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    /// Returns whether the given user is one of the task's assignees.
    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assignee_ids.iter().any(|id| id == user_id)
    }
}

/// A named bucket tasks can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskGroup {
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: GroupId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Free-form ordering token supplied by the client.
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            skip_serializing_if = "Option::is_none",
            deserialize_with = "empty_as_none"
        )
    )]
    pub order: Option<String>,
}

impl TaskGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskListError {
    #[error("Task {0} not found")]
    TaskNotFound(TaskId),
    #[error("Group {0} not found")]
    GroupNotFound(GroupId),
}

/// All tasks and groups owned by one scope (a channel or a user's private space).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskList {
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "null_as_empty"))]
    pub items: Vec<TaskItem>,
    #[cfg_attr(feature = "serde", serde(default, deserialize_with = "null_as_empty"))]
    pub groups: Vec<TaskGroup>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_ever_had_tasks: bool,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task, assigning it a fresh id and creation timestamp.
    pub fn add_item(&mut self, mut item: TaskItem, now: DateTime<Utc>) -> &TaskItem {
        item.id = new_id();
        item.created_at = now;
        item.completed_at = if item.completed { Some(now) } else { None };
        self.has_ever_had_tasks = true;
        self.items.push(item);
        &self.items[self.items.len() - 1]
    }

    /// Replaces the task with the same id.
    ///
    /// Clients reorder tasks by sending a new creation timestamp, so `created_at` is taken
    /// from `updated` unless it was left unset. The completion timestamp is stamped with
    /// `now` only when the task goes from incomplete to complete and is otherwise carried
    /// over unchanged.
    pub fn update_item(
        &mut self,
        updated: TaskItem,
        now: DateTime<Utc>,
    ) -> Result<&TaskItem, TaskListError> {
        let existing = self
            .items
            .iter_mut()
            .find(|item| item.id == updated.id)
            .ok_or_else(|| TaskListError::TaskNotFound(updated.id.clone()))?;

        let completed_at = if updated.completed && !existing.completed {
            Some(now)
        } else {
            existing.completed_at
        };
        let created_at = if updated.created_at == DateTime::<Utc>::default() {
            existing.created_at
        } else {
            updated.created_at
        };
        *existing = TaskItem {
            created_at,
            completed_at,
            ..updated
        };
        Ok(&*existing)
    }

    /// Removes the task with the given id and returns it.
    pub fn remove_item(&mut self, id: &str) -> Result<TaskItem, TaskListError> {
        let position = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| TaskListError::TaskNotFound(id.to_string()))?;
        Ok(self.items.remove(position))
    }

    /// Appends a group, assigning it a fresh id.
    pub fn add_group(&mut self, mut group: TaskGroup) -> &TaskGroup {
        group.id = new_id();
        self.groups.push(group);
        &self.groups[self.groups.len() - 1]
    }

    /// Replaces the group with the same id.
    pub fn update_group(&mut self, updated: TaskGroup) -> Result<&TaskGroup, TaskListError> {
        let existing = self
            .groups
            .iter_mut()
            .find(|group| group.id == updated.id)
            .ok_or_else(|| TaskListError::GroupNotFound(updated.id.clone()))?;
        *existing = updated;
        Ok(&*existing)
    }

    /// Removes the group with the given id and ungroups every task that referenced it.
    pub fn remove_group(&mut self, id: &str) -> Result<TaskGroup, TaskListError> {
        let position = self
            .groups
            .iter()
            .position(|group| group.id == id)
            .ok_or_else(|| TaskListError::GroupNotFound(id.to_string()))?;
        let removed = self.groups.remove(position);
        for item in self
            .items
            .iter_mut()
            .filter(|item| item.group_id.as_deref() == Some(id))
        {
            item.group_id = None;
        }
        Ok(removed)
    }

    /// Maps group ids to their display names.
    pub fn group_names(&self) -> HashMap<&str, &str> {
        self.groups
            .iter()
            .map(|group| (group.id.as_str(), group.name.as_str()))
            .collect()
    }
}

#[cfg(feature = "serde")]
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(feature = "serde")]
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|value| !value.is_empty()))
}
