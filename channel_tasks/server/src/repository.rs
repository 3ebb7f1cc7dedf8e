//! Loading, saving and editing the task list of a channel or of a user's private space.

use crate::clock::Clock;
use crate::context::AppContext;
use crate::store::{KvStore, StoreError};
use channel_tasks_core::{TaskGroup, TaskItem, TaskList, TaskListError};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// The owner of a task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Channel(String),
    Private(String),
}

impl Scope {
    pub fn channel(channel_id: impl Into<String>) -> Self {
        Scope::Channel(channel_id.into())
    }

    pub fn private(user_id: impl Into<String>) -> Self {
        Scope::Private(user_id.into())
    }

    /// Store key holding this scope's list.
    pub fn key(&self) -> String {
        match self {
            Scope::Channel(channel_id) => format!("tasks_{}", channel_id),
            Scope::Private(user_id) => format!("private_tasks_{}", user_id),
        }
    }
}

/// Error type for task list operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The task or group to change does not exist.
    #[error(transparent)]
    NotFound(#[from] TaskListError),
    /// Represents a store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct TaskListRepository<'a> {
    store: &'a dyn KvStore,
}

impl<'a> TaskListRepository<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store }
    }

    /// Loads the list of `scope` for display.
    ///
    /// Never fails: a missing record, a store error or an undecodable record all read as
    /// an empty list.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self, scope: &Scope) -> TaskList {
        match self.try_load(scope).await {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!("Failed to read task list {}: {}", scope.key(), err);
                TaskList::new()
            }
        }
    }

    /// Loads the list of `scope` ahead of a change.
    ///
    /// Unlike [`TaskListRepository::load`], a store error is returned so that the
    /// following save cannot overwrite a list that merely failed to load.
    ///
    /// # Returns
    ///
    /// An empty list when the record is missing or cannot be decoded.
    #[tracing::instrument(skip(self))]
    pub async fn try_load(&self, scope: &Scope) -> Result<TaskList, StoreError> {
        let key = scope.key();
        let Some(bytes) = self.store.get(&key).await? else {
            return Ok(TaskList::new());
        };
        Ok(serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            tracing::warn!("Discarding undecodable task list {}: {}", key, err);
            TaskList::new()
        }))
    }

    #[tracing::instrument(skip(self, list), fields(items = list.items.len()))]
    pub async fn save(&self, scope: &Scope, list: &TaskList) -> Result<(), ServiceError> {
        let bytes = serde_json::to_vec(list)?;
        self.store.set(&scope.key(), bytes).await?;
        Ok(())
    }
}

/// CRUD on the tasks and groups of a single scope.
///
/// Every change is a read-modify-write of the whole list. Concurrent changes to the same
/// scope are last-write-wins.
pub struct TaskService<'a> {
    repository: TaskListRepository<'a>,
    clock: &'a dyn Clock,
}

impl<'a> TaskService<'a> {
    pub fn new(context: &'a AppContext) -> Self {
        Self {
            repository: TaskListRepository::new(context.store.as_ref()),
            clock: context.clock.as_ref(),
        }
    }

    /// Returns the whole list of `scope`, empty if it was never written.
    #[tracing::instrument(skip(self))]
    pub async fn task_list(&self, scope: &Scope) -> TaskList {
        self.repository.load(scope).await
    }

    /// Creates a new task.
    ///
    /// # Arguments
    ///
    /// * `scope` - The list to add the task to.
    /// * `item` - The task; its id and creation time are replaced.
    ///
    /// # Returns
    ///
    /// The task as stored.
    #[tracing::instrument(skip(self, item))]
    pub async fn create_task(&self, scope: &Scope, item: TaskItem) -> Result<TaskItem, ServiceError> {
        self.modify(scope, |list, now| Ok(list.add_item(item, now).clone()))
            .await
    }

    /// Replaces the task with the id of `item`.
    ///
    /// # Returns
    ///
    /// The task as stored, or `ServiceError::NotFound` if no task has that id.
    #[tracing::instrument(skip(self, item), fields(task_id = %item.id))]
    pub async fn update_task(&self, scope: &Scope, item: TaskItem) -> Result<TaskItem, ServiceError> {
        self.modify(scope, |list, now| list.update_item(item, now).cloned())
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, scope: &Scope, task_id: &str) -> Result<TaskItem, ServiceError> {
        self.modify(scope, |list, _| list.remove_item(task_id)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn groups(&self, scope: &Scope) -> Vec<TaskGroup> {
        self.repository.load(scope).await.groups
    }

    #[tracing::instrument(skip(self, group))]
    pub async fn create_group(
        &self,
        scope: &Scope,
        group: TaskGroup,
    ) -> Result<TaskGroup, ServiceError> {
        self.modify(scope, |list, _| Ok(list.add_group(group).clone()))
            .await
    }

    #[tracing::instrument(skip(self, group), fields(group_id = %group.id))]
    pub async fn update_group(
        &self,
        scope: &Scope,
        group: TaskGroup,
    ) -> Result<TaskGroup, ServiceError> {
        self.modify(scope, |list, _| list.update_group(group).cloned())
            .await
    }

    /// Deletes a group and ungroups the tasks that were in it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_group(
        &self,
        scope: &Scope,
        group_id: &str,
    ) -> Result<TaskGroup, ServiceError> {
        self.modify(scope, |list, _| list.remove_group(group_id))
            .await
    }

    /// Applies `change` to the stored list and saves it if the change succeeded.
    async fn modify<T>(
        &self,
        scope: &Scope,
        change: impl FnOnce(&mut TaskList, DateTime<Utc>) -> Result<T, TaskListError>,
    ) -> Result<T, ServiceError> {
        let mut list = self.repository.try_load(scope).await?;
        let result = change(&mut list, self.clock.now().to_utc())?;
        self.repository.save(scope, &list).await?;
        Ok(result)
    }
}
