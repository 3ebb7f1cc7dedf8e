//! REST endpoints for the tasks and groups of channels and of private lists.
//!
//! Channel endpoints take `channel_id` from the query string. Private endpoints take
//! `user_id` from the query string and fall back to the caller's identity. Deletes
//! take the entity id as `id`.

use axum::{
    Json, Router,
    extract::{Extension, Query, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use channel_tasks_core::{TaskGroup, TaskItem, TaskList};
use serde::Deserialize;

use super::ApiError;
use super::auth::CurrentUser;
use crate::context::AppContext;
use crate::notifier::DailyNotifier;
use crate::repository::{Scope, TaskService};

#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    pub channel_id: Option<String>,
    pub user_id: Option<String>,
    pub id: Option<String>,
}

impl ScopeQuery {
    fn channel_scope(&self) -> Result<Scope, ApiError> {
        non_empty(&self.channel_id)
            .map(Scope::channel)
            .ok_or_else(|| ApiError::BadRequest("channel_id required".to_string()))
    }

    fn private_scope(&self, current_user: Option<&CurrentUser>) -> Result<Scope, ApiError> {
        non_empty(&self.user_id)
            .or_else(|| current_user.map(|user| user.user_id.as_str()))
            .map(Scope::private)
            .ok_or_else(|| ApiError::BadRequest("user_id is required".to_string()))
    }

    fn entity_id(&self) -> Result<&str, ApiError> {
        non_empty(&self.id).ok_or_else(|| ApiError::BadRequest("id required".to_string()))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

type CurrentUserExtension = Option<Extension<CurrentUser>>;

fn caller(current_user: &CurrentUserExtension) -> Option<&CurrentUser> {
    current_user.as_ref().map(|Extension(user)| user)
}

/// Creates the router for `/tasks`, `/groups`, `/private/tasks` and `/private/groups`.
pub fn create_tasks_router() -> Router<AppContext> {
    Router::new()
        .route(
            "/tasks",
            get(get_channel_tasks_handler)
                .post(create_channel_task_handler)
                .put(update_channel_task_handler)
                .delete(delete_channel_task_handler),
        )
        .route(
            "/groups",
            get(get_channel_groups_handler)
                .post(create_channel_group_handler)
                .put(update_channel_group_handler)
                .delete(delete_channel_group_handler),
        )
        .route(
            "/private/tasks",
            get(get_private_tasks_handler)
                .post(create_private_task_handler)
                .put(update_private_task_handler)
                .delete(delete_private_task_handler),
        )
        .route(
            "/private/groups",
            get(get_private_groups_handler)
                .post(create_private_group_handler)
                .put(update_private_group_handler)
                .delete(delete_private_group_handler),
        )
}

/// Handler for GET /api/v1/tasks. Viewing the list counts as activity of the caller.
#[tracing::instrument(skip(context))]
pub async fn get_channel_tasks_handler(
    State(context): State<AppContext>,
    current_user: CurrentUserExtension,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<TaskList>, ApiError> {
    let scope = query.channel_scope()?;
    if let Some(user) = caller(&current_user) {
        if let Err(err) = DailyNotifier::new(&context)
            .check_and_notify(&user.user_id)
            .await
        {
            tracing::warn!("Daily summary check failed for {}: {}", user.user_id, err);
        }
    }
    Ok(Json(TaskService::new(&context).task_list(&scope).await))
}

#[tracing::instrument(skip(context, payload))]
pub async fn create_channel_task_handler(
    State(context): State<AppContext>,
    Query(query): Query<ScopeQuery>,
    payload: Result<Json<TaskItem>, JsonRejection>,
) -> Result<Json<TaskItem>, ApiError> {
    let scope = query.channel_scope()?;
    let Json(item) = payload?;
    create_task(&context, &scope, item).await
}

#[tracing::instrument(skip(context, payload))]
pub async fn update_channel_task_handler(
    State(context): State<AppContext>,
    Query(query): Query<ScopeQuery>,
    payload: Result<Json<TaskItem>, JsonRejection>,
) -> Result<Json<TaskItem>, ApiError> {
    let scope = query.channel_scope()?;
    let Json(item) = payload?;
    update_task(&context, &scope, item).await
}

#[tracing::instrument(skip(context))]
pub async fn delete_channel_task_handler(
    State(context): State<AppContext>,
    Query(query): Query<ScopeQuery>,
) -> Result<StatusCode, ApiError> {
    let scope = query.channel_scope()?;
    delete_task(&context, &scope, query.entity_id()?).await
}

#[tracing::instrument(skip(context))]
pub async fn get_channel_groups_handler(
    State(context): State<AppContext>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Vec<TaskGroup>>, ApiError> {
    let scope = query.channel_scope()?;
    Ok(Json(TaskService::new(&context).groups(&scope).await))
}

#[tracing::instrument(skip(context, payload))]
pub async fn create_channel_group_handler(
    State(context): State<AppContext>,
    Query(query): Query<ScopeQuery>,
    payload: Result<Json<TaskGroup>, JsonRejection>,
) -> Result<Json<TaskGroup>, ApiError> {
    let scope = query.channel_scope()?;
    let Json(group) = payload?;
    create_group(&context, &scope, group).await
}

#[tracing::instrument(skip(context, payload))]
pub async fn update_channel_group_handler(
    State(context): State<AppContext>,
    Query(query): Query<ScopeQuery>,
    payload: Result<Json<TaskGroup>, JsonRejection>,
) -> Result<Json<TaskGroup>, ApiError> {
    let scope = query.channel_scope()?;
    let Json(group) = payload?;
    update_group(&context, &scope, group).await
}

#[tracing::instrument(skip(context))]
pub async fn delete_channel_group_handler(
    State(context): State<AppContext>,
    Query(query): Query<ScopeQuery>,
) -> Result<StatusCode, ApiError> {
    let scope = query.channel_scope()?;
    delete_group(&context, &scope, query.entity_id()?).await
}

#[tracing::instrument(skip(context))]
pub async fn get_private_tasks_handler(
    State(context): State<AppContext>,
    current_user: CurrentUserExtension,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<TaskList>, ApiError> {
    let scope = query.private_scope(caller(&current_user))?;
    Ok(Json(TaskService::new(&context).task_list(&scope).await))
}

#[tracing::instrument(skip(context, payload))]
pub async fn create_private_task_handler(
    State(context): State<AppContext>,
    current_user: CurrentUserExtension,
    Query(query): Query<ScopeQuery>,
    payload: Result<Json<TaskItem>, JsonRejection>,
) -> Result<Json<TaskItem>, ApiError> {
    let scope = query.private_scope(caller(&current_user))?;
    let Json(item) = payload?;
    create_task(&context, &scope, item).await
}

#[tracing::instrument(skip(context, payload))]
pub async fn update_private_task_handler(
    State(context): State<AppContext>,
    current_user: CurrentUserExtension,
    Query(query): Query<ScopeQuery>,
    payload: Result<Json<TaskItem>, JsonRejection>,
) -> Result<Json<TaskItem>, ApiError> {
    let scope = query.private_scope(caller(&current_user))?;
    let Json(item) = payload?;
    update_task(&context, &scope, item).await
}

#[tracing::instrument(skip(context))]
pub async fn delete_private_task_handler(
    State(context): State<AppContext>,
    current_user: CurrentUserExtension,
    Query(query): Query<ScopeQuery>,
) -> Result<StatusCode, ApiError> {
    let scope = query.private_scope(caller(&current_user))?;
    delete_task(&context, &scope, query.entity_id()?).await
}

#[tracing::instrument(skip(context))]
pub async fn get_private_groups_handler(
    State(context): State<AppContext>,
    current_user: CurrentUserExtension,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<Vec<TaskGroup>>, ApiError> {
    let scope = query.private_scope(caller(&current_user))?;
    Ok(Json(TaskService::new(&context).groups(&scope).await))
}

#[tracing::instrument(skip(context, payload))]
pub async fn create_private_group_handler(
    State(context): State<AppContext>,
    current_user: CurrentUserExtension,
    Query(query): Query<ScopeQuery>,
    payload: Result<Json<TaskGroup>, JsonRejection>,
) -> Result<Json<TaskGroup>, ApiError> {
    let scope = query.private_scope(caller(&current_user))?;
    let Json(group) = payload?;
    create_group(&context, &scope, group).await
}

#[tracing::instrument(skip(context, payload))]
pub async fn update_private_group_handler(
    State(context): State<AppContext>,
    current_user: CurrentUserExtension,
    Query(query): Query<ScopeQuery>,
    payload: Result<Json<TaskGroup>, JsonRejection>,
) -> Result<Json<TaskGroup>, ApiError> {
    let scope = query.private_scope(caller(&current_user))?;
    let Json(group) = payload?;
    update_group(&context, &scope, group).await
}

#[tracing::instrument(skip(context))]
pub async fn delete_private_group_handler(
    State(context): State<AppContext>,
    current_user: CurrentUserExtension,
    Query(query): Query<ScopeQuery>,
) -> Result<StatusCode, ApiError> {
    let scope = query.private_scope(caller(&current_user))?;
    delete_group(&context, &scope, query.entity_id()?).await
}

async fn create_task(
    context: &AppContext,
    scope: &Scope,
    item: TaskItem,
) -> Result<Json<TaskItem>, ApiError> {
    Ok(Json(TaskService::new(context).create_task(scope, item).await?))
}

async fn update_task(
    context: &AppContext,
    scope: &Scope,
    item: TaskItem,
) -> Result<Json<TaskItem>, ApiError> {
    Ok(Json(TaskService::new(context).update_task(scope, item).await?))
}

async fn delete_task(context: &AppContext, scope: &Scope, id: &str) -> Result<StatusCode, ApiError> {
    TaskService::new(context).delete_task(scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_group(
    context: &AppContext,
    scope: &Scope,
    group: TaskGroup,
) -> Result<Json<TaskGroup>, ApiError> {
    Ok(Json(TaskService::new(context).create_group(scope, group).await?))
}

async fn update_group(
    context: &AppContext,
    scope: &Scope,
    group: TaskGroup,
) -> Result<Json<TaskGroup>, ApiError> {
    Ok(Json(TaskService::new(context).update_group(scope, group).await?))
}

async fn delete_group(
    context: &AppContext,
    scope: &Scope,
    id: &str,
) -> Result<StatusCode, ApiError> {
    TaskService::new(context).delete_group(scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
