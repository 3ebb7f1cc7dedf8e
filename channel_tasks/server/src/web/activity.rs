use axum::{
    Json, Router,
    extract::{Extension, State, rejection::JsonRejection},
    http::StatusCode,
    middleware::from_fn,
    routing::post,
};

use super::ApiError;
use super::auth::{CurrentUser, require_auth_middleware};
use crate::context::AppContext;
use crate::notifier::{DailyNotifier, HostEvent};

/// Creates the router for `/activity` (caller identity required) and `/events`.
pub fn create_activity_router() -> Router<AppContext> {
    let protected_routes = Router::new()
        .route("/activity", post(activity_handler))
        .layer(from_fn(require_auth_middleware));
    Router::new()
        .route("/events", post(event_handler))
        .merge(protected_routes)
}

/// Handler for POST /api/v1/activity - an explicit "the user is here" ping.
#[tracing::instrument(skip(context))]
pub async fn activity_handler(
    State(context): State<AppContext>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<StatusCode, ApiError> {
    DailyNotifier::new(&context)
        .check_and_notify(&current_user.user_id)
        .await?;
    Ok(StatusCode::OK)
}

/// Handler for POST /api/v1/events - login and post notifications from the chat host.
#[tracing::instrument(skip(context, payload))]
pub async fn event_handler(
    State(context): State<AppContext>,
    payload: Result<Json<HostEvent>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(event) = payload?;
    tracing::debug!("Received host event {:?}", event);
    DailyNotifier::new(&context).handle_event(&event).await?;
    Ok(StatusCode::OK)
}
