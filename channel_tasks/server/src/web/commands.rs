use axum::{
    Json, Router,
    extract::{Extension, State, rejection::JsonRejection},
    routing::get,
};

use super::ApiError;
use super::auth::CurrentUser;
use crate::commands::{CommandHandler, CommandRegistration, CommandRequest, CommandResponse, REGISTRATIONS};
use crate::context::AppContext;

pub fn create_commands_router() -> Router<AppContext> {
    Router::new().route(
        "/commands",
        get(list_commands_handler).post(execute_command_handler),
    )
}

/// Handler for GET /api/v1/commands - the triggers to register with the chat host.
#[tracing::instrument]
pub async fn list_commands_handler() -> Json<&'static [CommandRegistration]> {
    Json(REGISTRATIONS)
}

/// Handler for POST /api/v1/commands - runs a slash command.
///
/// The caller identified by the user id header always wins over the `user_id` of the
/// body, which is only used when the header is absent.
#[tracing::instrument(skip(context, payload))]
pub async fn execute_command_handler(
    State(context): State<AppContext>,
    current_user: Option<Extension<CurrentUser>>,
    payload: Result<Json<CommandRequest>, JsonRejection>,
) -> Result<Json<CommandResponse>, ApiError> {
    let Json(mut request) = payload?;
    if let Some(Extension(user)) = current_user {
        request.user_id = user.user_id;
    }
    Ok(Json(CommandHandler::new(&context).execute(&request).await))
}
