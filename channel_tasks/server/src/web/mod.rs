use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::context::AppContext;
use crate::repository::ServiceError;
use channel_tasks_core::TaskListError;

pub mod activity;
pub mod auth;
pub mod commands;
pub mod tasks;

/// Error type of the REST handlers. Bodies are plain text.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed body or missing parameter.
    #[error("{0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
            ApiError::Service(ServiceError::NotFound(TaskListError::TaskNotFound(_))) => {
                (StatusCode::NOT_FOUND, "Task not found").into_response()
            }
            ApiError::Service(ServiceError::NotFound(TaskListError::GroupNotFound(_))) => {
                (StatusCode::NOT_FOUND, "Group not found").into_response()
            }
            ApiError::Service(err) => {
                tracing::error!("Request failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
        }
    }
}

/// Builds the full application router around `context`.
pub fn create_router(context: AppContext) -> Router {
    let api_routes = Router::new()
        .merge(tasks::create_tasks_router())
        .merge(activity::create_activity_router())
        .merge(commands::create_commands_router())
        .with_state(context);

    Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(auth::auth_user_middleware)),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let context = AppContext::from_config(&config).await?;
    let app = create_router(context);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
