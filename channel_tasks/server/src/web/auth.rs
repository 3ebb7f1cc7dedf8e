use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::ApiError;

/// Header the Mattermost server sets to the id of the authenticated user.
pub const USER_ID_HEADER: &str = "Mattermost-User-Id";

/// The user a request was made on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: String,
}

impl CurrentUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|user_id| !user_id.is_empty())
            .map(CurrentUser::new)
    }
}

/// Sets the `CurrentUser` extension when the request carries a user id header.
pub async fn auth_user_middleware(mut request: Request, next: Next) -> Response {
    if let Some(current_user) = CurrentUser::from_headers(request.headers()) {
        request.extensions_mut().insert(current_user);
    }
    next.run(request).await
}

/// Returns UNAUTHORIZED if the CurrentUser extension is not found in the request.
/// This middleware should be applied after auth_user_middleware.
pub async fn require_auth_middleware(request: Request, next: Next) -> Response {
    if request.extensions().get::<CurrentUser>().is_none() {
        return ApiError::Unauthorized.into_response();
    }
    next.run(request).await
}
