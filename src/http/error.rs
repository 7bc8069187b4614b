//! Translation of forum failures into HTTP responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::error::ForumError;

/// JSON body carried by every error response.
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    /// Human-readable description.
    pub message: String,
}

/// A [`ForumError`] on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub ForumError);

impl From<ForumError> for ApiError {
    fn from(err: ForumError) -> Self { Self(err) }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ForumError::invalid(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(ForumError::invalid(rejection.body_text()))
    }
}

/// Status code for each error kind. Conflicts share 400 with validation
/// failures.
#[must_use]
pub const fn status_for(err: &ForumError) -> StatusCode {
    match err {
        ForumError::InvalidInput(_) | ForumError::Conflict(_) => StatusCode::BAD_REQUEST,
        ForumError::Unauthorized | ForumError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        ForumError::Forbidden(_) => StatusCode::FORBIDDEN,
        ForumError::NotFound(_) => StatusCode::NOT_FOUND,
        ForumError::Database(_)
        | ForumError::Pool(_)
        | ForumError::PasswordHash(_)
        | ForumError::Payload(_)
        | ForumError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = if self.0.is_client_error() {
            self.0.to_string()
        } else {
            error!(error = %self.0, "request failed");
            "internal server error".to_owned()
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}
