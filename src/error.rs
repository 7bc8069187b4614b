//! Error type shared by the forum service and the persistence layer.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::pooled_connection::bb8::RunError;
use thiserror::Error;

/// Failures surfaced by forum operations.
///
/// The first six variants are client errors that the HTTP layer maps to 4xx
/// statuses. The rest wrap infrastructure failures and surface as 500.
#[derive(Debug, Error)]
pub enum ForumError {
    /// Request data failed validation.
    #[error("{0}")]
    InvalidInput(String),
    /// A uniqueness constraint would be violated.
    #[error("{0}")]
    Conflict(String),
    /// No valid session accompanies the request.
    #[error("authentication required")]
    Unauthorized,
    /// The caller is authenticated but lacks permission.
    #[error("{0}")]
    Forbidden(&'static str),
    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Login failed. Unknown user and wrong password are indistinguishable.
    #[error("invalid username or password")]
    InvalidCredentials,
    /// Query or transaction failure.
    #[error("database error: {0}")]
    Database(#[source] DieselError),
    /// No connection could be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] RunError),
    /// The password hasher rejected its input.
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    /// A stored session payload could not be encoded or decoded.
    #[error("session payload error: {0}")]
    Payload(#[from] serde_json::Error),
    /// A blocking hashing task panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ForumError {
    /// Build an [`ForumError::InvalidInput`] from any displayable message.
    pub fn invalid(msg: impl Into<String>) -> Self { Self::InvalidInput(msg.into()) }

    /// Whether this error is caused by the caller rather than the server.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::Conflict(_)
                | Self::Unauthorized
                | Self::Forbidden(_)
                | Self::NotFound(_)
                | Self::InvalidCredentials
        )
    }
}

impl From<DieselError> for ForumError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                Self::Conflict("username or email already in use".to_owned())
            }
            other => Self::Database(other),
        }
    }
}

/// Convenience alias for forum results.
pub type ForumResult<T> = Result<T, ForumError>;
