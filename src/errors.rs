use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use thiserror::Error;
use tracing::error;

/// Failures of the snapshot file itself. Fatal to the operation that hit them.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("snapshot i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is corrupt: {0}")]
    Corrupt(serde_json::Error),

    #[error("snapshot could not be encoded: {0}")]
    Encode(serde_json::Error),
}

/// Reasons a presented credential was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token is malformed")]
    Malformed,

    #[error("token has expired")]
    Expired,

    #[error("email or password is incorrect")]
    CredentialMismatch,

    #[error("no credential presented")]
    MissingCredential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Account,
    Post,
    RefreshToken,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Account => f.write_str("account"),
            Resource::Post => f.write_str("post"),
            Resource::RefreshToken => f.write_str("refresh token"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0} not found")]
    NotFound(Resource),

    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),

    #[error("caller does not own this resource")]
    Forbidden,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("an account with this email already exists")]
    AccountExists,

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<bcrypt::BcryptError> for ApiError {
    fn from(e: bcrypt::BcryptError) -> Self {
        ApiError::Internal(format!("password hashing failed: {}", e))
    }
}

/// Convert our errors to HTTP responses
///
/// Storage and internal failures are logged here and reported to the client
/// without detail.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Authentication(AuthError::CredentialMismatch) => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ApiError::Authentication(_) => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::AccountExists => (StatusCode::CONFLICT, "User already exists".to_string()),
            ApiError::Storage(_) | ApiError::Internal(_) => {
                error!("Internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(serde_json::json!({
              "error": message
            })),
        )
            .into_response()
    }
}
