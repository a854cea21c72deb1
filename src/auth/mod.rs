pub mod clock;
pub mod password;
pub mod token;

use crate::errors::AuthError;
use axum::http::{HeaderMap, header};

pub use clock::{Clock, ManualClock, SystemClock};
pub use password::{MAX_PASSWORD_BYTES, PasswordHasher};
pub use token::{Claims, TokenPair, TokenService};

/// Pull the credential out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredential)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingCredential)
}

/// Pull the key out of `Authorization: ApiKey <key>`.
pub fn api_key(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("ApiKey "))
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or(AuthError::MissingCredential)
}
