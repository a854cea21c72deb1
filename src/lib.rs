// ============================================================================
// CHIRPY - posts and accounts over a single snapshot file
// ============================================================================

// - Whole-snapshot load/mutate/persist under one exclusive section
// - bcrypt password hashing
// - HS256 access tokens with rotating refresh tokens
// - Ownership checks derived from verified tokens
// - Thin axum front end

pub mod auth;
pub mod config;
pub mod dto;
pub mod errors;
pub mod models;
pub mod repository;
pub mod routes;
pub mod sanitize;
pub mod states;
pub mod storage;

pub use errors::{ApiError, ApiResult, AuthError, Resource, StorageError};
pub use states::AppState;
