use crate::{
    AppState, auth::bearer_token, dto::TokenResponse, errors::ApiError, routes::blocking,
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};

/// POST /api/refresh
/// Headers: Authorization: Bearer <refresh token>
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let refresh_token = bearer_token(&headers)?.to_string();
    let ttl = state.config.access_token_ttl(None);

    let token = blocking(move || state.tokens.refresh(&refresh_token, ttl)).await?;

    Ok(Json(TokenResponse { token }))
}

/// POST /api/revoke
/// Headers: Authorization: Bearer <refresh token>
pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let refresh_token = bearer_token(&headers)?.to_string();

    blocking(move || state.tokens.revoke(&refresh_token)).await?;

    Ok(StatusCode::NO_CONTENT)
}
