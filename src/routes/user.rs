use crate::{
    AppState,
    auth::{api_key, bearer_token},
    dto::{LoginRequest, SignupRequest, UpdateAccountRequest, WebhookRequest},
    errors::{ApiError, AuthError},
    models::{AccountView, Session},
    routes::blocking,
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use validator::Validate;

const UPGRADE_EVENT: &str = "user.upgraded";

/// POST /api/users
/// Body: { "email": "...", "password": "..." }
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AccountView>), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let account =
        blocking(move || state.accounts.create(&payload.email, &payload.password)).await?;

    Ok((StatusCode::CREATED, Json(account)))
}

/// POST /api/login
/// Body: { "email": "...", "password": "...", "expires_in_seconds": 3600 }
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Session>, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let ttl = state.config.access_token_ttl(payload.expires_in_seconds);
    let session = blocking(move || {
        state
            .accounts
            .authenticate(&payload.email, &payload.password, ttl)
    })
    .await?;

    Ok(Json(session))
}

/// GET /api/users/me
/// Headers: Authorization: Bearer <token>
pub async fn get_current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AccountView>, ApiError> {
    let token = bearer_token(&headers)?.to_string();

    let account = blocking(move || state.accounts.current(&token)).await?;

    Ok(Json(account))
}

/// PUT /api/users
/// Headers: Authorization: Bearer <token>
/// Body: { "email": "...", "password": "..." }, either may be omitted
pub async fn update_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut payload): Json<UpdateAccountRequest>,
) -> Result<Json<AccountView>, ApiError> {
    payload.email = payload.email.filter(|e| !e.is_empty());
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let token = bearer_token(&headers)?.to_string();
    let account = blocking(move || {
        state.accounts.update(
            &token,
            payload.email.as_deref(),
            payload.password.as_deref(),
        )
    })
    .await?;

    Ok(Json(account))
}

/// POST /api/polka/webhooks
/// Header: Authorization: ApiKey <POLKA_KEY>
/// Body: { "event": "user.upgraded", "data": { "user_id": 1 } }
pub async fn premium_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<WebhookRequest>,
) -> Result<StatusCode, ApiError> {
    let presented = api_key(&headers)?;
    if state.config.polka_key.as_deref() != Some(presented) {
        return Err(AuthError::MissingCredential.into());
    }

    if payload.event != UPGRADE_EVENT {
        return Ok(StatusCode::NO_CONTENT);
    }

    let account_id = payload.data.user_id;
    blocking(move || state.accounts.upgrade_to_premium(account_id)).await?;

    Ok(StatusCode::NO_CONTENT)
}
