use crate::{
    AppState,
    auth::bearer_token,
    dto::CreatePostRequest,
    errors::{ApiError, Resource},
    models::Post,
    routes::blocking,
    sanitize::clean_profanity,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use validator::Validate;

/// POST /api/posts
/// Headers: Authorization: Bearer <token>
/// Body: { "body": "..." }
pub async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let token = bearer_token(&headers)?.to_string();
    let body = clean_profanity(&payload.body);

    let post = blocking(move || state.posts.create(&body, &token)).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/posts
pub async fn get_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = blocking(move || state.posts.list()).await?;

    Ok(Json(posts))
}

/// GET /api/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Post>, ApiError> {
    let post = blocking(move || state.posts.get(id))
        .await?
        .ok_or(ApiError::NotFound(Resource::Post))?;

    Ok(Json(post))
}

/// DELETE /api/posts/{id}
/// Headers: Authorization: Bearer <token>
pub async fn delete_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let token = bearer_token(&headers)?.to_string();

    blocking(move || state.posts.delete(id, &token)).await?;

    Ok(StatusCode::NO_CONTENT)
}
