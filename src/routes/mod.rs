pub mod health;
pub mod post;
pub mod token;
pub mod user;

use crate::{AppState, errors::ApiError, errors::ApiResult};
use axum::{
    Router,
    routing::{get, post},
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Requests handled at once. Store access is serialized anyway; this only
/// bounds how many wait on it.
const MAX_IN_FLIGHT: usize = 64;

pub fn router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Public routes (no auth required)
        .route("/api/healthz", get(health::health_check))
        .route("/api/users", post(user::signup).put(user::update_account))
        .route("/api/login", post(user::login))
        .route("/api/refresh", post(token::refresh))
        .route("/api/revoke", post(token::revoke))
        .route("/api/posts", post(post::create_post).get(post::get_posts))
        .route(
            "/api/posts/{id}",
            get(post::get_post).delete(post::delete_post),
        )
        // Protected by bearer token inside the handlers
        .route("/api/users/me", get(user::get_current_user))
        // Protected by the payment provider's API key
        .route("/api/polka/webhooks", post(user::premium_webhook))
        .with_state(state)
        .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Store operations block on file I/O and the exclusive section, so they run
/// off the async workers.
pub(crate) async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("Worker task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

    fn app_with_state() -> (TempDir, AppState, Router) {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("database.json");
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some("route-test-secret".to_string()),
            "DATABASE_PATH" => Some(db.display().to_string()),
            "BCRYPT_COST" => Some("4".to_string()),
            "POLKA_KEY" => Some(POLKA_KEY.to_string()),
            _ => None,
        })
        .unwrap();
        let state = AppState::from_config(config).unwrap();
        let app = router(state.clone());
        (dir, state, app)
    }

    fn app() -> (TempDir, Router) {
        let (dir, _, app) = app_with_state();
        (dir, app)
    }

    fn webhook_request(api_key: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/polka/webhooks")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = api_key {
            builder = builder.header(header::AUTHORIZATION, format!("ApiKey {}", key));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn is_premium(state: &AppState, email: &str) -> bool {
        state
            .accounts
            .authenticate(email, "secret", 60)
            .unwrap()
            .account
            .is_premium
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_check_is_ok() {
        let (_dir, app) = app();

        let response = app
            .oneshot(Request::get("/api/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn posting_without_a_token_is_unauthorized() {
        let (_dir, app) = app();

        let response = app
            .oneshot(json_request("POST", "/api/posts", None, json!({ "body": "hi" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_post_is_not_found() {
        let (_dir, app) = app();

        let response = app
            .oneshot(Request::get("/api/posts/99").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn signup_login_and_post_flow() {
        let (_dir, app) = app();
        let credentials = json!({ "email": "a@x.com", "password": "secret" });

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/users", None, credentials.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let account = body_json(response).await;
        assert_eq!(account["id"], 1);
        assert!(account.get("password_hash").is_none());

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/login", None, credentials))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let session = body_json(response).await;
        let token = session["token"].as_str().unwrap().to_string();
        assert_eq!(session["refresh_token"].as_str().unwrap().len(), 64);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/posts",
                Some(&token),
                json!({ "body": "what a kerfuffle" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let post = body_json(response).await;
        assert_eq!(post["body"], "what a ****");
        assert_eq!(post["author_id"], 1);
    }

    #[tokio::test]
    async fn oversized_post_is_a_bad_request() {
        let (_dir, app) = app();

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/posts",
                Some("irrelevant"),
                json!({ "body": "x".repeat(141) }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (_dir, app) = app();
        app.clone()
            .oneshot(json_request(
                "POST",
                "/api/users",
                None,
                json!({ "email": "a@x.com", "password": "secret" }),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/login",
                None,
                json!({ "email": "a@x.com", "password": "wrong" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn webhook_without_the_api_key_is_unauthorized() {
        let (_dir, state, app) = app_with_state();
        let account = state.accounts.create("a@x.com", "secret").unwrap();
        let upgrade = json!({ "event": "user.upgraded", "data": { "user_id": account.id } });

        let response = app
            .clone()
            .oneshot(webhook_request(None, upgrade.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(webhook_request(Some("not-the-key"), upgrade))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        assert!(!is_premium(&state, "a@x.com"));
    }

    #[tokio::test]
    async fn webhook_with_the_api_key_upgrades_the_account() {
        let (_dir, state, app) = app_with_state();
        let account = state.accounts.create("a@x.com", "secret").unwrap();

        let response = app
            .oneshot(webhook_request(
                Some(POLKA_KEY),
                json!({ "event": "user.upgraded", "data": { "user_id": account.id } }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(is_premium(&state, "a@x.com"));
    }

    #[tokio::test]
    async fn other_webhook_events_are_acknowledged_and_ignored() {
        let (_dir, state, app) = app_with_state();
        let account = state.accounts.create("a@x.com", "secret").unwrap();

        let response = app
            .oneshot(webhook_request(
                Some(POLKA_KEY),
                json!({ "event": "user.payment_failed", "data": { "user_id": account.id } }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(!is_premium(&state, "a@x.com"));
    }

    #[tokio::test]
    async fn empty_email_in_an_update_leaves_it_unchanged() {
        let (_dir, state, app) = app_with_state();
        state.accounts.create("a@x.com", "secret").unwrap();
        let token = state.accounts.authenticate("a@x.com", "secret", 60).unwrap().token;

        let response = app
            .oneshot(json_request(
                "PUT",
                "/api/users",
                Some(&token),
                json!({ "email": "", "password": "new" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let account = body_json(response).await;
        assert_eq!(account["email"], "a@x.com");
        assert!(state.accounts.authenticate("a@x.com", "new", 60).is_ok());
    }

    #[tokio::test]
    async fn password_over_72_bytes_is_a_bad_request() {
        let (_dir, app) = app();

        // 40 characters, 80 bytes
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/users",
                None,
                json!({ "email": "a@x.com", "password": "é".repeat(40) }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
