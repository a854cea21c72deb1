use chirpy::{AppState, config::Config, routes};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    let addr = config.bind_addr.clone();
    info!(database = %config.database_path.display(), "Opening snapshot store");

    let state = AppState::from_config(config)?;
    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("API Endpoints:");
    info!("  GET    /api/healthz        - Health check");
    info!("  POST   /api/users          - Create account");
    info!("  PUT    /api/users          - Update email/password (auth)");
    info!("  GET    /api/users/me       - Get current account (auth)");
    info!("  POST   /api/login          - Login, returns access + refresh token");
    info!("  POST   /api/refresh        - New access token (refresh token)");
    info!("  POST   /api/revoke         - Revoke refresh token");
    info!("  POST   /api/posts          - Create post (auth)");
    info!("  GET    /api/posts          - List posts");
    info!("  GET    /api/posts/{{id}}     - Get specific post");
    info!("  DELETE /api/posts/{{id}}     - Delete post (auth, owner only)");
    info!("  POST   /api/polka/webhooks - Premium upgrade events");

    axum::serve(listener, app).await?;
    Ok(())
}
