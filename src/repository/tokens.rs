use crate::auth::TokenService;
use crate::errors::{ApiError, ApiResult, Resource};
use crate::storage::Store;
use std::sync::Arc;
use tracing::info;

/// Refresh and revoke against the persisted refresh-token map.
#[derive(Debug, Clone)]
pub struct TokenRepository {
    store: Arc<Store>,
    tokens: Arc<TokenService>,
}

impl TokenRepository {
    pub fn new(store: Arc<Store>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    /// Mint a new access token for the subject behind `refresh_token` and
    /// rotate it into the stored mapping. The refresh token itself is kept.
    pub fn refresh(&self, refresh_token: &str, ttl_seconds: i64) -> ApiResult<String> {
        self.store.with_snapshot(|snapshot| -> ApiResult<_> {
            let stored = snapshot
                .access_token_for(refresh_token)
                .ok_or(ApiError::NotFound(Resource::RefreshToken))?;

            let subject = self.tokens.recover_subject(stored)?;
            let access_token = self.tokens.issue(subject, ttl_seconds)?;
            snapshot.store_refresh_token(refresh_token.to_string(), access_token.clone());

            Ok(access_token)
        })
    }

    /// Revoking a token that is not stored, including one already revoked,
    /// is `NotFound`.
    pub fn revoke(&self, refresh_token: &str) -> ApiResult<()> {
        self.store.with_snapshot(|snapshot| -> ApiResult<_> {
            snapshot
                .remove_refresh_token(refresh_token)
                .map(|_| ())
                .ok_or(ApiError::NotFound(Resource::RefreshToken))
        })?;

        info!("Refresh token revoked");
        Ok(())
    }
}
