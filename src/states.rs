use crate::auth::{PasswordHasher, TokenService};
use crate::config::Config;
use crate::errors::StorageError;
use crate::repository::{AccountRepository, PostRepository, TokenRepository};
use crate::storage::{Store, StoreOptions};
use std::sync::Arc;

// ============================================================================
// APPLICATION STATE - Shared data across all requests
// ============================================================================
/// Every repository holds the same `Arc<Store>`, so all requests funnel
/// through one exclusive section.
#[derive(Clone)]
pub struct AppState {
    pub posts: PostRepository,
    pub accounts: AccountRepository,
    pub tokens: TokenRepository,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<Store>, token_service: Arc<TokenService>) -> Self {
        let hasher = PasswordHasher::new(config.bcrypt_cost);

        Self {
            posts: PostRepository::new(store.clone(), token_service.clone()),
            accounts: AccountRepository::new(store.clone(), token_service.clone(), hasher),
            tokens: TokenRepository::new(store, token_service),
            config: Arc::new(config),
        }
    }

    /// Open the configured snapshot and sign with the configured secret.
    pub fn from_config(config: Config) -> Result<Self, StorageError> {
        let options = StoreOptions {
            atomic_replace: config.atomic_writes,
        };
        let store = Arc::new(Store::open_with(&config.database_path, options)?);
        let token_service = Arc::new(TokenService::new(config.jwt_secret.as_bytes()));

        Ok(Self::new(config, store, token_service))
    }
}
