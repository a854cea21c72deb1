#![allow(dead_code)]

use chirpy::AppState;
use chirpy::auth::{ManualClock, TokenService};
use chirpy::config::Config;
use chirpy::errors::ApiError;
use chirpy::models::Session;
use chirpy::storage::{Snapshot, Store};
use std::sync::Arc;
use tempfile::TempDir;

pub const SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "correct horse";
pub const TTL: i64 = 60;

pub struct Harness {
    pub dir: TempDir,
    pub clock: Arc<ManualClock>,
    pub store: Arc<Store>,
    pub tokens: Arc<TokenService>,
    pub state: AppState,
}

pub fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(dir.path().join("database.json")).unwrap());
    let clock = Arc::new(ManualClock::default());
    let tokens = Arc::new(TokenService::with_clock(SECRET, clock.clone()));
    let state = AppState::new(test_config(), store.clone(), tokens.clone());

    Harness {
        dir,
        clock,
        store,
        tokens,
        state,
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some(SECRET.to_string()),
        "BCRYPT_COST" => Some("4".to_string()),
        _ => None,
    })
    .unwrap()
}

impl Harness {
    /// Create an account and log it in.
    pub fn session(&self, email: &str) -> Session {
        self.state.accounts.create(email, PASSWORD).unwrap();
        self.state.accounts.authenticate(email, PASSWORD, TTL).unwrap()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store
            .read(|s| Ok::<_, ApiError>(s.clone()))
            .unwrap()
    }
}
