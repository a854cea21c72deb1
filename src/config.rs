use crate::auth::password::{MAX_COST, MIN_COST};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_DATABASE_PATH: &str = "./database/database.json";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub database_path: PathBuf,
    pub bind_addr: String,
    /// Lifetime of a fresh access token, and the most a login may ask for.
    pub access_token_ttl_secs: i64,
    pub bcrypt_cost: u32,
    pub atomic_writes: bool,
    /// Shared key the payment provider sends with webhook calls. Webhooks are
    /// refused when unset.
    pub polka_key: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("jwt_secret", &"<redacted>")
            .field("database_path", &self.database_path)
            .field("bind_addr", &self.bind_addr)
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("atomic_writes", &self.atomic_writes)
            .field("polka_key", &self.polka_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// Read configuration from the process environment, after loading `.env`
    /// if there is one.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let access_token_ttl_secs =
            parse_or(&lookup, "ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TOKEN_TTL_SECS)?;
        if access_token_ttl_secs <= 0 {
            return Err(ConfigError::Invalid {
                key: "ACCESS_TOKEN_TTL_SECS",
                value: access_token_ttl_secs.to_string(),
            });
        }

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(MIN_COST..=MAX_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        Ok(Self {
            jwt_secret,
            database_path: lookup("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            access_token_ttl_secs,
            bcrypt_cost,
            atomic_writes: parse_or(&lookup, "ATOMIC_WRITES", false)?,
            polka_key: lookup("POLKA_KEY").filter(|k| !k.is_empty()),
        })
    }

    /// Lifetime for a login that asked for `requested` seconds.
    pub fn access_token_ttl(&self, requested: Option<i64>) -> i64 {
        match requested {
            Some(secs) if secs > 0 && secs <= self.access_token_ttl_secs => secs,
            _ => self.access_token_ttl_secs,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
