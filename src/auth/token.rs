use crate::auth::clock::{Clock, SystemClock};
use crate::errors::{ApiError, ApiResult, AuthError};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub const ISSUER: &str = "chirpy";

/// Refresh tokens carry 256 bits of entropy.
pub const REFRESH_TOKEN_BYTES: usize = 32;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String, // Subject (account id)
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs and checks HS256 access tokens with one symmetric secret.
pub struct TokenService {
    secret: Vec<u8>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: impl Into<Vec<u8>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: secret.into(),
            clock,
        }
    }

    /// Mint an access token for `subject` valid for `ttl_seconds` from now.
    pub fn issue(&self, subject: u64, ttl_seconds: i64) -> ApiResult<String> {
        if ttl_seconds <= 0 {
            return Err(ApiError::Validation(
                "token lifetime must be positive".into(),
            ));
        }

        let issued_at = self.clock.now().timestamp();
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: subject.to_string(),
            iat: issued_at,
            exp: issued_at
                .checked_add(ttl_seconds)
                .ok_or_else(|| ApiError::Validation("token lifetime is too long".into()))?,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| ApiError::Internal(format!("Token Creation failed: {}", e)))
    }

    /// Mint an access token plus a fresh opaque refresh token. Storing the
    /// pair is the caller's job.
    pub fn issue_pair(&self, subject: u64, ttl_seconds: i64) -> ApiResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue(subject, ttl_seconds)?,
            refresh_token: new_refresh_token(),
        })
    }

    /// Check signature, structure and expiry; return the subject.
    pub fn verify(&self, token: &str) -> Result<u64, AuthError> {
        let claims = self.decode_claims(token)?;

        if self.clock.now().timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }

        parse_subject(&claims)
    }

    /// Check signature and structure only. Used to read the subject back out
    /// of a stored access token that may since have expired.
    pub fn recover_subject(&self, token: &str) -> Result<u64, AuthError> {
        let claims = self.decode_claims(token)?;
        parse_subject(&claims)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is checked against the injected clock instead
        validation.validate_exp = false;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Malformed,
            })
    }
}

fn parse_subject(claims: &Claims) -> Result<u64, AuthError> {
    claims.sub.parse().map_err(|_| AuthError::Malformed)
}

/// 32 random bytes, lowercase hex.
pub fn new_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
