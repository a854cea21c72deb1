use crate::errors::{ApiError, ApiResult, AuthError};

/// Cost bounds bcrypt accepts.
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

/// bcrypt ignores input past this many bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// bcrypt hashing at a fixed cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Passwords longer than [`MAX_PASSWORD_BYTES`] are refused rather than
    /// silently truncated.
    pub fn hash(&self, plaintext: &str) -> ApiResult<String> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(ApiError::Validation(format!(
                "Password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        Ok(bcrypt::hash(plaintext, self.cost)?)
    }

    /// A wrong password is an authentication failure; a hash that cannot be
    /// parsed is an internal one.
    pub fn verify(&self, plaintext: &str, hashed: &str) -> ApiResult<()> {
        // nothing that long was ever hashed; don't let a shared prefix match
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(ApiError::Authentication(AuthError::CredentialMismatch));
        }
        if bcrypt::verify(plaintext, hashed)? {
            Ok(())
        } else {
            Err(ApiError::Authentication(AuthError::CredentialMismatch))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(MIN_COST)
    }

    #[test]
    fn correct_password_verifies() {
        let hashed = hasher().hash("secret").unwrap();

        assert_ne!(hashed, "secret");
        assert!(hasher().verify("secret", &hashed).is_ok());
    }

    #[test]
    fn wrong_password_is_a_mismatch() {
        let hashed = hasher().hash("secret").unwrap();

        assert!(matches!(
            hasher().verify("wrong", &hashed),
            Err(ApiError::Authentication(AuthError::CredentialMismatch))
        ));
    }

    #[test]
    fn unparseable_hash_is_internal() {
        assert!(matches!(
            hasher().verify("secret", "not-a-bcrypt-hash"),
            Err(ApiError::Internal(_))
        ));
    }

    #[test]
    fn same_password_gets_a_fresh_salt() {
        let a = hasher().hash("secret").unwrap();
        let b = hasher().hash("secret").unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn length_limit_counts_bytes_not_characters() {
        // 36 chars, 72 bytes
        let at_limit = "é".repeat(36);
        let hashed = hasher().hash(&at_limit).unwrap();
        assert!(hasher().verify(&at_limit, &hashed).is_ok());

        // 40 chars, 80 bytes
        let over = "é".repeat(40);
        assert!(matches!(hasher().hash(&over), Err(ApiError::Validation(_))));
    }

    #[test]
    fn longer_input_sharing_the_first_72_bytes_does_not_verify() {
        let password = "p".repeat(MAX_PASSWORD_BYTES);
        let hashed = hasher().hash(&password).unwrap();

        let extended = format!("{}-and-more", password);
        assert!(matches!(
            hasher().verify(&extended, &hashed),
            Err(ApiError::Authentication(AuthError::CredentialMismatch))
        ));
    }
}
