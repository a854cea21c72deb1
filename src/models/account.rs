use serde::{Deserialize, Serialize};

/// A stored account. `password_hash` is persisted but never leaves the crate
/// through a public view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    pub email: String,
    pub password_hash: String,
    pub is_premium: bool,
}

/// What callers get back for an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    pub id: u64,
    pub email: String,
    pub is_premium: bool,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            is_premium: account.is_premium,
        }
    }
}

/// Returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    #[serde(flatten)]
    pub account: AccountView,
    pub token: String,
    pub refresh_token: String,
}
