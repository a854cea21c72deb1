use crate::auth::{PasswordHasher, TokenService};
use crate::errors::{ApiError, ApiResult, Resource};
use crate::models::{Account, AccountView, Session};
use crate::storage::Store;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct AccountRepository {
    store: Arc<Store>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
}

impl AccountRepository {
    pub fn new(store: Arc<Store>, tokens: Arc<TokenService>, hasher: PasswordHasher) -> Self {
        Self {
            store,
            tokens,
            hasher,
        }
    }

    pub fn create(&self, email: &str, password: &str) -> ApiResult<AccountView> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(ApiError::Validation("Password is required".into()));
        }
        let password_hash = self.hasher.hash(password)?;

        let view = self.store.with_snapshot(|snapshot| -> ApiResult<_> {
            if snapshot.account_by_email(&email).is_some() {
                return Err(ApiError::AccountExists);
            }

            let account = Account {
                id: snapshot.next_account_id(),
                email,
                password_hash,
                is_premium: false,
            };
            let view = AccountView::from(&account);
            snapshot.put_account(account);
            Ok(view)
        })?;

        info!(account_id = view.id, "New account registered");
        Ok(view)
    }

    /// Check the password and hand out an access/refresh pair. The refresh
    /// mapping is persisted before returning.
    pub fn authenticate(&self, email: &str, password: &str, ttl_seconds: i64) -> ApiResult<Session> {
        let session = self.store.with_snapshot(|snapshot| -> ApiResult<_> {
            let account = snapshot
                .account_by_email(email.trim())
                .ok_or(ApiError::NotFound(Resource::Account))?;

            self.hasher.verify(password, &account.password_hash)?;

            let view = AccountView::from(account);
            let pair = self.tokens.issue_pair(view.id, ttl_seconds)?;
            snapshot.store_refresh_token(pair.refresh_token.clone(), pair.access_token.clone());

            Ok(Session {
                account: view,
                token: pair.access_token,
                refresh_token: pair.refresh_token,
            })
        })?;

        info!(account_id = session.account.id, "Account logged in");
        Ok(session)
    }

    /// The account `token` was issued for.
    pub fn current(&self, token: &str) -> ApiResult<AccountView> {
        self.store.read(|snapshot| -> ApiResult<_> {
            let subject = self.tokens.verify(token)?;
            snapshot
                .account_by_id(subject)
                .map(AccountView::from)
                .ok_or(ApiError::NotFound(Resource::Account))
        })
    }

    /// Change email and/or password. `None` or an empty string leaves the
    /// field as it is.
    pub fn update(
        &self,
        token: &str,
        new_email: Option<&str>,
        new_password: Option<&str>,
    ) -> ApiResult<AccountView> {
        let new_email = match new_email.filter(|e| !e.trim().is_empty()) {
            Some(email) => Some(normalize_email(email)?),
            None => None,
        };
        let new_hash = match new_password.filter(|p| !p.is_empty()) {
            Some(password) => Some(self.hasher.hash(password)?),
            None => None,
        };

        let view = self.store.with_snapshot(|snapshot| -> ApiResult<_> {
            let subject = self.tokens.verify(token)?;
            let mut account = snapshot
                .account_by_id(subject)
                .cloned()
                .ok_or(ApiError::NotFound(Resource::Account))?;

            if let Some(email) = new_email {
                let taken = snapshot
                    .account_by_email(&email)
                    .is_some_and(|other| other.id != account.id);
                if taken {
                    return Err(ApiError::AccountExists);
                }
                account.email = email;
            }
            if let Some(hash) = new_hash {
                account.password_hash = hash;
            }

            let view = AccountView::from(&account);
            snapshot.put_account(account);
            Ok(view)
        })?;

        info!(account_id = view.id, "Account updated");
        Ok(view)
    }

    pub fn upgrade_to_premium(&self, id: u64) -> ApiResult<AccountView> {
        let view = self.store.with_snapshot(|snapshot| -> ApiResult<_> {
            let mut account = snapshot
                .account_by_id(id)
                .cloned()
                .ok_or(ApiError::NotFound(Resource::Account))?;

            account.is_premium = true;
            let view = AccountView::from(&account);
            snapshot.put_account(account);
            Ok(view)
        })?;

        info!(account_id = id, "Account upgraded to premium");
        Ok(view)
    }
}

fn normalize_email(email: &str) -> ApiResult<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ApiError::Validation("Email is required".into()));
    }
    Ok(email.to_string())
}
