use crate::models::{Account, Post};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Every persisted record, loaded and written back as one unit.
///
/// Accounts are indexed twice. Both indices are only ever written through
/// [`Snapshot::put_account`], which keeps them mirrored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    posts: HashMap<u64, Post>,
    #[serde(default)]
    accounts_by_email: HashMap<String, Account>,
    #[serde(default)]
    accounts_by_id: HashMap<u64, Account>,
    /// refresh token -> access token it currently authorizes
    #[serde(default)]
    refresh_tokens: HashMap<String, String>,
}

impl Snapshot {
    /// Ids are `count + 1`, so a deleted id can be handed out again.
    pub fn next_post_id(&self) -> u64 {
        self.posts.len() as u64 + 1
    }

    pub fn insert_post(&mut self, body: String, author_id: u64) -> Post {
        let post = Post {
            id: self.next_post_id(),
            body,
            author_id,
        };
        self.posts.insert(post.id, post.clone());
        post
    }

    pub fn post(&self, id: u64) -> Option<&Post> {
        self.posts.get(&id)
    }

    pub fn remove_post(&mut self, id: u64) -> Option<Post> {
        self.posts.remove(&id)
    }

    /// All posts, ascending by id.
    pub fn posts(&self) -> Vec<Post> {
        let mut posts: Vec<Post> = self.posts.values().cloned().collect();
        posts.sort_by_key(|post| post.id);
        posts
    }

    pub fn next_account_id(&self) -> u64 {
        self.accounts_by_id.len() as u64 + 1
    }

    pub fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts_by_email.get(email)
    }

    pub fn account_by_id(&self, id: u64) -> Option<&Account> {
        self.accounts_by_id.get(&id)
    }

    /// Insert or replace an account in both indices. If the account already
    /// exists under a different email, the old email key is dropped.
    pub fn put_account(&mut self, account: Account) {
        if let Some(previous) = self.accounts_by_id.get(&account.id) {
            if previous.email != account.email {
                self.accounts_by_email.remove(&previous.email);
            }
        }
        self.accounts_by_email
            .insert(account.email.clone(), account.clone());
        self.accounts_by_id.insert(account.id, account);
    }

    pub fn account_count(&self) -> usize {
        self.accounts_by_id.len()
    }

    pub fn store_refresh_token(&mut self, refresh_token: String, access_token: String) {
        self.refresh_tokens.insert(refresh_token, access_token);
    }

    pub fn access_token_for(&self, refresh_token: &str) -> Option<&str> {
        self.refresh_tokens.get(refresh_token).map(String::as_str)
    }

    pub fn remove_refresh_token(&mut self, refresh_token: &str) -> Option<String> {
        self.refresh_tokens.remove(refresh_token)
    }

    pub fn refresh_token_count(&self) -> usize {
        self.refresh_tokens.len()
    }

    /// True when every email key points at the account stored under its id
    /// and the other way round.
    pub fn indices_consistent(&self) -> bool {
        self.accounts_by_email.len() == self.accounts_by_id.len()
            && self.accounts_by_email.iter().all(|(email, account)| {
                account.email == *email && self.accounts_by_id.get(&account.id) == Some(account)
            })
    }
}
