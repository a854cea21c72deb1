use crate::auth::TokenService;
use crate::errors::{ApiError, ApiResult, Resource};
use crate::models::Post;
use crate::storage::Store;
use std::sync::Arc;
use tracing::info;

/// Longest accepted post body, in characters.
pub const MAX_POST_LENGTH: usize = 140;

#[derive(Debug, Clone)]
pub struct PostRepository {
    store: Arc<Store>,
    tokens: Arc<TokenService>,
}

impl PostRepository {
    pub fn new(store: Arc<Store>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }

    /// Store `body` as a new post owned by whoever `token` belongs to.
    pub fn create(&self, body: &str, token: &str) -> ApiResult<Post> {
        validate_body(body)?;

        let post = self.store.with_snapshot(|snapshot| -> ApiResult<_> {
            let subject = self.tokens.verify(token)?;
            // the token may outlive the account it was signed for
            let author_id = snapshot
                .account_by_id(subject)
                .map(|account| account.id)
                .ok_or(ApiError::NotFound(Resource::Account))?;

            Ok(snapshot.insert_post(body.to_string(), author_id))
        })?;

        info!(post_id = post.id, author_id = post.author_id, "Post created");
        Ok(post)
    }

    pub fn get(&self, id: u64) -> ApiResult<Option<Post>> {
        self.store.read(|snapshot| Ok(snapshot.post(id).cloned()))
    }

    pub fn list(&self) -> ApiResult<Vec<Post>> {
        self.store.read(|snapshot| Ok(snapshot.posts()))
    }

    /// Deleting an id that does not exist succeeds without checking `token`.
    pub fn delete(&self, id: u64, token: &str) -> ApiResult<()> {
        let removed = self.store.with_snapshot(|snapshot| -> ApiResult<_> {
            let Some(author_id) = snapshot.post(id).map(|post| post.author_id) else {
                return Ok(false);
            };

            let subject = self.tokens.verify(token)?;
            if subject != author_id {
                return Err(ApiError::Forbidden);
            }

            snapshot.remove_post(id);
            Ok(true)
        })?;

        if removed {
            info!(post_id = id, "Post deleted");
        }
        Ok(())
    }
}

fn validate_body(body: &str) -> ApiResult<()> {
    if body.trim().is_empty() {
        return Err(ApiError::Validation("Post body is empty".into()));
    }
    if body.chars().count() > MAX_POST_LENGTH {
        return Err(ApiError::Validation("Post is too long".into()));
    }
    Ok(())
}
