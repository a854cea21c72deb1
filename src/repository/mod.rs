//! Record repositories over a shared [`Store`](crate::storage::Store).
//!
//! Each public operation is one exclusive section: load, check, mutate,
//! persist. Identity always comes from a verified token, never from a
//! caller-supplied id.

mod accounts;
mod posts;
mod tokens;

pub use accounts::AccountRepository;
pub use posts::{MAX_POST_LENGTH, PostRepository};
pub use tokens::TokenRepository;
