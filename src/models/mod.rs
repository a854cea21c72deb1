mod account;
mod post;

pub use account::{Account, AccountView, Session};
pub use post::Post;
