mod requests;
mod responses;

pub use requests::{
    CreatePostRequest, LoginRequest, SignupRequest, UpdateAccountRequest, WebhookData,
    WebhookRequest,
};
pub use responses::TokenResponse;
