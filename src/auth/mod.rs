//! OAuth2 token acquisition for the catalog API.
//!
//! One active token is shared by every catalog call. It lives in a
//! [`TokenStore`] and is replaced, never appended, on each successful grant.

mod manager;
mod store;
mod token;

pub use manager::TokenManager;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use token::{OAuthToken, TokenResponse, TokenState};
