//! Request middleware: credential cookies and auth extractors.

pub mod auth;
pub mod cookie;

pub use auth::{CurrentUser, RequireAdmin};
pub use cookie::{COOKIE_NAME, clear_credential_cookie, credential_cookie};
