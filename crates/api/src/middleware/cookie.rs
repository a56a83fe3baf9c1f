//! Credential cookie handling.
//!
//! The signed credential token travels in an HTTP-only cookie so browser
//! scripts can never read it. `SameSite=None; Secure` lets a separately
//! hosted frontend send it on cross-site requests over HTTPS.

use tamarind_core::token::CREDENTIAL_TTL_SECONDS;

/// Name of the credential cookie.
pub const COOKIE_NAME: &str = "jwt";

/// Build the `Set-Cookie` value that installs a credential token.
///
/// The cookie's `Max-Age` matches the token's own expiry so the browser
/// drops it around the time it stops verifying.
#[must_use]
pub fn credential_cookie(token: &str) -> String {
    format!(
        "{COOKIE_NAME}={token}; Path=/; Max-Age={CREDENTIAL_TTL_SECONDS}; HttpOnly; Secure; SameSite=None"
    )
}

/// Build the `Set-Cookie` value that clears the credential cookie.
#[must_use]
pub fn clear_credential_cookie() -> String {
    format!("{COOKIE_NAME}=; Path=/; Max-Age=0; HttpOnly; Secure; SameSite=None")
}

/// Extract the credential token from a `Cookie` request header value.
///
/// Returns `None` when the header has no cookie under [`COOKIE_NAME`].
#[must_use]
pub fn token_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == COOKIE_NAME).then_some(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_cookie_carries_security_attributes() {
        let cookie = credential_cookie("abc.def");
        assert!(cookie.starts_with("jwt=abc.def;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=None"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=2592000"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_credential_cookie();
        assert!(cookie.starts_with("jwt=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[test]
    fn token_extracted_from_header() {
        assert_eq!(token_from_cookie_header("jwt=tok123"), Some("tok123"));
        assert_eq!(
            token_from_cookie_header("theme=dark; jwt=tok123; lang=en"),
            Some("tok123")
        );
    }

    #[test]
    fn missing_or_foreign_cookies_yield_none() {
        assert_eq!(token_from_cookie_header(""), None);
        assert_eq!(token_from_cookie_header("theme=dark"), None);
        // Prefix of the name is not the name
        assert_eq!(token_from_cookie_header("jwt2=tok123"), None);
    }
}
