//! Signed, expiring credential tokens.
//!
//! A credential token is the stateless proof of identity the API hands out
//! at login and reads back on every protected request. It encodes the
//! subject user ID plus issued-at/expiry timestamps, signed with a
//! server-held secret:
//!
//! ```text
//! base64url(claims JSON) . base64url(HMAC-SHA256 over the encoded claims)
//! ```
//!
//! Nothing is persisted; verification recomputes the signature. Expiry is
//! fixed at 30 days from issuance, and there is no refresh - an expired
//! token forces re-authentication.
//!
//! The signing secret is injected at construction ([`CredentialCodec::new`]),
//! never read from ambient process state, so the codec can be built with a
//! throwaway secret in tests.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::types::UserId;

type HmacSha256 = Hmac<Sha256>;

/// Validity window of an issued credential, in seconds (30 days).
///
/// The session cookie's `Max-Age` must use the same value so the cookie and
/// the token inside it expire together.
pub const CREDENTIAL_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Why a token failed verification.
///
/// All three collapse to the same 401 at the transport boundary; the
/// distinction exists for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// The token is not two base64url sections joined by a dot, or the
    /// claims inside are not valid JSON.
    #[error("credential token is malformed")]
    Malformed,
    /// The signature does not match the claims.
    #[error("credential signature does not match")]
    BadSignature,
    /// The token was valid once but its expiry has passed.
    #[error("credential has expired")]
    Expired,
}

/// Claims carried inside a token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the authenticated user's ID.
    sub: UserId,
    /// Issued-at, unix seconds.
    iat: i64,
    /// Expiry, unix seconds.
    exp: i64,
}

/// Issues and verifies signed identity tokens.
///
/// Pure computation: no I/O, no clock other than the instant passed in by
/// the public methods.
#[derive(Clone)]
pub struct CredentialCodec {
    secret: SecretString,
}

impl CredentialCodec {
    /// Create a codec signing with the given secret.
    ///
    /// The caller (startup code) is responsible for having validated the
    /// secret; an unconfigured secret is a fatal startup condition, not a
    /// per-request error.
    #[must_use]
    pub const fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Issue a token for `subject`, valid for [`CREDENTIAL_TTL_SECONDS`].
    #[must_use]
    pub fn issue(&self, subject: UserId) -> String {
        self.issue_at(subject, Utc::now())
    }

    /// Verify a token and return its subject.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the token is malformed, the signature
    /// does not match, or the expiry has passed.
    pub fn verify(&self, token: &str) -> Result<UserId, CredentialError> {
        self.verify_at(token, Utc::now())
    }

    fn issue_at(&self, subject: UserId, now: DateTime<Utc>) -> String {
        let claims = Claims {
            sub: subject,
            iat: now.timestamp(),
            exp: now.timestamp() + CREDENTIAL_TTL_SECONDS,
        };
        // Claims are a plain struct of scalars; serialization cannot fail.
        let payload = serde_json::to_vec(&claims).expect("claims serialize to JSON");
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);

        let signature = self.sign(payload_b64.as_bytes());
        let signature_b64 = URL_SAFE_NO_PAD.encode(signature);

        format!("{payload_b64}.{signature_b64}")
    }

    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, CredentialError> {
        let (payload_b64, signature_b64) =
            token.split_once('.').ok_or(CredentialError::Malformed)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| CredentialError::Malformed)?;

        // Constant-time comparison via Mac::verify_slice.
        let mut mac = self.mac();
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| CredentialError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| CredentialError::Malformed)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| CredentialError::Malformed)?;

        if now.timestamp() > claims.exp {
            return Err(CredentialError::Expired);
        }

        Ok(claims.sub)
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts keys of any length")
    }
}

impl std::fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCodec")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn codec() -> CredentialCodec {
        CredentialCodec::new(SecretString::from("kQ7vR2xN9mW4pL8sT1uY6zB3cF5gH0jD"))
    }

    #[test]
    fn round_trips_subject() {
        let codec = codec();
        let subject = UserId::generate();
        let token = codec.issue(subject);
        assert_eq!(codec.verify(&token).unwrap(), subject);
    }

    #[test]
    fn rejects_expired_token() {
        let codec = codec();
        let issued = Utc::now() - Duration::seconds(CREDENTIAL_TTL_SECONDS + 60);
        let token = codec.issue_at(UserId::generate(), issued);
        assert_eq!(codec.verify(&token), Err(CredentialError::Expired));
    }

    #[test]
    fn accepts_token_just_inside_expiry() {
        let codec = codec();
        let issued = Utc::now() - Duration::seconds(CREDENTIAL_TTL_SECONDS - 60);
        let token = codec.issue_at(UserId::generate(), issued);
        assert!(codec.verify(&token).is_ok());
    }

    #[test]
    fn rejects_any_bit_flip_in_signature() {
        let codec = codec();
        let token = codec.issue(UserId::generate());
        let (payload, signature) = token.split_once('.').unwrap();

        let mut raw = URL_SAFE_NO_PAD.decode(signature).unwrap();
        for byte in 0..raw.len() {
            for bit in 0..8 {
                raw[byte] ^= 1 << bit;
                let tampered = format!("{payload}.{}", URL_SAFE_NO_PAD.encode(&raw));
                assert_eq!(
                    codec.verify(&tampered),
                    Err(CredentialError::BadSignature),
                    "flipping bit {bit} of byte {byte} must invalidate the token"
                );
                raw[byte] ^= 1 << bit;
            }
        }
    }

    #[test]
    fn rejects_tampered_claims() {
        let codec = codec();
        let token = codec.issue(UserId::generate());
        let (_, signature) = token.split_once('.').unwrap();

        // Re-encode different claims under the original signature.
        let forged_claims = serde_json::json!({
            "sub": UserId::generate(),
            "iat": Utc::now().timestamp(),
            "exp": Utc::now().timestamp() + CREDENTIAL_TTL_SECONDS,
        });
        let forged_payload = URL_SAFE_NO_PAD.encode(forged_claims.to_string());
        let forged = format!("{forged_payload}.{signature}");

        assert_eq!(codec.verify(&forged), Err(CredentialError::BadSignature));
    }

    #[test]
    fn rejects_token_signed_with_different_secret() {
        let other = CredentialCodec::new(SecretString::from("aJ3mX8qZ5wE2rT7yU4iO1pS6dF9gH0kL"));
        let token = other.issue(UserId::generate());
        assert_eq!(codec().verify(&token), Err(CredentialError::BadSignature));
    }

    #[test]
    fn rejects_garbage() {
        let codec = codec();
        for garbage in ["", "no-dot", "a.b.c.d", "!!!.###", "onlypayload."] {
            assert!(codec.verify(garbage).is_err(), "{garbage:?} must not verify");
        }
    }

    #[test]
    fn debug_redacts_secret() {
        let shown = format!("{:?}", codec());
        assert!(shown.contains("[REDACTED]"));
        assert!(!shown.contains("kQ7vR2xN"));
    }
}
