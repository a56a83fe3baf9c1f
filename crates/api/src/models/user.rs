//! User domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tamarind_core::{Email, Role, UserId};

/// A storefront user.
///
/// The password hash never appears on this type; it is loaded separately by
/// the auth service and only for credential verification. Everything that
/// holds a `User` is downstream of authentication and safe to serialize.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address (unique).
    pub email: Email,
    /// Privilege level.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn serializes_without_any_secret_material() {
        let user = User {
            id: UserId::generate(),
            name: "Ana".to_owned(),
            email: Email::parse("ana@example.com").unwrap(),
            role: Role::Customer,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["name"], "Ana");
        assert_eq!(json["role"], "customer");
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
    }
}
