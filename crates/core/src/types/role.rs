//! User roles.

use serde::{Deserialize, Serialize};

/// Privilege level of a user account.
///
/// Stored in the database as an `is_admin` boolean; surfaced everywhere else
/// as this enum so role checks are explicit rather than bare flag reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// An ordinary customer account.
    #[default]
    Customer,
    /// An administrator with access to management endpoints.
    Admin,
}

impl Role {
    /// Whether this role carries administrator privilege.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Convert from the stored `is_admin` flag.
    #[must_use]
    pub const fn from_is_admin(is_admin: bool) -> Self {
        if is_admin { Self::Admin } else { Self::Customer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_and_from_flag() {
        assert_eq!(Role::from_is_admin(true), Role::Admin);
        assert_eq!(Role::from_is_admin(false), Role::Customer);
        assert!(Role::Admin.is_admin());
        assert!(!Role::Customer.is_admin());
    }
}
