//! Caller identity.
//!
//! Authentication happens upstream; the core only receives an [`Actor`] and enforces the
//! pass/fail capability rules before touching any data.

use crate::entities::order;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// What the caller is allowed to do
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

/// An authenticated caller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor {
    /// User account id
    pub user_id: i64,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub const fn customer(user_id: i64) -> Self {
        Self {
            user_id,
            role: Role::Customer,
        }
    }

    #[must_use]
    pub const fn admin(user_id: i64) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Fails with [`Error::Forbidden`] unless the caller is an admin.
    pub fn require_admin(&self, action: &str) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::Forbidden {
                action: action.to_string(),
            })
        }
    }

    /// Admins see every order, customers only their own.
    #[must_use]
    pub const fn can_view(&self, order: &order::Model) -> bool {
        self.is_admin() || order.user_id == self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_admin() {
        assert!(Actor::admin(1).require_admin("verify orders").is_ok());
        let err = Actor::customer(2).require_admin("verify orders").unwrap_err();
        assert!(matches!(err, Error::Forbidden { ref action } if action == "verify orders"));
    }
}
