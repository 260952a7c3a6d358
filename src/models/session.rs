//! Session and principal types.
//!
//! A `Session` is an explicit value minted by the authenticator and carried
//! by token through every protected operation; there is no ambient session
//! state anywhere in the crate.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::staff::ADMINISTRATOR_ROLE;

/// The authenticated identity attached to a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Principal {
    Member { id: i32 },
    Staff { id: i32, role: String },
}

impl Principal {
    pub fn is_staff(&self) -> bool {
        matches!(self, Principal::Staff { .. })
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Principal::Staff { role, .. } if role == ADMINISTRATOR_ROLE)
    }

    /// Member identity, if this principal can hold loans and reservations.
    /// Staff principals have none; lending on their behalf is meaningless.
    pub fn member_id(&self) -> Option<i32> {
        match self {
            Principal::Member { id } => Some(*id),
            Principal::Staff { .. } => None,
        }
    }
}

/// Server-side session state, keyed by an opaque token.
///
/// Lives only in the authenticator's in-process store; destroyed on logout
/// or TTL expiry, never written to the durable store.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub principal: Principal,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_requires_the_distinguished_role() {
        let librarian = Principal::Staff {
            id: 1,
            role: "Librarian".to_string(),
        };
        let admin = Principal::Staff {
            id: 2,
            role: ADMINISTRATOR_ROLE.to_string(),
        };
        assert!(!librarian.is_admin());
        assert!(librarian.is_staff());
        assert!(admin.is_admin());
    }

    #[test]
    fn staff_have_no_member_identity() {
        let staff = Principal::Staff {
            id: 7,
            role: "Librarian".to_string(),
        };
        let member = Principal::Member { id: 3 };
        assert_eq!(staff.member_id(), None);
        assert_eq!(member.member_id(), Some(3));
    }
}
