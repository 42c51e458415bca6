//! Centralized authorization predicate.
//!
//! Every handler that gates on ownership or role funnels through
//! [`authorize`] with a single [`Requirement`], instead of scattering inline
//! checks per route.

use orchard_core::UserId;

/// The authenticated caller, as resolved by the credential verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    /// The verified user ID from the token's subject claim.
    pub user_id: UserId,
    /// Role flag loaded from the account store.
    pub is_admin: bool,
}

/// What a route demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// The caller must be the recorded owner of the resource. Admins also
    /// pass, so they can inspect any user's resources.
    Owner(UserId),
    /// The caller must hold the admin role.
    Admin,
}

/// Returns whether `identity` satisfies `requirement`.
#[must_use]
pub const fn authorize(identity: &Identity, requirement: Requirement) -> bool {
    match requirement {
        Requirement::Owner(owner_id) => {
            identity.user_id.as_i32() == owner_id.as_i32() || identity.is_admin
        }
        Requirement::Admin => identity.is_admin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn user(id: i32) -> Identity {
        Identity {
            user_id: UserId::new(id),
            is_admin: false,
        }
    }

    const fn admin(id: i32) -> Identity {
        Identity {
            user_id: UserId::new(id),
            is_admin: true,
        }
    }

    #[test]
    fn test_owner_passes_own_resource() {
        assert!(authorize(&user(1), Requirement::Owner(UserId::new(1))));
    }

    #[test]
    fn test_non_owner_rejected() {
        assert!(!authorize(&user(1), Requirement::Owner(UserId::new(2))));
    }

    #[test]
    fn test_admin_passes_any_owner_check() {
        assert!(authorize(&admin(9), Requirement::Owner(UserId::new(2))));
    }

    #[test]
    fn test_admin_requirement() {
        assert!(authorize(&admin(1), Requirement::Admin));
        assert!(!authorize(&user(1), Requirement::Admin));
    }
}
