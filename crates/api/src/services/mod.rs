//! Business logic between the routes and the repositories.
//!
//! Services own authorization rules and multi-step flows; the repositories
//! in [`crate::db`] own SQL and transactions.

pub mod auth;
pub mod orders;
pub mod products;
pub mod shops;

use artisania_core::{UserId, UserRole};

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: UserRole,
}

impl Actor {
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Admins may act on anything; everyone else only on what they own.
    #[must_use]
    pub fn owns_or_admin(self, owner: UserId) -> bool {
        self.is_admin() || self.id == owner
    }
}
