//! User domain type.

use artisania_core::{Address, Email, UserId, UserRole};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A marketplace account. The password hash is never part of this type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub role: UserRole,
    pub is_active: bool,
    pub is_verified: bool,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub address: Option<Address>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
