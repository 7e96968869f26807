//! Authentication and password hashing.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - Password verification
//! - User role definitions

mod password;

pub use password::{PasswordError, hash_password, verify_password};

use serde::{Deserialize, Serialize};

/// User roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Manages users and account categories.
    Admin,
    /// Keeps their own books.
    User,
}

impl UserRole {
    /// Returns the role's wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Returns true if this role can manage users.
    #[must_use]
    pub const fn can_manage_users(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true if this role can edit account categories.
    #[must_use]
    pub const fn can_manage_categories(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" | "non-admin" => Ok(Self::User),
            other => Err(format!("unknown role: {other}")),
        }
    }
}
