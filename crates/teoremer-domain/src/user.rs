//! Users and their identifiers

use std::fmt;

/// Identifier of a registered user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(u64);

impl UserId {
    /// Create a UserId from a raw value
    pub fn from_value(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Identifier
    pub id: UserId,

    /// Unique display name
    pub name: String,

    /// When the user joined
    pub created_at: u64,
}
