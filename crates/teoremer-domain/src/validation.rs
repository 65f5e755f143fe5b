//! Validation entries - append-only citation evidence

use std::fmt;

use crate::{DraftId, FinalId, SourceId, UserId};

/// Unique identifier for a validation entry based on UUIDv7
///
/// Chronologically sortable, so ordering by id is ordering by recording time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValidationId(u128);

impl ValidationId {
    /// Generate a new UUIDv7-based ValidationId
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a ValidationId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a ValidationId from its UUID string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid validation id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for ValidationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ValidationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// What a validation entry supports
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValidationTarget {
    /// A published item; entries here feed the item's trust score
    Final(FinalId),

    /// A draft; entries here are recorded but not scored
    Draft(DraftId),
}

impl fmt::Display for ValidationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationTarget::Final(id) => write!(f, "item {}", id),
            ValidationTarget::Draft(id) => write!(f, "draft {}", id),
        }
    }
}

/// A recorded claim that a source supports a target's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationEntry {
    /// Identifier
    pub id: ValidationId,

    /// Item or draft the source supports
    pub target: ValidationTarget,

    /// The supporting source
    pub source: SourceId,

    /// Where in the source the support is found
    pub location: Option<String>,

    /// Who recorded the entry
    pub created_by: UserId,

    /// When the entry was recorded
    pub created_at: u64,
}

impl ValidationEntry {
    /// Create a new entry, normalizing a blank location to absent
    pub fn new(
        target: ValidationTarget,
        source: SourceId,
        created_by: UserId,
        location: Option<&str>,
        created_at: u64,
    ) -> Self {
        Self {
            id: ValidationId::new(),
            target,
            source,
            location: normalize_location(location),
            created_by,
            created_at,
        }
    }
}

/// A user's affirmation of an item validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endorsement {
    /// The endorsed validation entry
    pub validation: ValidationId,

    /// The endorsing user
    pub created_by: UserId,

    /// When the endorsement was made
    pub created_at: u64,
}

/// Trim a location, mapping empty text to `None`
pub fn normalize_location(location: Option<&str>) -> Option<String> {
    location
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}
