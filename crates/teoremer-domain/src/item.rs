//! Item module - drafts and published (final) items

use std::fmt;

use crate::UserId;

/// Kind of mathematical item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemType {
    /// A definition
    Definition,

    /// A theorem
    Theorem,

    /// A proof of a published theorem
    Proof,
}

impl ItemType {
    /// Single-letter storage code ('D', 'T', 'P')
    pub fn code(&self) -> char {
        match self {
            ItemType::Definition => 'D',
            ItemType::Theorem => 'T',
            ItemType::Proof => 'P',
        }
    }

    /// Parse from a storage code
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'D' => Some(ItemType::Definition),
            'T' => Some(ItemType::Theorem),
            'P' => Some(ItemType::Proof),
            _ => None,
        }
    }

    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Definition => "definition",
            ItemType::Theorem => "theorem",
            ItemType::Proof => "proof",
        }
    }

    /// Parse a type name ("definition", "theorem", "proof")
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "definition" => Some(ItemType::Definition),
            "theorem" => Some(ItemType::Theorem),
            "proof" => Some(ItemType::Proof),
            _ => None,
        }
    }

    /// Whether items of this type hang off a parent item
    ///
    /// Only proofs do; their parent is a published theorem.
    pub fn has_parent(&self) -> bool {
        matches!(self, ItemType::Proof)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid item type: {}", s))
    }
}

/// Status of an unpublished item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftStatus {
    /// Being written
    Draft,

    /// Ready for scrutiny before publication
    Review,
}

impl DraftStatus {
    /// Single-letter storage code ('D', 'R')
    pub fn code(&self) -> char {
        match self {
            DraftStatus::Draft => 'D',
            DraftStatus::Review => 'R',
        }
    }

    /// Parse from a storage code
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'D' => Some(DraftStatus::Draft),
            'R' => Some(DraftStatus::Review),
            _ => None,
        }
    }

    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::Draft => "draft",
            DraftStatus::Review => "review",
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a published item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinalStatus {
    /// Published and citable
    Final,

    /// Withdrawn from circulation; no longer satisfies references
    Suspended,
}

impl FinalStatus {
    /// Single-letter storage code ('F', 'S')
    pub fn code(&self) -> char {
        match self {
            FinalStatus::Final => 'F',
            FinalStatus::Suspended => 'S',
        }
    }

    /// Parse from a storage code
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'F' => Some(FinalStatus::Final),
            'S' => Some(FinalStatus::Suspended),
            _ => None,
        }
    }

    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalStatus::Final => "final",
            FinalStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage identifier of a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DraftId(u64);

impl DraftId {
    /// Create a DraftId from a raw value
    pub fn from_value(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public identifier of a published item, e.g. `D1` or `T42`
///
/// Assigned once at publication from the item type letter and a store-wide
/// sequence number. Never reused.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FinalId(String);

impl FinalId {
    /// Create a FinalId from its public form
    ///
    /// # Errors
    /// Returns error if the id is empty or contains non-word characters
    ///
    /// # Examples
    ///
    /// ```
    /// use teoremer_domain::FinalId;
    ///
    /// assert!(FinalId::new("T42").is_ok());
    /// assert!(FinalId::new("T 42").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        if value.is_empty() {
            return Err("Item id cannot be empty".to_string());
        }
        if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!("Invalid item id: {}", value));
        }
        Ok(Self(value))
    }

    /// Build the public id for the `seq`-th published item
    pub fn from_sequence(itemtype: ItemType, seq: u64) -> Self {
        Self(format!("{}{}", itemtype.code(), seq))
    }

    /// Get the id as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FinalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An editable, unpublished item
#[derive(Debug, Clone, PartialEq)]
pub struct DraftItem {
    /// Storage identifier
    pub id: DraftId,

    /// Definition, theorem or proof
    pub itemtype: ItemType,

    /// Draft or review
    pub status: DraftStatus,

    /// Free text with embedded reference markers
    pub body: String,

    /// Author of the draft
    pub created_by: UserId,

    /// Theorem a proof belongs to
    pub parent: Option<FinalId>,

    /// When the draft was created
    pub created_at: u64,

    /// When the draft was last changed
    pub modified_at: u64,
}

/// Input for creating a draft
#[derive(Debug, Clone, PartialEq)]
pub struct NewDraft {
    /// Definition, theorem or proof
    pub itemtype: ItemType,

    /// Initial body
    pub body: String,

    /// Author of the draft
    pub created_by: UserId,

    /// Theorem a proof belongs to
    pub parent: Option<FinalId>,
}

impl NewDraft {
    /// Create a draft request without a parent
    pub fn new(itemtype: ItemType, body: impl Into<String>, created_by: UserId) -> Self {
        Self {
            itemtype,
            body: body.into(),
            created_by,
            parent: None,
        }
    }

    /// Attach the draft to a parent item
    pub fn with_parent(mut self, parent: FinalId) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// A published, citable item
///
/// Immutable once created apart from its status and the validation
/// evidence attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalItem {
    /// Public identifier
    pub final_id: FinalId,

    /// Definition, theorem or proof
    pub itemtype: ItemType,

    /// Final or suspended
    pub status: FinalStatus,

    /// Published body
    pub body: String,

    /// Author of the originating draft
    pub created_by: UserId,

    /// Theorem a proof belongs to
    pub parent: Option<FinalId>,

    /// When the item was published
    pub created_at: u64,
}

impl fmt::Display for FinalItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.itemtype.as_str();
        let mut chars = name.chars();
        if let Some(first) = chars.next() {
            write!(f, "{}{}", first.to_ascii_uppercase(), chars.as_str())?;
        }
        write!(f, " {}", self.final_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_type_codes() {
        for t in [ItemType::Definition, ItemType::Theorem, ItemType::Proof] {
            assert_eq!(ItemType::from_code(t.code()), Some(t));
            assert_eq!(ItemType::parse(t.as_str()), Some(t));
        }
        assert_eq!(ItemType::from_code('X'), None);
        assert_eq!("Theorem".parse::<ItemType>(), Ok(ItemType::Theorem));
    }

    #[test]
    fn test_only_proofs_have_parents() {
        assert!(ItemType::Proof.has_parent());
        assert!(!ItemType::Theorem.has_parent());
        assert!(!ItemType::Definition.has_parent());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(DraftStatus::from_code('R'), Some(DraftStatus::Review));
        assert_eq!(DraftStatus::from_code('F'), None);
        assert_eq!(FinalStatus::from_code('F'), Some(FinalStatus::Final));
        assert_eq!(FinalStatus::Suspended.code(), 'S');
    }

    #[test]
    fn test_final_id_from_sequence() {
        let id = FinalId::from_sequence(ItemType::Theorem, 42);
        assert_eq!(id.as_str(), "T42");
        assert_eq!(FinalId::new("T42").unwrap(), id);
    }

    #[test]
    fn test_final_id_rejects_garbage() {
        assert!(FinalId::new("").is_err());
        assert!(FinalId::new("a-b").is_err());
        assert!(FinalId::new("q25tY").is_ok());
    }

    #[test]
    fn test_final_item_display() {
        let item = FinalItem {
            final_id: FinalId::new("D1").unwrap(),
            itemtype: ItemType::Definition,
            status: FinalStatus::Final,
            body: "x".to_string(),
            created_by: UserId::from_value(1),
            parent: None,
            created_at: 0,
        };
        assert_eq!(item.to_string(), "Definition D1");
    }
}
