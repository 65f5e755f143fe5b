//! Bibliographic sources cited as evidence for items

use std::fmt;

use crate::UserId;

/// Identifier of a bibliographic source
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(u64);

impl SourceId {
    /// Create a SourceId from a raw value
    pub fn from_value(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Descriptive fields of a source, shared by new and stored sources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSource {
    /// Kind of source, e.g. "book" or "article"
    pub sourcetype: String,
    /// Author names, in citation order
    pub authors: Vec<String>,
    /// Editor names, in citation order
    pub editors: Vec<String>,
    #[allow(missing_docs)]
    pub title: Option<String>,
    #[allow(missing_docs)]
    pub publisher: Option<String>,
    #[allow(missing_docs)]
    pub year: Option<String>,
    #[allow(missing_docs)]
    pub volume: Option<String>,
    #[allow(missing_docs)]
    pub number: Option<String>,
    #[allow(missing_docs)]
    pub series: Option<String>,
    #[allow(missing_docs)]
    pub address: Option<String>,
    #[allow(missing_docs)]
    pub edition: Option<String>,
    #[allow(missing_docs)]
    pub month: Option<String>,
    #[allow(missing_docs)]
    pub journal: Option<String>,
    #[allow(missing_docs)]
    pub pages: Option<String>,
    #[allow(missing_docs)]
    pub isbn10: Option<String>,
    #[allow(missing_docs)]
    pub isbn13: Option<String>,
    #[allow(missing_docs)]
    pub note: Option<String>,
}

impl NewSource {
    /// Create a source of the given type with no descriptive fields
    pub fn new(sourcetype: impl Into<String>) -> Self {
        Self {
            sourcetype: sourcetype.into(),
            ..Default::default()
        }
    }

    /// Trim every field, dropping blank values and blank names
    pub fn normalized(mut self) -> Self {
        self.sourcetype = self.sourcetype.trim().to_string();
        self.authors = clean_names(self.authors);
        self.editors = clean_names(self.editors);
        for field in [
            &mut self.title,
            &mut self.publisher,
            &mut self.year,
            &mut self.volume,
            &mut self.number,
            &mut self.series,
            &mut self.address,
            &mut self.edition,
            &mut self.month,
            &mut self.journal,
            &mut self.pages,
            &mut self.isbn10,
            &mut self.isbn13,
            &mut self.note,
        ] {
            *field = field.take().and_then(|v| non_blank(&v));
        }
        self
    }
}

/// A stored bibliographic source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefNode {
    /// Identifier
    pub id: SourceId,

    /// Descriptive fields
    pub fields: NewSource,

    /// Who entered the source
    pub created_by: UserId,

    /// When the source was entered
    pub created_at: u64,
}

impl RefNode {
    /// Render a plain-text citation
    ///
    /// Authors first ("A", "A and B", "A, B, and C"), then the title; books
    /// add edition, series/volume/number and publication details; a note
    /// closes the citation.
    ///
    /// # Examples
    ///
    /// ```
    /// use teoremer_domain::{NewSource, RefNode, SourceId, UserId};
    ///
    /// let mut fields = NewSource::new("book");
    /// fields.authors = vec!["Halmos".into()];
    /// fields.title = Some("Naive Set Theory".into());
    /// fields.year = Some("1960".into());
    /// let node = RefNode { id: SourceId::from_value(1), fields, created_by: UserId::from_value(1), created_at: 0 };
    /// assert_eq!(node.citation(), "Halmos. Naive Set Theory. 1960.");
    /// ```
    pub fn citation(&self) -> String {
        let data = self.fields.clone().normalized();
        let mut parts: Vec<String> = Vec::new();

        match data.authors.as_slice() {
            [] => {}
            [one] => parts.push(format!("{}.", one)),
            [first, second] => parts.push(format!("{} and {}.", first, second)),
            [init @ .., last] => parts.push(format!("{}, and {}.", init.join(", "), last)),
        }

        if let Some(title) = &data.title {
            parts.push(format!("{}.", title));
        }

        if data.sourcetype == "book" {
            if let Some(edition) = &data.edition {
                parts.push(format!("{} edition.", edition));
            }

            let mut items = Vec::new();
            if let Some(series) = &data.series {
                items.push(series.clone());
            }
            if let Some(volume) = &data.volume {
                items.push(format!("Volume {}", volume));
            }
            if let Some(number) = &data.number {
                items.push(format!("Number {}", number));
            }
            if !items.is_empty() {
                parts.push(format!("{}.", items.join(", ")));
            }

            let items: Vec<&str> = [&data.publisher, &data.address, &data.month, &data.year]
                .into_iter()
                .filter_map(|v| v.as_deref())
                .collect();
            if !items.is_empty() {
                parts.push(format!("{}.", items.join(", ")));
            }
        } else if let Some(year) = &data.year {
            parts.push(format!("{}.", year));
        }

        if let Some(note) = &data.note {
            parts.push(format!("{}.", note));
        }

        parts.join(" ")
    }
}

impl fmt::Display for RefNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Source {}", self.id)
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn clean_names(names: Vec<String>) -> Vec<String> {
    names.iter().filter_map(|n| non_blank(n)).collect()
}
