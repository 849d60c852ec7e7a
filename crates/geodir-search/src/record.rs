//! Directory records and categories.

use std::fmt;

use geodir_layout::LatLon;
use serde::{Deserialize, Serialize};

use crate::normalize::normalize;
use crate::skills::SkillSet;

/// Stable record identity: the position in [`RecordStore`](crate::RecordStore) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub usize);

impl RecordId {
    /// Get the raw index value.
    #[inline]
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A coarse filtering label, taken from a record's organization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text fields of a record as delivered by ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFields {
    /// Display name (person or mission title)
    pub name: String,
    /// Organization; also the record's category
    pub organization: String,
    /// Role or project lead
    pub role: String,
    /// Free-text notes (skills, territory, referent...)
    pub notes: String,
    /// Contact strings (email, phone)
    pub contact: Vec<String>,
    /// Locality shown on cards; not searched
    pub locality: String,
    /// Contract amount, when the source has one
    pub amount: Option<f64>,
    /// Notes split into thematics and competences
    #[serde(default, skip_serializing_if = "SkillSet::is_empty")]
    pub skills: SkillSet,
}

/// Which fields feed the search haystack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchFields {
    /// Name, organization, role, contacts and notes
    #[default]
    All,
    /// As `All`, without contacts
    WithoutContact,
}

/// An immutable directory entry with a valid coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(flatten)]
    fields: RecordFields,
    category: Category,
    coord: LatLon,
    #[serde(skip)]
    haystack: String,
}

impl Record {
    /// Build a record searchable on all text fields. The category is the
    /// organization name.
    pub fn new(fields: RecordFields, coord: LatLon) -> Self {
        Self::with_search_fields(fields, coord, SearchFields::All)
    }

    /// Build a record whose haystack covers only `search`.
    pub fn with_search_fields(fields: RecordFields, coord: LatLon, search: SearchFields) -> Self {
        let category = Category::new(fields.organization.trim());
        let haystack = normalize(&searchable_text(&fields, search));
        Self {
            fields,
            category,
            coord,
            haystack,
        }
    }

    pub fn fields(&self) -> &RecordFields {
        &self.fields
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn coord(&self) -> LatLon {
        self.coord
    }

    /// Normalized concatenation of all searchable fields.
    pub fn haystack(&self) -> &str {
        &self.haystack
    }
}

/// Non-empty searchable fields joined by single spaces.
fn searchable_text(fields: &RecordFields, search: SearchFields) -> String {
    let mut parts = vec![
        fields.name.as_str(),
        fields.organization.as_str(),
        fields.role.as_str(),
    ];
    if search == SearchFields::All {
        parts.extend(fields.contact.iter().map(String::as_str));
    }
    parts.push(fields.notes.as_str());
    parts.retain(|p| !p.trim().is_empty());
    parts.join(" ")
}
