//! Domain types for internship postings and the sheet rows that hold them.
//!
//! The order of [`Field::ALL`] is a frozen contract: it is the visible column
//! order of the sheet and the composition order of every identity key.
//! Reordering it changes every key ever computed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker the README uses for "same company as the previous row".
pub const CONTINUATION_MARKER: &str = "↳";

/// Number of visible columns managed in the sheet (A..G).
pub const COLUMN_COUNT: usize = Field::ALL.len();

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// A named column of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Company,
    Role,
    Location,
    ApplicationLink,
    DatePosted,
    Recruiters,
    Notes,
}

impl Field {
    /// Every field in visible column order.
    pub const ALL: [Field; 7] = [
        Field::Company,
        Field::Role,
        Field::Location,
        Field::ApplicationLink,
        Field::DatePosted,
        Field::Recruiters,
        Field::Notes,
    ];

    /// Identity fields, in core-key order.
    pub const IDENTITY: [Field; 5] = [
        Field::Company,
        Field::Role,
        Field::Location,
        Field::ApplicationLink,
        Field::DatePosted,
    ];

    /// Identity fields that survive a re-dated listing.
    pub const LISTING: [Field; 4] = [
        Field::Company,
        Field::Role,
        Field::Location,
        Field::ApplicationLink,
    ];

    /// Human-owned annotation fields.
    pub const ANNOTATIONS: [Field; 2] = [Field::Recruiters, Field::Notes];

    /// Header label written to row 1 of the sheet.
    pub fn label(self) -> &'static str {
        match self {
            Field::Company => "Company",
            Field::Role => "Role",
            Field::Location => "Location",
            Field::ApplicationLink => "Application/Link",
            Field::DatePosted => "Date Posted",
            Field::Recruiters => "Recruiters",
            Field::Notes => "Notes",
        }
    }

    /// Whether `label` names this field, ignoring case, spacing and punctuation.
    ///
    /// `"ApplicationLink"`, `"application / link"` and `"Application/Link"`
    /// all match [`Field::ApplicationLink`].
    pub fn matches_label(self, label: &str) -> bool {
        squash(label) == squash(self.label())
    }

    pub fn is_annotation(self) -> bool {
        matches!(self, Field::Recruiters | Field::Notes)
    }

    /// Zero-based column position.
    pub fn column(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.label().fmt(f)
    }
}

fn squash(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// The header row in visible column order.
pub fn header_row() -> Vec<String> {
    Field::ALL.iter().map(|f| f.label().to_string()).collect()
}

// ---------------------------------------------------------------------------
// Posting
// ---------------------------------------------------------------------------

/// A single internship posting.
///
/// Values are stored exactly as displayed; normalization only happens when
/// keys are derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Role")]
    pub role: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Application/Link")]
    pub application_link: String,
    #[serde(rename = "Date Posted")]
    pub date_posted: String,
    #[serde(rename = "Recruiters", default)]
    pub recruiters: String,
    #[serde(rename = "Notes", default)]
    pub notes: String,
}

impl Posting {
    /// Build a posting from its identity fields; annotations start empty.
    pub fn new(
        company: impl Into<String>,
        role: impl Into<String>,
        location: impl Into<String>,
        application_link: impl Into<String>,
        date_posted: impl Into<String>,
    ) -> Self {
        Self {
            company: company.into(),
            role: role.into(),
            location: location.into(),
            application_link: application_link.into(),
            date_posted: date_posted.into(),
            recruiters: String::new(),
            notes: String::new(),
        }
    }

    pub fn with_annotations(
        mut self,
        recruiters: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        self.recruiters = recruiters.into();
        self.notes = notes.into();
        self
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Company => &self.company,
            Field::Role => &self.role,
            Field::Location => &self.location,
            Field::ApplicationLink => &self.application_link,
            Field::DatePosted => &self.date_posted,
            Field::Recruiters => &self.recruiters,
            Field::Notes => &self.notes,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Company => &mut self.company,
            Field::Role => &mut self.role,
            Field::Location => &mut self.location,
            Field::ApplicationLink => &mut self.application_link,
            Field::DatePosted => &mut self.date_posted,
            Field::Recruiters => &mut self.recruiters,
            Field::Notes => &mut self.notes,
        };
        *slot = value.into();
    }

    /// Build a posting from positional cells in visible column order.
    ///
    /// Missing trailing cells default to the empty string; cells beyond the
    /// managed columns are ignored.
    pub fn from_cells<S: AsRef<str>>(cells: &[S]) -> Self {
        let mut posting = Posting::default();
        for (field, cell) in Field::ALL.iter().zip(cells) {
            posting.set(*field, cell.as_ref());
        }
        posting
    }

    /// Cells in visible column order.
    pub fn to_cells(&self) -> Vec<String> {
        Field::ALL.iter().map(|f| self.get(*f).to_string()).collect()
    }

    /// True when every visible field is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// Sheet rows
// ---------------------------------------------------------------------------

/// A 1-based sheet row number. Row 1 is the header.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RowIndex(pub usize);

impl RowIndex {
    pub const HEADER: RowIndex = RowIndex(1);
    pub const FIRST_DATA: RowIndex = RowIndex(2);

    /// This row shifted down by `rows`.
    pub fn shifted(self, rows: usize) -> RowIndex {
        RowIndex(self.0 + rows)
    }
}

impl fmt::Display for RowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<usize> for RowIndex {
    fn from(n: usize) -> Self {
        Self(n)
    }
}

/// A posting as currently persisted in the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub index: RowIndex,
    pub posting: Posting,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
