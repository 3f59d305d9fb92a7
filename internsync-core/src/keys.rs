//! Comparison keys for postings.
//!
//! - [`core_key`] identifies "the same internship posting" from the five
//!   identity fields only.
//! - [`full_key`] additionally covers the annotations and changes whenever
//!   any visible field changes. It is the only "update needed" signal.
//! - [`listing_key`] drops DatePosted from the core key; it recognizes a
//!   posting the README re-dated.
//!
//! Both are pipe-joined [`normalize`]d values in [`Field`] order.

use crate::types::{Field, Posting};

const KEY_SEPARATOR: &str = "|";

/// Canonicalize a value for comparison: trim, collapse whitespace runs to a
/// single space, lower-case.
///
/// Never applied to stored values.
pub fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// [`normalize`] for a possibly absent cell. Absent cells normalize to `""`.
pub fn normalize_cell(value: Option<&str>) -> String {
    value.map(normalize).unwrap_or_default()
}

/// Identity key over Company|Role|Location|ApplicationLink|DatePosted.
pub fn core_key(posting: &Posting) -> String {
    join_fields(posting, &Field::IDENTITY)
}

/// Core key without DatePosted.
pub fn listing_key(posting: &Posting) -> String {
    join_fields(posting, &Field::LISTING)
}

/// Identity key plus Recruiters and Notes.
pub fn full_key(posting: &Posting) -> String {
    join_fields(posting, &Field::ALL)
}

fn join_fields(posting: &Posting, fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| normalize(posting.get(*f)))
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}
