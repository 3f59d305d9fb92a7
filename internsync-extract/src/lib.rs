//! Posting extraction from the upstream README.
//!
//! [`extract`] locates the internship markdown table, splits each row into
//! cells, cleans the HTML the README embeds in some columns, and resolves
//! continuation markers (`↳`, "same company as the previous row") into the
//! preceding company name.
//!
//! Annotation fields are left empty: they are owned by whoever edits the
//! sheet, never by the README.

mod cells;
mod table;

use internsync_core::{Posting, CONTINUATION_MARKER};
use thiserror::Error;

pub use cells::{first_href, html_text};
pub use table::{locate_table, split_cells};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Errors from table extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(
        "internship table not found: expected a `| Company | Role | Location | Application/Link | Date Posted |` header followed by a separator line"
    )]
    TableNotFound,
}

/// Result of a successful extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Postings in README order.
    pub postings: Vec<Posting>,
    /// 1-based table row numbers of continuation rows with no preceding
    /// company. These rows are skipped.
    pub orphaned: Vec<usize>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Extract every posting from a README document.
///
/// Returns [`ExtractError::TableNotFound`] if the header/separator pair is
/// absent. An empty table body is not an error.
pub fn extract(readme: &str) -> Result<Extraction, ExtractError> {
    let lines = locate_table(readme).ok_or(ExtractError::TableNotFound)?;

    let mut extraction = Extraction::default();
    let mut last_company: Option<String> = None;

    for (i, line) in lines.iter().enumerate() {
        let row_number = i + 1;
        let mut posting = posting_from_cells(&split_cells(line));
        if posting.is_blank() {
            continue;
        }

        if posting.company.trim() == CONTINUATION_MARKER {
            match &last_company {
                Some(company) => posting.company = company.clone(),
                None => {
                    tracing::warn!(
                        "table row {row_number}: continuation marker with no preceding company, skipping"
                    );
                    extraction.orphaned.push(row_number);
                    continue;
                }
            }
        } else {
            last_company = Some(posting.company.clone());
        }

        extraction.postings.push(posting);
    }

    tracing::info!(
        "extracted {} postings ({} orphaned continuation rows)",
        extraction.postings.len(),
        extraction.orphaned.len()
    );
    Ok(extraction)
}

/// Map raw README cells onto a posting, cleaning the HTML-bearing columns.
///
/// Missing cells become empty strings.
pub fn posting_from_cells(cells: &[String]) -> Posting {
    let cell = |i: usize| cells.get(i).map(String::as_str).unwrap_or("");
    Posting::new(
        cell(0),
        cell(1),
        html_text(cell(2)),
        first_href(cell(3)).unwrap_or_else(|| cell(3).to_string()),
        cell(4),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
