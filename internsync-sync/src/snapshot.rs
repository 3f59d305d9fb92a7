//! Point-in-time view of the sheet's current contents.

use internsync_core::{Field, Posting, RowIndex, SheetRow};

use crate::error::SheetError;

/// The sheet as read at the start of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetSnapshot {
    /// Non-blank data rows in sheet order.
    pub rows: Vec<SheetRow>,
    /// Last occupied row (header included); `RowIndex(0)` for an empty sheet.
    pub last_row: RowIndex,
}

impl SheetSnapshot {
    /// Build a snapshot from a raw value grid (row 1 = header).
    ///
    /// Returns [`SheetError::Layout`] when a header cell names a different
    /// column than the managed layout expects. Missing header cells and
    /// columns past the managed ones are accepted.
    pub fn from_values(values: Vec<Vec<String>>) -> Result<Self, SheetError> {
        let last_row = RowIndex(values.len());
        let mut values = values.into_iter();
        let Some(header) = values.next() else {
            return Ok(Self::default());
        };
        check_header(&header)?;

        let rows = values
            .enumerate()
            .map(|(i, cells)| SheetRow {
                index: RowIndex::FIRST_DATA.shifted(i),
                posting: Posting::from_cells(&cells),
            })
            .filter(|row| !row.posting.is_blank())
            .collect();

        Ok(Self { rows, last_row })
    }

    /// True when there is nothing to reconcile against.
    pub fn is_empty_target(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn data_rows(&self) -> usize {
        self.rows.len()
    }
}

fn check_header(header: &[String]) -> Result<(), SheetError> {
    for (field, label) in Field::ALL.iter().zip(header) {
        if label.trim().is_empty() || field.matches_label(label) {
            continue;
        }
        return Err(SheetError::Layout(format!(
            "column {} is headed '{}', expected '{}'",
            column_letter(field.column()),
            label,
            field.label()
        )));
    }
    Ok(())
}

fn column_letter(column: usize) -> char {
    (b'A' + column as u8) as char
}
