//! Spreadsheet backend contract and an in-memory implementation.
//!
//! All addressing is by 1-based row index with the header fixed at row 1.
//! Writes always start at column A. A backend instance is bound to a single
//! worksheet.

use internsync_core::RowIndex;

use crate::error::SheetError;

/// Read/write contract the engine needs from a spreadsheet.
pub trait SheetBackend {
    /// Every row of the worksheet, header first. Trailing empty cells and
    /// trailing empty rows may be omitted.
    fn read_all(&mut self) -> Result<Vec<Vec<String>>, SheetError>;

    /// Overwrite `rows.len()` consecutive rows starting at `start`, from
    /// column A. Cells to the right of each written row are left alone.
    fn write_range(&mut self, start: RowIndex, rows: &[Vec<String>]) -> Result<(), SheetError>;

    /// Insert `count` empty rows so that the first of them becomes row `at`.
    fn insert_rows(&mut self, at: RowIndex, count: usize) -> Result<(), SheetError>;

    /// Remove every value from the worksheet.
    fn clear(&mut self) -> Result<(), SheetError>;
}

/// In-memory worksheet.
///
/// Trims trailing empty cells/rows on read like the hosted backend does.
/// Can be told to reject the n-th mutating call to exercise partial-apply
/// reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySheet {
    rows: Vec<Vec<String>>,
    mutations: usize,
    reject_mutation: Option<usize>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sheet pre-filled with `rows` (header first).
    pub fn with_rows<S: AsRef<str>>(rows: &[Vec<S>]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.as_ref().to_string()).collect())
                .collect(),
            ..Self::default()
        }
    }

    /// Reject the `n`-th (1-based) mutating call with HTTP 400.
    pub fn reject_mutation(mut self, n: usize) -> Self {
        self.reject_mutation = Some(n);
        self
    }

    /// Raw grid, untrimmed.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    /// Number of mutating calls received so far.
    pub fn mutations(&self) -> usize {
        self.mutations
    }

    fn record_mutation(&mut self) -> Result<(), SheetError> {
        self.mutations += 1;
        if self.reject_mutation == Some(self.mutations) {
            return Err(SheetError::Rejected {
                status: 400,
                message: format!("mutation {} rejected", self.mutations),
            });
        }
        Ok(())
    }
}

impl SheetBackend for MemorySheet {
    fn read_all(&mut self) -> Result<Vec<Vec<String>>, SheetError> {
        let mut values: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                let keep = row.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1);
                row[..keep].to_vec()
            })
            .collect();
        while values.last().is_some_and(|row| row.is_empty()) {
            values.pop();
        }
        Ok(values)
    }

    fn write_range(&mut self, start: RowIndex, rows: &[Vec<String>]) -> Result<(), SheetError> {
        if start.0 == 0 {
            return Err(SheetError::Rejected {
                status: 400,
                message: "row indices are 1-based".to_string(),
            });
        }
        self.record_mutation()?;
        for (offset, cells) in rows.iter().enumerate() {
            let target = start.0 - 1 + offset;
            if self.rows.len() <= target {
                self.rows.resize_with(target + 1, Vec::new);
            }
            let row = &mut self.rows[target];
            if row.len() < cells.len() {
                row.resize(cells.len(), String::new());
            }
            row[..cells.len()].clone_from_slice(cells);
        }
        Ok(())
    }

    fn insert_rows(&mut self, at: RowIndex, count: usize) -> Result<(), SheetError> {
        if at.0 == 0 {
            return Err(SheetError::Rejected {
                status: 400,
                message: "row indices are 1-based".to_string(),
            });
        }
        self.record_mutation()?;
        let at = at.0 - 1;
        if self.rows.len() < at {
            self.rows.resize_with(at, Vec::new);
        }
        self.rows
            .splice(at..at, std::iter::repeat_with(Vec::new).take(count));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SheetError> {
        self.record_mutation()?;
        self.rows.clear();
        Ok(())
    }
}
