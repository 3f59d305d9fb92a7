//! Change plans and their compilation into backend write operations.
//!
//! ## Row-index policy
//!
//! Update targets are recorded against the sheet as it was read. With
//! [`InsertPolicy::Top`] new rows are inserted directly below the header
//! *before* updates are written, so every update target is shifted down by
//! the number of inserted rows at compile time. With
//! [`InsertPolicy::Append`] new rows land after the last occupied row and
//! update targets are used as-is.

use internsync_core::{types::header_row, InsertPolicy, Posting, RowIndex};

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// How the plan relates to the current sheet contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMode {
    /// The sheet had no data rows: clear it and upload header + every row.
    FullUpload,
    /// Targeted inserts and in-place updates.
    Incremental,
}

/// An in-place refresh of one existing row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowUpdate {
    /// Row as read at the start of the run.
    pub row: RowIndex,
    /// Stored values before the update.
    pub previous: Posting,
    /// Values to write; annotations already carried over from `previous`.
    pub posting: Posting,
}

/// Output of the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangePlan {
    pub mode: PlanMode,
    /// Postings not yet in the sheet, in extraction order.
    pub inserts: Vec<Posting>,
    pub updates: Vec<RowUpdate>,
    /// Existing postings that need no write.
    pub unchanged: usize,
    /// Extracted postings dropped because an earlier one had the same core key.
    pub duplicates: usize,
    /// Last occupied row of the sheet as read.
    pub last_row: RowIndex,
}

impl ChangePlan {
    pub fn added(&self) -> usize {
        self.inserts.len()
    }

    pub fn updated(&self) -> usize {
        self.updates.len()
    }

    /// True when applying the plan would not touch the sheet.
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty()
    }

    /// Row the `i`-th insert will occupy once applied.
    pub fn insert_row(&self, i: usize, policy: InsertPolicy) -> RowIndex {
        match (self.mode, policy) {
            (PlanMode::FullUpload, _) | (PlanMode::Incremental, InsertPolicy::Top) => {
                RowIndex::FIRST_DATA.shifted(i)
            }
            (PlanMode::Incremental, InsertPolicy::Append) => self.last_row.shifted(1 + i),
        }
    }

    /// Row an update originally addressed at `row` will occupy once inserts
    /// are applied.
    pub fn update_row(&self, row: RowIndex, policy: InsertPolicy) -> RowIndex {
        match policy {
            InsertPolicy::Top => row.shifted(self.inserts.len()),
            InsertPolicy::Append => row,
        }
    }

    /// Ordered backend operations for this plan, with no single write larger
    /// than `batch_rows` rows.
    pub fn compile(&self, policy: InsertPolicy, batch_rows: usize) -> Vec<WriteOp> {
        let batch_rows = batch_rows.max(1);
        if self.is_empty() {
            return Vec::new();
        }

        let mut ops = Vec::new();
        let insert_cells: Vec<Vec<String>> =
            self.inserts.iter().map(Posting::to_cells).collect();

        if self.mode == PlanMode::FullUpload {
            ops.push(WriteOp::Clear);
            ops.push(WriteOp::WriteRows {
                start: RowIndex::HEADER,
                rows: vec![header_row()],
                kind: RowsKind::Header,
            });
            push_batches(
                &mut ops,
                self.insert_row(0, policy),
                insert_cells,
                RowsKind::Added,
                batch_rows,
            );
            return ops;
        }

        let mut updates: Vec<(RowIndex, Vec<String>)> = self
            .updates
            .iter()
            .map(|u| (self.update_row(u.row, policy), u.posting.to_cells()))
            .collect();
        updates.sort_by_key(|(row, _)| *row);

        match policy {
            InsertPolicy::Top => {
                if !insert_cells.is_empty() {
                    ops.push(WriteOp::InsertRows {
                        at: RowIndex::FIRST_DATA,
                        count: insert_cells.len(),
                    });
                    push_batches(
                        &mut ops,
                        self.insert_row(0, policy),
                        insert_cells,
                        RowsKind::Added,
                        batch_rows,
                    );
                }
                push_updates(&mut ops, updates, batch_rows);
            }
            InsertPolicy::Append => {
                push_updates(&mut ops, updates, batch_rows);
                if !insert_cells.is_empty() {
                    push_batches(
                        &mut ops,
                        self.insert_row(0, policy),
                        insert_cells,
                        RowsKind::Added,
                        batch_rows,
                    );
                }
            }
        }
        ops
    }
}

// ---------------------------------------------------------------------------
// Write operations
// ---------------------------------------------------------------------------

/// What a [`WriteOp::WriteRows`] carries, for progress accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowsKind {
    Header,
    Added,
    Updated,
}

/// One backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Clear,
    InsertRows {
        at: RowIndex,
        count: usize,
    },
    WriteRows {
        start: RowIndex,
        rows: Vec<Vec<String>>,
        kind: RowsKind,
    },
}

fn push_batches(
    ops: &mut Vec<WriteOp>,
    start: RowIndex,
    rows: Vec<Vec<String>>,
    kind: RowsKind,
    batch_rows: usize,
) {
    let mut next = start;
    let mut rows = rows.into_iter().peekable();
    while rows.peek().is_some() {
        let batch: Vec<Vec<String>> = rows.by_ref().take(batch_rows).collect();
        let len = batch.len();
        ops.push(WriteOp::WriteRows {
            start: next,
            rows: batch,
            kind,
        });
        next = next.shifted(len);
    }
}

/// Coalesce sorted updates on consecutive rows into single writes.
fn push_updates(
    ops: &mut Vec<WriteOp>,
    updates: Vec<(RowIndex, Vec<String>)>,
    batch_rows: usize,
) {
    let mut run_start: Option<RowIndex> = None;
    let mut run: Vec<Vec<String>> = Vec::new();

    for (row, cells) in updates {
        let contiguous = run_start.is_some_and(|start| start.shifted(run.len()) == row);
        if !contiguous {
            if let Some(start) = run_start.take() {
                let rows = std::mem::take(&mut run);
                push_batches(ops, start, rows, RowsKind::Updated, batch_rows);
            }
            run_start = Some(row);
        }
        run.push(cells);
    }
    if let Some(start) = run_start {
        push_batches(ops, start, run, RowsKind::Updated, batch_rows);
    }
}
