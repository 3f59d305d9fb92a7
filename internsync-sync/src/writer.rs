//! Sheet writer: applies compiled [`WriteOp`]s to a backend.
//!
//! Operations run strictly in order with `delay` between consecutive calls
//! to stay under backend rate limits. The first rejected call stops the
//! apply and is reported together with how far it got; nothing is rolled
//! back.

use std::thread::sleep;
use std::time::Duration;

use crate::backend::SheetBackend;
use crate::error::{ApplyProgress, SyncError};
use crate::plan::{RowsKind, WriteOp};

/// Outcome of a fully applied plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub rows_added: usize,
    pub rows_updated: usize,
    pub ops_applied: usize,
}

/// Apply `ops` in order.
///
/// Returns [`SyncError::Backend`] with the progress made so far if any call
/// is rejected.
pub fn apply(
    ops: &[WriteOp],
    sheet: &mut dyn SheetBackend,
    delay: Duration,
) -> Result<ApplyReport, SyncError> {
    let mut progress = ApplyProgress {
        ops_total: ops.len(),
        ..ApplyProgress::default()
    };

    for (i, op) in ops.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            sleep(delay);
        }

        let result = match op {
            WriteOp::Clear => sheet.clear(),
            WriteOp::InsertRows { at, count } => sheet.insert_rows(*at, *count),
            WriteOp::WriteRows { start, rows, .. } => sheet.write_range(*start, rows),
        };
        if let Err(source) = result {
            tracing::error!(
                "write {} of {} failed after {} rows added, {} rows updated",
                i + 1,
                ops.len(),
                progress.rows_added,
                progress.rows_updated
            );
            return Err(SyncError::Backend { source, progress });
        }

        match op {
            WriteOp::WriteRows {
                start,
                rows,
                kind: RowsKind::Added,
            } => {
                tracing::info!("added {} rows at row {start}", rows.len());
                progress.rows_added += rows.len();
            }
            WriteOp::WriteRows {
                start,
                rows,
                kind: RowsKind::Updated,
            } => {
                tracing::info!("updated {} rows at row {start}", rows.len());
                progress.rows_updated += rows.len();
            }
            WriteOp::InsertRows { at, count } => {
                tracing::debug!("inserted {count} empty rows at row {at}");
            }
            WriteOp::Clear => tracing::debug!("cleared sheet"),
            WriteOp::WriteRows { .. } => tracing::debug!("wrote header"),
        }
        progress.ops_applied += 1;
    }

    Ok(ApplyReport {
        rows_added: progress.rows_added,
        rows_updated: progress.rows_updated,
        ops_applied: progress.ops_applied,
    })
}
