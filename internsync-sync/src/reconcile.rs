//! Reconciliation engine.
//!
//! Compares freshly extracted postings with the sheet snapshot and produces a
//! [`ChangePlan`] that never discards annotations.
//!
//! Per run:
//!
//! ```text
//! EMPTY_TARGET ──────────────────────────────► FULL_UPLOAD
//! otherwise: BUILD_INDEX → CLASSIFY → UPDATE → INSERT → DONE
//! ```
//!
//! CLASSIFY matches on the core key first. Postings without a core-key hit
//! fall back to the listing key (identity minus DatePosted) so a re-dated
//! README entry refreshes its row instead of duplicating it. The fallback
//! only claims rows no core-key match claimed in the same run.
//!
//! This widens identity beyond the core key: a listing re-posted under the
//! same link with a new date updates the old row in place and keeps its
//! Recruiters and Notes instead of becoming a new row.
//!
//! Tie-breaks:
//! - existing rows sharing a key: the later row wins the index slot;
//! - extracted postings sharing a core key: the first one wins, later ones
//!   are dropped and counted in [`ChangePlan::duplicates`].

use std::collections::{HashMap, HashSet};

use internsync_core::{core_key, full_key, listing_key, Field, Posting, RowIndex};

use crate::plan::{ChangePlan, PlanMode, RowUpdate};
use crate::snapshot::SheetSnapshot;

/// One index slot built from an existing sheet row.
#[derive(Debug, Clone)]
struct IndexedRow<'a> {
    row: RowIndex,
    stored: &'a Posting,
    full_key: String,
}

/// Existing rows by core key and by listing key.
#[derive(Debug, Default)]
struct SheetIndex<'a> {
    by_core: HashMap<String, IndexedRow<'a>>,
    by_listing: HashMap<String, IndexedRow<'a>>,
}

/// Outcome of classifying a single extracted posting.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Classification {
    New(Posting),
    Changed(RowUpdate),
    Unchanged,
}

/// Compute the change plan for `postings` against `snapshot`.
///
/// Never fails on data content.
pub fn reconcile(postings: Vec<Posting>, snapshot: &SheetSnapshot) -> ChangePlan {
    let (postings, duplicates) = dedup_first_seen(postings);

    if snapshot.is_empty_target() {
        tracing::info!(
            "sheet has no data rows; planning full upload of {} postings",
            postings.len()
        );
        return ChangePlan {
            mode: PlanMode::FullUpload,
            inserts: postings,
            updates: Vec::new(),
            unchanged: 0,
            duplicates,
            last_row: snapshot.last_row,
        };
    }

    let index = build_index(snapshot);

    let mut plan = ChangePlan {
        mode: PlanMode::Incremental,
        inserts: Vec::new(),
        updates: Vec::new(),
        unchanged: 0,
        duplicates,
        last_row: snapshot.last_row,
    };

    let mut claimed = HashSet::new();
    let mut unmatched = Vec::new();
    for posting in postings {
        match index.by_core.get(&core_key(&posting)) {
            Some(existing) => {
                claimed.insert(existing.row);
                plan.push(classify(posting, existing));
            }
            None => unmatched.push(posting),
        }
    }

    for posting in unmatched {
        let fallback = index
            .by_listing
            .get(&listing_key(&posting))
            .filter(|existing| !claimed.contains(&existing.row));
        match fallback {
            Some(existing) => {
                tracing::debug!(
                    "row {} re-dated to '{}'",
                    existing.row,
                    posting.date_posted
                );
                claimed.insert(existing.row);
                plan.push(classify(posting, existing));
            }
            None => plan.push(Classification::New(posting)),
        }
    }

    tracing::info!(
        "reconciled against {} rows: {} new, {} changed, {} unchanged, {} duplicates dropped",
        snapshot.data_rows(),
        plan.added(),
        plan.updated(),
        plan.unchanged,
        plan.duplicates
    );
    plan
}

impl ChangePlan {
    fn push(&mut self, classification: Classification) {
        match classification {
            Classification::New(posting) => self.inserts.push(posting),
            Classification::Changed(update) => self.updates.push(update),
            Classification::Unchanged => self.unchanged += 1,
        }
    }
}

fn dedup_first_seen(postings: Vec<Posting>) -> (Vec<Posting>, usize) {
    let mut seen = HashSet::new();
    let before = postings.len();
    let kept: Vec<Posting> = postings
        .into_iter()
        .filter(|p| {
            let key = core_key(p);
            let first = seen.insert(key.clone());
            if !first {
                tracing::warn!("duplicate posting dropped: {key}");
            }
            first
        })
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

fn build_index(snapshot: &SheetSnapshot) -> SheetIndex<'_> {
    let mut index = SheetIndex::default();
    for row in &snapshot.rows {
        let slot = IndexedRow {
            row: row.index,
            stored: &row.posting,
            full_key: full_key(&row.posting),
        };
        index.by_listing.insert(listing_key(&row.posting), slot.clone());
        if let Some(previous) = index.by_core.insert(core_key(&row.posting), slot) {
            tracing::debug!(
                "rows {} and {} share a core key; row {} wins",
                previous.row,
                row.index,
                row.index
            );
        }
    }
    index
}

/// Carry annotations over from `existing`, then compare full keys.
fn classify(mut posting: Posting, existing: &IndexedRow<'_>) -> Classification {
    for field in Field::ANNOTATIONS {
        posting.set(field, existing.stored.get(field));
    }

    if full_key(&posting) == existing.full_key {
        return Classification::Unchanged;
    }

    tracing::debug!("row {} changed", existing.row);
    Classification::Changed(RowUpdate {
        row: existing.row,
        previous: existing.stored.clone(),
        posting,
    })
}
