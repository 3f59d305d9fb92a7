//! Shared sync pipeline entrypoint used by the CLI and the daemon.
//!
//! ```text
//! fetch → gate → extract → read sheet → reconcile → compile
//!       → (dry run stops here) → apply → record fingerprint
//! ```
//!
//! Nothing is written to the sheet before a complete plan exists, and the
//! fingerprint is only recorded once every operation has been applied.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use internsync_core::{Config, InsertPolicy};
use internsync_extract::extract;

use crate::backend::SheetBackend;
use crate::error::{SheetError, SyncError, TransportError};
use crate::fingerprint::{fingerprint, FingerprintEntry, FingerprintStore};
use crate::plan::{ChangePlan, PlanMode, WriteOp};
use crate::reconcile::reconcile;
use crate::snapshot::SheetSnapshot;
use crate::source::SourceFetcher;
use crate::writer::{apply, ApplyReport};

/// Per-run switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// URL or path handed to the [`SourceFetcher`].
    pub source: String,
    /// Plan only; never touch the sheet or the fingerprint store.
    pub dry_run: bool,
    /// Skip the change-detection gate.
    pub force: bool,
    pub insert_policy: InsertPolicy,
    pub batch_rows: usize,
    pub write_delay: Duration,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            source: config.source.clone(),
            dry_run: false,
            force: false,
            insert_policy: config.insert_policy,
            batch_rows: config.batch_rows,
            write_delay: config.write_delay(),
        }
    }
}

/// Everything a run talks to.
pub struct Collaborators<'a> {
    pub source: &'a dyn SourceFetcher,
    pub sheet: &'a mut dyn SheetBackend,
    pub fingerprints: &'a mut dyn FingerprintStore,
}

/// Counts describing one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub source: String,
    pub fingerprint: String,
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub duplicates: usize,
    /// Table rows skipped because they continued a non-existent company.
    pub orphaned: Vec<usize>,
    pub full_upload: bool,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The source matched the recorded fingerprint; nothing was read or written.
    Unchanged { summary: RunSummary },
    /// Dry run: the plan and the operations it compiles to.
    Planned {
        summary: RunSummary,
        plan: ChangePlan,
        ops: Vec<WriteOp>,
    },
    /// Every operation was applied and the fingerprint recorded.
    Applied {
        summary: RunSummary,
        report: ApplyReport,
    },
}

impl RunOutcome {
    pub fn summary(&self) -> &RunSummary {
        match self {
            RunOutcome::Unchanged { summary }
            | RunOutcome::Planned { summary, .. }
            | RunOutcome::Applied { summary, .. } => summary,
        }
    }

    /// Short lowercase name for logs and status output.
    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::Unchanged { .. } => "unchanged",
            RunOutcome::Planned { .. } => "planned",
            RunOutcome::Applied { .. } => "applied",
        }
    }
}

/// Run the pipeline once.
pub fn run(collab: &mut Collaborators<'_>, opts: &RunOptions) -> Result<RunOutcome, SyncError> {
    tracing::info!("fetching {}", opts.source);
    let raw = collab.source.fetch(&opts.source)?;
    let digest = fingerprint(&raw);

    let mut summary = RunSummary {
        source: opts.source.clone(),
        fingerprint: digest.clone(),
        ..RunSummary::default()
    };

    if !opts.force {
        let last = collab.fingerprints.read_last_fingerprint(&opts.source)?;
        if last.as_deref() == Some(digest.as_str()) {
            tracing::info!("source unchanged since last run ({}), skipping", short(&digest));
            return Ok(RunOutcome::Unchanged { summary });
        }
    }

    let extraction = extract(&raw)?;
    summary.orphaned = extraction.orphaned;

    let values = collab
        .sheet
        .read_all()
        .map_err(|e| SyncError::Transport(TransportError::Sheet(e)))?;
    let snapshot = SheetSnapshot::from_values(values).map_err(|e| match e {
        layout @ SheetError::Layout(_) => SyncError::Layout(layout),
        other => SyncError::Transport(TransportError::Sheet(other)),
    })?;

    let plan = reconcile(extraction.postings, &snapshot);
    let ops = plan.compile(opts.insert_policy, opts.batch_rows);

    summary.added = plan.added();
    summary.updated = plan.updated();
    summary.unchanged = plan.unchanged;
    summary.duplicates = plan.duplicates;
    summary.full_upload = plan.mode == PlanMode::FullUpload;

    if opts.dry_run {
        tracing::info!(
            "dry run: would add {} and update {} rows in {} writes",
            summary.added,
            summary.updated,
            ops.len()
        );
        return Ok(RunOutcome::Planned { summary, plan, ops });
    }

    let report = apply(&ops, &mut *collab.sheet, opts.write_delay)?;
    collab.fingerprints.write_fingerprint(
        &opts.source,
        FingerprintEntry::new(digest.clone(), report.rows_added, report.rows_updated),
    )?;
    tracing::info!(
        "sync complete: {} added, {} updated, {} unchanged (fingerprint {})",
        report.rows_added,
        report.rows_updated,
        summary.unchanged,
        short(&digest)
    );
    Ok(RunOutcome::Applied { summary, report })
}

fn short(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}
