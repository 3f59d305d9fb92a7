//! # internsync-sync
//!
//! Annotation-preserving reconciliation of README postings into a sheet.
//!
//! Call [`pipeline::run`] with a set of [`Collaborators`] to fetch, gate,
//! reconcile and apply in one go, or use [`reconcile()`] and
//! [`ChangePlan::compile`] directly.

pub mod backend;
pub mod diff;
pub mod error;
pub mod fingerprint;
pub mod pipeline;
pub mod plan;
pub mod reconcile;
pub mod snapshot;
pub mod source;
pub mod writer;

pub use backend::{MemorySheet, SheetBackend};
pub use diff::{preview, RowChange};
pub use error::{ApplyProgress, FetchError, SheetError, SyncError, TransportError};
pub use fingerprint::{
    fingerprint, FileFingerprintStore, FingerprintEntry, FingerprintStore,
    MemoryFingerprintStore,
};
pub use pipeline::{run, Collaborators, RunOptions, RunOutcome, RunSummary};
pub use plan::{ChangePlan, PlanMode, RowUpdate, RowsKind, WriteOp};
pub use reconcile::reconcile;
pub use snapshot::SheetSnapshot;
pub use source::{SourceFetcher, StaticSource};
pub use writer::{apply, ApplyReport};
