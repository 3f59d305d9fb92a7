//! Error types for internsync-sync.
//!
//! [`SyncError`] is the run-level taxonomy. Collaborators report their own
//! narrower errors ([`FetchError`], [`SheetError`]); the pipeline decides
//! which run-level kind they become depending on the phase they occur in.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use internsync_core::ConfigError;
use internsync_extract::ExtractError;

/// Failures of a [`SourceFetcher`](crate::SourceFetcher).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS or TLS failure.
    #[error("{location} is unreachable: {message}")]
    Unreachable { location: String, message: String },

    /// The server answered with a non-2xx status.
    #[error("{location} returned HTTP {status}")]
    Status { location: String, status: u16 },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of a [`SheetBackend`](crate::SheetBackend).
#[derive(Debug, Error)]
pub enum SheetError {
    /// The backend could not be reached at all.
    #[error("spreadsheet backend unreachable: {0}")]
    Unreachable(String),

    /// The backend answered but refused the request.
    #[error("spreadsheet backend rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend answered with something that is not a value grid.
    #[error("malformed spreadsheet response: {0}")]
    Malformed(String),

    /// The sheet's header does not match the managed columns.
    #[error("unexpected sheet layout: {0}")]
    Layout(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Something between us and the data we need is unavailable.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("source fetch failed: {0}")]
    Source(#[source] FetchError),

    #[error("spreadsheet read failed: {0}")]
    Sheet(#[source] SheetError),
}

/// How far a write phase got before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyProgress {
    pub rows_added: usize,
    pub rows_updated: usize,
    pub ops_applied: usize,
    pub ops_total: usize,
}

/// All errors that can arise from a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing or invalid settings. Not retryable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Source or spreadsheet unavailable before any write was issued.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The README no longer contains the expected table.
    #[error("parse error: {0}")]
    Parse(#[from] ExtractError),

    /// The sheet was readable but its header names foreign columns.
    #[error("{0}")]
    Layout(#[source] SheetError),

    /// A write was rejected mid-apply. Earlier operations were applied.
    #[error(
        "backend rejected a write after {} of {} operations ({} rows added, {} rows updated): {source}",
        .progress.ops_applied,
        .progress.ops_total,
        .progress.rows_added,
        .progress.rows_updated
    )]
    Backend {
        #[source]
        source: SheetError,
        progress: ApplyProgress,
    },

    /// I/O error on local state, with annotated path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON error in the fingerprint store.
    #[error("fingerprint store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Whether re-running later may succeed without operator action.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport(TransportError::Source(err)) => match err {
                FetchError::Unreachable { .. } => true,
                FetchError::Status { status, .. } => *status == 429 || *status >= 500,
                FetchError::Io { .. } => false,
            },
            SyncError::Transport(TransportError::Sheet(err)) => is_transient(err),
            SyncError::Backend { source, .. } => is_transient(source),
            _ => false,
        }
    }
}

fn is_transient(err: &SheetError) -> bool {
    match err {
        SheetError::Unreachable(_) => true,
        SheetError::Rejected { status, .. } => *status == 429 || *status >= 500,
        _ => false,
    }
}

impl From<FetchError> for SyncError {
    fn from(err: FetchError) -> Self {
        SyncError::Transport(TransportError::Source(err))
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
