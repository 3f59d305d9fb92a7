//! internsync core library: posting model, identity keys, configuration.
//!
//! Public API surface:
//! - [`types`]: postings, fields, sheet rows
//! - [`keys`]: normalizer and key generation
//! - [`config`]: load / save / env overrides
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod keys;
pub mod types;

pub use config::{Config, InsertPolicy, SheetBackendKind, SheetConfig};
pub use error::ConfigError;
pub use keys::{core_key, full_key, listing_key, normalize, normalize_cell};
pub use types::{Field, Posting, RowIndex, SheetRow, COLUMN_COUNT, CONTINUATION_MARKER};
