//! Fingerprint store: SHA-256 change detection for source documents.
//!
//! Persists a [`FingerprintFile`] JSON document at
//! `<home>/.internsync/fingerprints.json`, keyed by source location.
//! Writes use the atomic `.tmp` + rename pattern of the config file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{io_err, SyncError};

/// SHA-256 hex digest of a source document with `\r\n` rewritten to `\n`.
pub fn fingerprint(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n");
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

/// What was recorded after the last successful run for one source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FingerprintEntry {
    pub fingerprint: String,
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub added: usize,
    #[serde(default)]
    pub updated: usize,
}

impl FingerprintEntry {
    pub fn new(fingerprint: impl Into<String>, added: usize, updated: usize) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            recorded_at: Utc::now(),
            added,
            updated,
        }
    }
}

/// On-disk fingerprint store payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FingerprintFile {
    pub updated_at: DateTime<Utc>,
    pub sources: BTreeMap<String, FingerprintEntry>,
}

impl Default for FingerprintFile {
    fn default() -> Self {
        Self {
            updated_at: Utc::now(),
            sources: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EntryCompat {
    Structured(FingerprintEntry),
    Digest(String),
}

#[derive(Debug, Deserialize)]
struct FileCompat {
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    sources: BTreeMap<String, EntryCompat>,
}

/// `~/.internsync/fingerprints.json`
pub fn store_path_at(home: &Path) -> PathBuf {
    home.join(".internsync").join("fingerprints.json")
}

/// Load the fingerprint store. Returns an empty store if the file does not
/// yet exist. Entries recorded as a bare digest string are accepted.
pub fn load_at(home: &Path) -> Result<FingerprintFile, SyncError> {
    let path = store_path_at(home);
    if !path.exists() {
        return Ok(FingerprintFile::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let compat: FileCompat = serde_json::from_str(&contents)?;
    let updated_at = compat.updated_at.unwrap_or_else(Utc::now);
    let sources = compat
        .sources
        .into_iter()
        .map(|(source, entry)| {
            let entry = match entry {
                EntryCompat::Structured(entry) => entry,
                EntryCompat::Digest(fingerprint) => FingerprintEntry {
                    fingerprint,
                    recorded_at: updated_at,
                    added: 0,
                    updated: 0,
                },
            };
            (source, entry)
        })
        .collect();
    Ok(FingerprintFile {
        updated_at,
        sources,
    })
}

/// Save the fingerprint store atomically.
pub fn save_at(home: &Path, store: &FingerprintFile) -> Result<(), SyncError> {
    let path = store_path_at(home);
    let Some(dir) = path.parent() else {
        return Err(io_err(
            path,
            std::io::Error::other("invalid fingerprint store path"),
        ));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(store)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Store contract
// ---------------------------------------------------------------------------

/// Per-source record of the last successfully applied document.
pub trait FingerprintStore {
    fn read_last_fingerprint(&self, source: &str) -> Result<Option<String>, SyncError>;

    fn write_fingerprint(&mut self, source: &str, entry: FingerprintEntry)
        -> Result<(), SyncError>;
}

/// [`FingerprintStore`] backed by `~/.internsync/fingerprints.json`.
#[derive(Debug, Clone)]
pub struct FileFingerprintStore {
    home: PathBuf,
}

impl FileFingerprintStore {
    pub fn at(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn path(&self) -> PathBuf {
        store_path_at(&self.home)
    }

    pub fn load(&self) -> Result<FingerprintFile, SyncError> {
        load_at(&self.home)
    }
}

impl FingerprintStore for FileFingerprintStore {
    fn read_last_fingerprint(&self, source: &str) -> Result<Option<String>, SyncError> {
        Ok(load_at(&self.home)?
            .sources
            .remove(source)
            .map(|entry| entry.fingerprint))
    }

    fn write_fingerprint(
        &mut self,
        source: &str,
        entry: FingerprintEntry,
    ) -> Result<(), SyncError> {
        let mut store = load_at(&self.home)?;
        store.updated_at = entry.recorded_at;
        store.sources.insert(source.to_string(), entry);
        save_at(&self.home, &store)
    }
}

/// In-memory [`FingerprintStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryFingerprintStore {
    pub entries: BTreeMap<String, FingerprintEntry>,
}

impl FingerprintStore for MemoryFingerprintStore {
    fn read_last_fingerprint(&self, source: &str) -> Result<Option<String>, SyncError> {
        Ok(self.entries.get(source).map(|e| e.fingerprint.clone()))
    }

    fn write_fingerprint(
        &mut self,
        source: &str,
        entry: FingerprintEntry,
    ) -> Result<(), SyncError> {
        self.entries.insert(source.to_string(), entry);
        Ok(())
    }
}
