//! Run configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.internsync/
//!   config.yaml          (this module)
//!   fingerprints.json    (internsync-sync)
//!   run/last_run.json    (internsync-daemon)
//! ```
//!
//! Resolution order: defaults, then `config.yaml`, then environment
//! variables, then CLI flags (applied by the binary).
//!
//! # API pattern
//!
//! Every function touching the home directory has two forms:
//! - `fn_at(home: &Path, …)`: explicit home, used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};

/// README the original tracker follows.
pub const DEFAULT_SOURCE: &str =
    "https://raw.githubusercontent.com/vanshb03/Summer2026-Internships/main/README.md";

pub const ENV_SOURCE: &str = "INTERNSYNC_SOURCE";
pub const ENV_SPREADSHEET_LINK: &str = "GOOGLE_SPREADSHEET_LINK";
pub const ENV_WORKSHEET: &str = "INTERNSYNC_WORKSHEET";
/// Bearer token for the Sheets API. Only ever read from the environment.
pub const ENV_ACCESS_TOKEN: &str = "GOOGLE_ACCESS_TOKEN";

const STATE_DIR: &str = ".internsync";
const CONFIG_FILE: &str = "config.yaml";

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

/// Where new rows go relative to existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InsertPolicy {
    /// Directly below the header; existing rows shift down.
    #[default]
    Top,
    /// After the last existing row.
    Append,
}

/// Which spreadsheet backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SheetBackendKind {
    #[default]
    Google,
    /// Local JSON document; useful offline and in tests.
    File,
}

/// `sheet:` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetConfig {
    #[serde(default)]
    pub backend: SheetBackendKind,

    /// Full browser URL of the spreadsheet (google backend).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spreadsheet_link: Option<String>,

    /// Worksheet (tab) title.
    #[serde(default = "default_worksheet")]
    pub worksheet: String,

    /// Path of the JSON document (file backend).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            backend: SheetBackendKind::default(),
            spreadsheet_link: None,
            worksheet: default_worksheet(),
            path: None,
        }
    }
}

/// Top-level configuration, deserialized from `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// URL or local path of the README to track.
    #[serde(default = "default_source")]
    pub source: String,

    #[serde(default)]
    pub sheet: SheetConfig,

    #[serde(default)]
    pub insert_policy: InsertPolicy,

    /// Pause between consecutive backend write calls.
    #[serde(default = "default_write_delay_ms")]
    pub write_delay_ms: u64,

    /// Maximum rows per write call.
    #[serde(default = "default_batch_rows")]
    pub batch_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: default_source(),
            sheet: SheetConfig::default(),
            insert_policy: InsertPolicy::default(),
            write_delay_ms: default_write_delay_ms(),
            batch_rows: default_batch_rows(),
        }
    }
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}
fn default_worksheet() -> String {
    "Sheet1".to_string()
}
fn default_write_delay_ms() -> u64 {
    1000
}
fn default_batch_rows() -> usize {
    500
}

impl Config {
    pub fn write_delay(&self) -> Duration {
        Duration::from_millis(self.write_delay_ms)
    }

    /// Apply environment overrides using `lookup` (usually `std::env::var`).
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(source) = non_empty(ENV_SOURCE) {
            self.source = source;
        }
        if let Some(link) = non_empty(ENV_SPREADSHEET_LINK) {
            self.sheet.spreadsheet_link = Some(link);
        }
        if let Some(worksheet) = non_empty(ENV_WORKSHEET) {
            self.sheet.worksheet = worksheet;
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Check that every setting the selected backend needs is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.trim().is_empty() {
            return Err(ConfigError::Missing {
                setting: "source",
                hint: "set `source` in config.yaml or INTERNSYNC_SOURCE",
            });
        }
        if self.batch_rows == 0 {
            return Err(ConfigError::Invalid {
                setting: "batch_rows",
                message: "must be at least 1".to_string(),
            });
        }
        match self.sheet.backend {
            SheetBackendKind::Google => {
                if self.sheet.spreadsheet_link.is_none() {
                    return Err(ConfigError::Missing {
                        setting: "sheet.spreadsheet_link",
                        hint: "set it in config.yaml or GOOGLE_SPREADSHEET_LINK",
                    });
                }
                if self.sheet.worksheet.trim().is_empty() {
                    return Err(ConfigError::Invalid {
                        setting: "sheet.worksheet",
                        message: "worksheet title is empty".to_string(),
                    });
                }
            }
            SheetBackendKind::File => {
                if self.sheet.path.is_none() {
                    return Err(ConfigError::Missing {
                        setting: "sheet.path",
                        hint: "the file backend needs a JSON document path",
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.internsync/`. Pure, no I/O.
pub fn state_dir_at(home: &Path) -> PathBuf {
    home.join(STATE_DIR)
}

/// `<home>/.internsync/config.yaml`. Pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    state_dir_at(home).join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load `config.yaml` under `home`. A missing file yields [`Config::default`].
///
/// Environment overrides are not applied here.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(Config::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

/// Save `config` under `home` atomically (`.tmp` + rename).
pub fn save_at(home: &Path, config: &Config) -> Result<PathBuf, ConfigError> {
    let dir = state_dir_at(home);
    std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;

    let path = config_path_at(home);
    let yaml = serde_yaml::to_string(config)?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    Ok(path)
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    save_at(&home()?, config)
}

pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn google_config() -> Config {
        let mut config = Config::default();
        config.sheet.spreadsheet_link =
            Some("https://docs.google.com/spreadsheets/d/abc/edit".to_string());
        config
    }

    #[test]
    fn defaults_follow_upstream_readme() {
        let config = Config::default();
        assert_eq!(config.source, DEFAULT_SOURCE);
        assert_eq!(config.insert_policy, InsertPolicy::Top);
        assert_eq!(config.sheet.worksheet, "Sheet1");
        assert_eq!(config.write_delay(), Duration::from_secs(1));
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = [
            (ENV_SOURCE, "/tmp/README.md"),
            (ENV_SPREADSHEET_LINK, "https://docs.google.com/spreadsheets/d/xyz/edit"),
            (ENV_WORKSHEET, "   "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_with(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.source, "/tmp/README.md");
        assert_eq!(
            config.sheet.spreadsheet_link.as_deref(),
            Some("https://docs.google.com/spreadsheets/d/xyz/edit")
        );
        assert_eq!(config.sheet.worksheet, "Sheet1", "blank env values are ignored");
    }

    #[test]
    fn google_backend_requires_link() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Missing {
                setting: "sheet.spreadsheet_link",
                ..
            }
        ));
        google_config().validate().expect("valid");
    }

    #[test]
    fn file_backend_requires_path() {
        let mut config = Config::default();
        config.sheet.backend = SheetBackendKind::File;
        assert!(config.validate().is_err());
        config.sheet.path = Some(PathBuf::from("sheet.json"));
        config.validate().expect("valid");
    }

    #[test]
    fn zero_batch_rows_is_invalid() {
        let mut config = google_config();
        config.batch_rows = 0;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::Invalid { setting: "batch_rows", .. }
        ));
    }
}
