//! # internsync-io
//!
//! Real collaborators for the sync pipeline: README fetchers and spreadsheet
//! backends, plus factories that pick them from a [`Config`].

pub mod file_sheet;
pub mod google;
pub mod source;

use internsync_core::{Config, ConfigError, SheetBackendKind};
use internsync_sync::SheetBackend;

pub use file_sheet::JsonFileSheet;
pub use google::{parse_spreadsheet_link, GoogleSheets, SpreadsheetRef};
pub use source::{source_for, FileSource, HttpSource};

/// Open the spreadsheet backend described by `config.sheet`.
pub fn sheet_backend(config: &Config) -> Result<Box<dyn SheetBackend>, ConfigError> {
    match config.sheet.backend {
        SheetBackendKind::Google => {
            tracing::debug!("using Google Sheets worksheet '{}'", config.sheet.worksheet);
            Ok(Box::new(GoogleSheets::from_config(config)?))
        }
        SheetBackendKind::File => {
            let path = config.sheet.path.clone().ok_or(ConfigError::Missing {
                setting: "sheet.path",
                hint: "the file backend needs a JSON document path",
            })?;
            tracing::debug!("using sheet file {}", path.display());
            let sheet = JsonFileSheet::open(&path, config.sheet.worksheet.clone()).map_err(
                |e| ConfigError::Invalid {
                    setting: "sheet.path",
                    message: e.to_string(),
                },
            )?;
            Ok(Box::new(sheet))
        }
    }
}
