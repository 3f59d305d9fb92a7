//! Local JSON document standing in for a hosted spreadsheet.
//!
//! ```json
//! { "worksheet": "Sheet1", "rows": [["Company", "Role", ...], ...] }
//! ```
//!
//! Every mutation is persisted immediately with an atomic `.tmp` + rename,
//! so a failed run leaves the file exactly as far along as the writer got.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use internsync_core::RowIndex;
use internsync_sync::{MemorySheet, SheetBackend, SheetError};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SheetDocument {
    #[serde(default)]
    worksheet: String,
    #[serde(default)]
    rows: Vec<Vec<String>>,
}

/// A worksheet stored as a JSON file.
#[derive(Debug)]
pub struct JsonFileSheet {
    path: PathBuf,
    worksheet: String,
    sheet: MemorySheet,
}

fn io_err(path: &Path, source: std::io::Error) -> SheetError {
    SheetError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl JsonFileSheet {
    /// Open `path`, starting from an empty sheet if it does not exist yet.
    pub fn open(
        path: impl Into<PathBuf>,
        worksheet: impl Into<String>,
    ) -> Result<Self, SheetError> {
        let path = path.into();
        let worksheet = worksheet.into();
        let document = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            serde_json::from_str::<SheetDocument>(&contents)
                .map_err(|e| SheetError::Malformed(format!("{}: {e}", path.display())))?
        } else {
            SheetDocument::default()
        };
        Ok(Self {
            path,
            worksheet,
            sheet: MemorySheet::with_rows(&document.rows),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), SheetError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }
        let document = SheetDocument {
            worksheet: self.worksheet.clone(),
            rows: self.sheet.rows().to_vec(),
        };
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| SheetError::Malformed(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| io_err(&self.path, e))?;
        Ok(())
    }
}

impl SheetBackend for JsonFileSheet {
    fn read_all(&mut self) -> Result<Vec<Vec<String>>, SheetError> {
        self.sheet.read_all()
    }

    fn write_range(&mut self, start: RowIndex, rows: &[Vec<String>]) -> Result<(), SheetError> {
        self.sheet.write_range(start, rows)?;
        self.persist()
    }

    fn insert_rows(&mut self, at: RowIndex, count: usize) -> Result<(), SheetError> {
        self.sheet.insert_rows(at, count)?;
        self.persist()
    }

    fn clear(&mut self) -> Result<(), SheetError> {
        self.sheet.clear()?;
        self.persist()
    }
}
