//! Google Sheets (API v4) backend over `ureq`.
//!
//! Only the calls the engine needs are used:
//!
//! | operation     | request                                               |
//! |---------------|-------------------------------------------------------|
//! | `read_all`    | `GET  values/{'ws'!A:G}?majorDimension=ROWS`          |
//! | `write_range` | `PUT  values/{'ws'!A2:G9}?valueInputOption=RAW`       |
//! | `insert_rows` | `POST {id}:batchUpdate` with `insertDimension`        |
//! | `clear`       | `POST values/{'ws'}:clear`                            |
//!
//! Authentication is a pre-issued OAuth bearer token taken from
//! `GOOGLE_ACCESS_TOKEN`; obtaining one is out of scope.

use std::sync::LazyLock;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use internsync_core::config::{ENV_ACCESS_TOKEN, ENV_SPREADSHEET_LINK};
use internsync_core::{Config, ConfigError, RowIndex, COLUMN_COUNT};
use internsync_sync::{SheetBackend, SheetError};

pub const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

static API_BASE_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse(API_BASE).expect("valid API base"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Spreadsheet links and A1 ranges
// ---------------------------------------------------------------------------

/// A spreadsheet as identified by its browser URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetRef {
    pub id: String,
    /// Numeric worksheet id from `#gid=N`, if the link carried one.
    pub gid: Option<u64>,
}

/// Parse `https://docs.google.com/spreadsheets/d/<ID>/edit#gid=<N>`.
pub fn parse_spreadsheet_link(link: &str) -> Result<SpreadsheetRef, ConfigError> {
    let invalid = |message: &str| ConfigError::Invalid {
        setting: ENV_SPREADSHEET_LINK,
        message: format!("{message}: {link}"),
    };
    let url = Url::parse(link.trim()).map_err(|_| invalid("not a URL"))?;

    let segments = url
        .path_segments()
        .ok_or_else(|| invalid("not a spreadsheet URL"))?;
    let id = segments
        .skip_while(|segment| *segment != "d")
        .nth(1)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| invalid("no /d/<id> segment"))?
        .to_string();

    let gid = url
        .fragment()
        .into_iter()
        .flat_map(|fragment| fragment.split('&'))
        .chain(url.query().into_iter().flat_map(|query| query.split('&')))
        .find_map(|pair| pair.strip_prefix("gid="))
        .and_then(|gid| gid.parse().ok());

    Ok(SpreadsheetRef { id, gid })
}

/// Letter of the last managed column (`G`).
fn last_column() -> char {
    (b'A' + (COLUMN_COUNT - 1) as u8) as char
}

/// Worksheet title as used in A1 notation, quoted when needed.
pub fn quote_sheet_name(worksheet: &str) -> String {
    let plain = !worksheet.is_empty()
        && worksheet
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        worksheet.to_string()
    } else {
        format!("'{}'", worksheet.replace('\'', "''"))
    }
}

/// `'ws'!A{start}:G{end}` covering `rows` rows from `start`.
pub fn row_range(worksheet: &str, start: RowIndex, rows: usize) -> String {
    let end = start.shifted(rows.max(1) - 1);
    format!(
        "{}!A{start}:{}{end}",
        quote_sheet_name(worksheet),
        last_column()
    )
}

/// `'ws'!A:G`
pub fn columns_range(worksheet: &str) -> String {
    format!("{}!A:{}", quote_sheet_name(worksheet), last_column())
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: u64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// One worksheet of a Google spreadsheet.
#[derive(Debug, Clone)]
pub struct GoogleSheets {
    agent: ureq::Agent,
    base: Url,
    spreadsheet: SpreadsheetRef,
    worksheet: String,
    token: String,
    sheet_id: Option<u64>,
}

impl GoogleSheets {
    pub fn new(
        spreadsheet: SpreadsheetRef,
        worksheet: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            agent: crate::source::agent(REQUEST_TIMEOUT),
            base: API_BASE_URL.clone(),
            spreadsheet,
            worksheet: worksheet.into(),
            token: token.into(),
            sheet_id: None,
        }
    }

    /// Build from the `sheet:` config section and `GOOGLE_ACCESS_TOKEN`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let link = config
            .sheet
            .spreadsheet_link
            .as_deref()
            .ok_or(ConfigError::Missing {
                setting: ENV_SPREADSHEET_LINK,
                hint: "set sheet.spreadsheet_link in config.yaml or the environment",
            })?;
        let token = std::env::var(ENV_ACCESS_TOKEN)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing {
                setting: ENV_ACCESS_TOKEN,
                hint: "export an OAuth access token with the spreadsheets scope",
            })?;
        Ok(Self::new(
            parse_spreadsheet_link(link)?,
            config.sheet.worksheet.clone(),
            token,
        ))
    }

    /// Point at a different API root (tests).
    pub fn with_base(mut self, base: Url) -> Self {
        self.base = base;
        self
    }

    fn endpoint(&self, tail: &[&str]) -> Result<Url, SheetError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SheetError::Malformed(format!("bad API base {}", self.base)))?
            .pop_if_empty()
            .extend(tail);
        Ok(url)
    }

    fn values_endpoint(&self, range: &str) -> Result<Url, SheetError> {
        self.endpoint(&[self.spreadsheet.id.as_str(), "values", range])
    }

    fn send(
        &self,
        request: ureq::Request,
        body: Option<Value>,
    ) -> Result<ureq::Response, SheetError> {
        let request = request.set("Authorization", &format!("Bearer {}", self.token));
        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };
        result.map_err(map_error)
    }

    /// The numeric id of the worksheet titled `self.worksheet`.
    ///
    /// Looked up once from the spreadsheet metadata. A `#gid=N` in the link
    /// must name the same worksheet, otherwise this is a layout error.
    fn sheet_id(&mut self) -> Result<u64, SheetError> {
        if let Some(id) = self.sheet_id {
            return Ok(id);
        }
        let mut url = self.endpoint(&[self.spreadsheet.id.as_str()])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(sheetId,title)");
        let meta: SpreadsheetMeta = self
            .send(self.agent.get(url.as_str()), None)?
            .into_json()
            .map_err(|e| SheetError::Malformed(e.to_string()))?;
        let id = meta
            .sheets
            .iter()
            .find(|sheet| sheet.properties.title == self.worksheet)
            .map(|sheet| sheet.properties.sheet_id)
            .ok_or_else(|| {
                SheetError::Layout(format!("no worksheet titled '{}'", self.worksheet))
            })?;
        if let Some(gid) = self.spreadsheet.gid.filter(|gid| *gid != id) {
            let linked = meta
                .sheets
                .iter()
                .find(|sheet| sheet.properties.sheet_id == gid)
                .map(|sheet| format!("'{}'", sheet.properties.title))
                .unwrap_or_else(|| "an unknown worksheet".to_string());
            return Err(SheetError::Layout(format!(
                "spreadsheet link points at gid={gid} ({linked}) but the configured \
                 worksheet is '{}' (sheetId {id}); fix sheet.worksheet or the link",
                self.worksheet
            )));
        }
        tracing::debug!("worksheet '{}' has sheetId {id}", self.worksheet);
        self.sheet_id = Some(id);
        Ok(id)
    }
}

fn map_error(err: ureq::Error) -> SheetError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            SheetError::Rejected { status, message }
        }
        ureq::Error::Transport(transport) => SheetError::Unreachable(transport.to_string()),
    }
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl SheetBackend for GoogleSheets {
    fn read_all(&mut self) -> Result<Vec<Vec<String>>, SheetError> {
        let mut url = self.values_endpoint(&columns_range(&self.worksheet))?;
        url.query_pairs_mut().append_pair("majorDimension", "ROWS");
        let range: ValueRange = self
            .send(self.agent.get(url.as_str()), None)?
            .into_json()
            .map_err(|e| SheetError::Malformed(e.to_string()))?;
        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    fn write_range(&mut self, start: RowIndex, rows: &[Vec<String>]) -> Result<(), SheetError> {
        if rows.is_empty() {
            return Ok(());
        }
        let range = row_range(&self.worksheet, start, rows.len());
        let mut url = self.values_endpoint(&range)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let body = json!({ "range": range, "majorDimension": "ROWS", "values": rows });
        self.send(self.agent.put(url.as_str()), Some(body))?;
        Ok(())
    }

    fn insert_rows(&mut self, at: RowIndex, count: usize) -> Result<(), SheetError> {
        if count == 0 {
            return Ok(());
        }
        let sheet_id = self.sheet_id()?;
        let start = at.0.saturating_sub(1);
        let target = format!("{}:batchUpdate", self.spreadsheet.id);
        let url = self.endpoint(&[target.as_str()])?;
        let body = json!({
            "requests": [{
                "insertDimension": {
                    "range": {
                        "sheetId": sheet_id,
                        "dimension": "ROWS",
                        "startIndex": start,
                        "endIndex": start + count,
                    },
                    "inheritFromBefore": false,
                }
            }]
        });
        self.send(self.agent.post(url.as_str()), Some(body))?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SheetError> {
        let range = format!("{}:clear", quote_sheet_name(&self.worksheet));
        let url = self.values_endpoint(&range)?;
        self.send(self.agent.post(url.as_str()), Some(json!({})))?;
        Ok(())
    }
}
