//! Source document contract.

use crate::error::FetchError;

/// Fetches the raw README text from a location (URL or path).
///
/// Non-2xx answers must be reported as [`FetchError::Status`], never as a
/// body.
pub trait SourceFetcher {
    fn fetch(&self, location: &str) -> Result<String, FetchError>;
}

/// Serves a fixed document regardless of location.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub body: String,
}

impl StaticSource {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl SourceFetcher for StaticSource {
    fn fetch(&self, _location: &str) -> Result<String, FetchError> {
        Ok(self.body.clone())
    }
}
