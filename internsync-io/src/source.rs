//! README fetchers: HTTP(S) via `ureq` and local files.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use internsync_sync::{FetchError, SourceFetcher};

/// Default per-request timeout for source fetches.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(timeout)
        .user_agent(concat!("internsync/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Fetches the README over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSource {
    agent: ureq::Agent,
}

impl HttpSource {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            agent: agent(timeout),
        }
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceFetcher for HttpSource {
    fn fetch(&self, location: &str) -> Result<String, FetchError> {
        let unreachable = |message: String| FetchError::Unreachable {
            location: location.to_string(),
            message,
        };
        match self.agent.get(location).call() {
            Ok(response) => response.into_string().map_err(|e| unreachable(e.to_string())),
            Err(ureq::Error::Status(status, _)) => Err(FetchError::Status {
                location: location.to_string(),
                status,
            }),
            Err(ureq::Error::Transport(transport)) => Err(unreachable(transport.to_string())),
        }
    }
}

/// Reads the README from a local path or `file://` URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl FileSource {
    fn path_of(location: &str) -> PathBuf {
        Url::parse(location)
            .ok()
            .filter(|url| url.scheme() == "file")
            .and_then(|url| url.to_file_path().ok())
            .unwrap_or_else(|| PathBuf::from(location))
    }
}

impl SourceFetcher for FileSource {
    fn fetch(&self, location: &str) -> Result<String, FetchError> {
        let path = Self::path_of(location);
        std::fs::read_to_string(&path).map_err(|source| FetchError::Io { path, source })
    }
}

/// Pick a fetcher for `location`: HTTP(S) URLs go over the network, anything
/// else is read from disk.
pub fn source_for(location: &str) -> Box<dyn SourceFetcher> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new())
    } else {
        Box::new(FileSource)
    }
}
