use thiserror::Error;

use crate::scrape::error::{FetchError, PageError, ParseError};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The host-scoped search listed no servers at all
    #[error("version not found for host {0}")]
    HostNotFound(String),

    /// No cached host contains the requested label
    #[error("version not found for server {0}")]
    ServerNotFound(String),
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LookupError::HostNotFound(_) | LookupError::ServerNotFound(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("Watcher has already been started")]
    AlreadyStarted,

    #[error("Refresh interval must be greater than zero")]
    ZeroInterval,
}

impl From<PageError> for LookupError {
    fn from(error: PageError) -> Self {
        match error {
            PageError::Fetch(e) => LookupError::Network(e),
            PageError::Parse(e) => LookupError::Parse(e),
        }
    }
}
