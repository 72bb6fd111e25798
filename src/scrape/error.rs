use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },
}

impl FetchError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::UnexpectedStatus { status, .. } => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("field version not found for server {host}")]
    VersionFieldNotFound { host: String },

    #[error("invalid semver format got version {version}")]
    InvalidSemver { version: String },

    #[error("invalid semver format {source} got version {version}")]
    InvalidVersion {
        version: String,
        source: semver::Error,
    },
}

/// Failure to fetch or parse a single listing page
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
