use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum YfError {
    /// A transport-level failure that was not classified as retryable.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned a non-success status that is not worth retrying.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The requested URL, with the crumb redacted.
        url: String,
    },

    /// Every attempt allowed by the retry budget failed with a retryable error.
    #[error("All {attempts} requests failed.")]
    RetriesExhausted {
        /// Total number of attempts that were made.
        attempts: u32,
        /// Status of the last attempt, or `None` if it timed out.
        last_status: Option<u16>,
    },

    /// The crumb endpoint answered with something that is not a crumb.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A parameter was rejected before any request was sent.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// The response did not contain the expected envelope.
    #[error("Missing data in response: {0}")]
    MissingData(String),

    /// A response body could not be decoded as JSON.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl YfError {
    /// Returns `true` for the HTTP error kind: transport failures, permanent
    /// status errors and exhausted retries.
    #[must_use]
    pub const fn is_http(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Status { .. } | Self::RetriesExhausted { .. }
        )
    }

    /// The HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::RetriesExhausted { last_status, .. } => *last_status,
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
