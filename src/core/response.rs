use serde::de::DeserializeOwned;

use crate::core::YfError;

/// A fully read HTTP response.
///
/// The body is buffered so the response can be cached, inspected and decoded
/// more than once. The URL is stored with the crumb redacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    url: String,
    body: String,
}

impl Response {
    pub(crate) const fn new(status: u16, url: String, body: String) -> Self {
        Self { status, url, body }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status
    }

    /// Requested URL, crumb redacted.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw body text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Consume the response, returning the body.
    #[must_use]
    pub fn into_text(self) -> String {
        self.body
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`YfError::Json`] if the body does not decode into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, YfError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Fail with [`YfError::Status`] unless the status is 2xx.
    ///
    /// # Errors
    ///
    /// Returns [`YfError::Status`] for any non-2xx status.
    pub fn error_for_status(&self) -> Result<&Self, YfError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(YfError::Status {
                status: self.status,
                url: self.url.clone(),
            })
        }
    }
}
