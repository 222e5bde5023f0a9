//! Cookie & crumb acquisition for Yahoo endpoints.

use url::Url;

use crate::core::YfError;
use crate::core::params::QueryParams;

impl super::YfClient {
    /// The session's crumb, fetching it on first use.
    ///
    /// Concurrent callers share a single fetch. A crumb is only kept if the
    /// session that fetched it is still the open one.
    ///
    /// # Errors
    ///
    /// Propagates request errors from the crumb endpoint, and returns
    /// [`YfError::Auth`] if its body is not a usable crumb.
    pub async fn crumb(&self) -> Result<String, YfError> {
        // Fast path: check if the crumb exists with a read lock.
        if let Some(c) = self.inner.state.read().await.crumb.clone() {
            return Ok(c);
        }

        // Slow path: acquire the dedicated fetch lock to ensure only one task proceeds.
        let _guard = self.inner.crumb_fetch_lock.lock().await;

        // Double-check: another task might have fetched it while this one was waiting.
        if let Some(c) = self.inner.state.read().await.crumb.clone() {
            return Ok(c);
        }

        let (http, generation) = self.session().await?;
        if let Some(cookie_url) = &self.inner.config.cookie_url {
            bootstrap_cookie(&http, cookie_url).await;
        }

        let resp = self
            .request(&self.inner.config.crumb_url, &QueryParams::new(), None)
            .await?;
        let crumb = validate_crumb(resp.text())?;

        let mut state = self.inner.state.write().await;
        if state.http.is_some() && state.generation == generation {
            state.crumb = Some(crumb.clone());
        } else {
            tracing::debug!("session changed during crumb fetch; not caching crumb");
        }
        Ok(crumb)
    }

    /// Whether a crumb is currently cached.
    pub async fn has_crumb(&self) -> bool {
        self.inner.state.read().await.crumb.is_some()
    }
}

/// Best effort: populates the cookie jar, never fails the caller.
async fn bootstrap_cookie(http: &reqwest::Client, url: &Url) {
    match http.get(url.clone()).send().await {
        Ok(resp) => tracing::debug!(status = resp.status().as_u16(), "cookie bootstrap done"),
        Err(e) => tracing::debug!(error = %e.without_url(), "cookie bootstrap failed"),
    }
}

/// Trim a crumb body and reject ones that are obviously an error page.
pub(crate) fn validate_crumb(body: &str) -> Result<String, YfError> {
    let crumb = body.trim();
    if crumb.is_empty() || crumb.contains('{') || crumb.contains('<') {
        return Err(YfError::Auth(format!(
            "received invalid crumb ({} bytes)",
            crumb.len()
        )));
    }
    Ok(crumb.to_string())
}
