//! The retrying GET every endpoint goes through.

use reqwest::header::HeaderMap;
use url::Url;

use super::retry::StatusClass;
use crate::core::YfError;
use crate::core::params::QueryParams;
use crate::core::response::Response;

/// What one attempt produced, before the retry policy looks at it.
enum Attempt {
    Success(Response),
    Retry(Option<u16>),
}

impl super::YfClient {
    /// Send a GET with retries on timeouts, 429 and 5xx.
    ///
    /// Every attempt runs on a live session, reopening one if the client was
    /// closed in the meantime. Between attempts the configured backoff is
    /// awaited; there is no wait after the last attempt.
    ///
    /// # Errors
    ///
    /// - [`YfError::Status`] for a non-retryable status, at once.
    /// - [`YfError::Http`] for a non-retryable transport failure, at once.
    /// - [`YfError::RetriesExhausted`] once the attempt budget is spent.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(url = %params.redacted_url(url))
    )]
    pub async fn request(
        &self,
        url: &Url,
        params: &QueryParams,
        headers: Option<&HeaderMap>,
    ) -> Result<Response, YfError> {
        let retry = &self.inner.config.retry;
        let max = retry.max_retries;
        let target = params.apply_to(url);
        let shown = params.redacted_url(url);
        let mut last_status = None;

        for attempt in 1..=max {
            tracing::debug!("Request no. {attempt}/{max} - started.");
            let (http, _) = self.session().await?;
            let mut req = http.get(target.clone());
            if let Some(h) = headers {
                req = req.headers(h.clone());
            }

            match send_once(req, &shown).await {
                Ok(Attempt::Success(resp)) => {
                    tracing::debug!(
                        status = resp.status_code(),
                        "Request no. {attempt}/{max} - succeeded."
                    );
                    return Ok(resp);
                }
                Ok(Attempt::Retry(status)) => {
                    tracing::warn!(?status, "Request no. {attempt}/{max} - failed.");
                    last_status = status;
                }
                Err(YfError::Http(e)) if retry.retries_transport(&e) => {
                    tracing::warn!(error = %e, "Request no. {attempt}/{max} - failed.");
                    last_status = None;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Request no. {attempt}/{max} - failed permanently.");
                    return Err(e);
                }
            }

            if attempt < max {
                let delay = retry.backoff.delay(attempt);
                tracing::debug!(?delay, "backing off");
                self.inner.config.sleeper.sleep(delay).await;
            }
        }

        tracing::error!("All {max} requests failed.");
        Err(YfError::RetriesExhausted {
            attempts: max,
            last_status,
        })
    }
}

async fn send_once(req: reqwest::RequestBuilder, shown: &str) -> Result<Attempt, YfError> {
    // `without_url` keeps the crumb out of error messages.
    let resp = req.send().await.map_err(reqwest::Error::without_url)?;
    let status = resp.status().as_u16();
    match StatusClass::of(status) {
        StatusClass::Success => {
            let body = resp.text().await.map_err(reqwest::Error::without_url)?;
            Ok(Attempt::Success(Response::new(status, shown.to_string(), body)))
        }
        StatusClass::Retryable => Ok(Attempt::Retry(Some(status))),
        StatusClass::Permanent => Err(YfError::Status {
            status,
            url: shown.to_string(),
        }),
    }
}
