use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use reqwest::header::HeaderMap;
use serde_json::Value;
use url::Url;

use crate::core::cache::{CacheMode, ResultCache};
use crate::core::client::{StatusClass, validate_crumb};
use crate::core::endpoints::{self, ApiRequest, ChartQuery};
use crate::core::params::{CRUMB_PARAM, QueryParams};
use crate::core::response::Response;
use crate::core::{CalendarModule, ClientConfig, QuoteSummaryModule, YfClientBuilder, YfError};

#[derive(Default)]
struct SessionState {
    http: Option<reqwest::blocking::Client>,
    crumb: Option<String>,
    generation: u64,
}

struct Inner {
    config: ClientConfig,
    state: RwLock<SessionState>,
    crumb_fetch_lock: Mutex<()>,
    cache: ResultCache,
}

/// Blocking counterpart of [`crate::YfClient`].
///
/// Same configuration, endpoints, retry policy and cache; requests block the
/// calling thread and backoff uses [`Sleeper::sleep_blocking`](crate::Sleeper::sleep_blocking).
/// Safe to share between threads. Do not use it from inside an async runtime.
#[derive(Clone)]
pub struct YfClient {
    inner: Arc<Inner>,
}

impl Default for YfClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl fmt::Debug for YfClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("YfClient");
        d.field("base_url", &self.inner.config.base_url.as_str());
        if let Ok(state) = self.inner.state.try_read() {
            d.field("open", &state.http.is_some())
                .field("crumb", &state.crumb.as_ref().map(|_| "REDACTED"));
        }
        d.field("cached_results", &self.inner.cache.len())
            .finish_non_exhaustive()
    }
}

impl YfClient {
    /// Create a new builder; finish it with [`YfClientBuilder::build_blocking`].
    #[must_use]
    pub fn builder() -> YfClientBuilder {
        YfClientBuilder::default()
    }

    /// Client over an already validated configuration. No I/O happens here.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let cache = ResultCache::new(config.cache_capacity);
        Self {
            inner: Arc::new(Inner {
                config,
                state: RwLock::new(SessionState::default()),
                crumb_fetch_lock: Mutex::new(()),
                cache,
            }),
        }
    }

    /// The configuration this client was built from.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Whether `self` and `other` are handles to the same client.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of memoized endpoint results.
    #[must_use]
    pub fn cached_results(&self) -> usize {
        self.inner.cache.len()
    }

    /// Drop every memoized endpoint result.
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /* ---------------- Session ---------------- */

    /// Open the HTTP session if it is not open yet.
    ///
    /// # Errors
    ///
    /// Returns [`YfError::Http`] if the HTTP client cannot be constructed.
    pub fn ensure_open(&self) -> Result<(), YfError> {
        self.live_session().map(|_| ())
    }

    fn live_session(&self) -> Result<(reqwest::blocking::Client, u64), YfError> {
        {
            let state = self.read_state();
            if let Some(http) = &state.http {
                return Ok((http.clone(), state.generation));
            }
        }

        let mut state = self.write_state();
        if let Some(http) = &state.http {
            return Ok((http.clone(), state.generation));
        }
        let http = blocking_http_client(&self.inner.config)?;
        state.generation += 1;
        state.http = Some(http.clone());
        state.crumb = None;
        tracing::debug!(generation = state.generation, "session opened");
        Ok((http, state.generation))
    }

    /// Drop the HTTP session and the crumb. Safe to call any number of times;
    /// the next request opens a fresh session.
    pub fn close(&self) {
        let mut state = self.write_state();
        state.crumb = None;
        if state.http.take().is_some() {
            tracing::debug!(generation = state.generation, "session closed");
        }
    }

    /// Whether an HTTP session is currently open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.read_state().http.is_some()
    }

    /// Open the session and return a guard that closes it when dropped,
    /// including during unwinding.
    ///
    /// # Errors
    ///
    /// Returns [`YfError::Http`] if the HTTP client cannot be constructed.
    pub fn session(&self) -> Result<SessionGuard, YfError> {
        self.ensure_open()?;
        Ok(SessionGuard {
            client: self.clone(),
        })
    }

    /* ---------------- Crumb ---------------- */

    /// The session's crumb, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Propagates request errors from the crumb endpoint, and returns
    /// [`YfError::Auth`] if its body is not a usable crumb.
    pub fn crumb(&self) -> Result<String, YfError> {
        if let Some(c) = self.read_state().crumb.clone() {
            return Ok(c);
        }

        let _guard = self
            .inner
            .crumb_fetch_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(c) = self.read_state().crumb.clone() {
            return Ok(c);
        }

        let (http, generation) = self.live_session()?;
        if let Some(cookie_url) = &self.inner.config.cookie_url {
            match http.get(cookie_url.clone()).send() {
                Ok(resp) => {
                    tracing::debug!(status = resp.status().as_u16(), "cookie bootstrap done");
                }
                Err(e) => tracing::debug!(error = %e.without_url(), "cookie bootstrap failed"),
            }
        }

        let resp = self.request(&self.inner.config.crumb_url, &QueryParams::new(), None)?;
        let crumb = validate_crumb(resp.text())?;

        let mut state = self.write_state();
        if state.http.is_some() && state.generation == generation {
            state.crumb = Some(crumb.clone());
        } else {
            tracing::debug!("session changed during crumb fetch; not caching crumb");
        }
        Ok(crumb)
    }

    /// Whether a crumb is currently cached.
    #[must_use]
    pub fn has_crumb(&self) -> bool {
        self.read_state().crumb.is_some()
    }

    /* ---------------- Executor ---------------- */

    /// Send a GET with retries on timeouts, 429 and 5xx, sleeping the
    /// configured backoff between attempts.
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
    pub fn request(
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
            let (http, _) = self.live_session()?;
            let mut req = http.get(target.clone());
            if let Some(h) = headers {
                req = req.headers(h.clone());
            }

            match self.send_once(req, &shown) {
                Ok(resp) => {
                    tracing::debug!(
                        status = resp.status_code(),
                        "Request no. {attempt}/{max} - succeeded."
                    );
                    return Ok(resp);
                }
                Err(Failure::Retryable(status)) => {
                    tracing::warn!(?status, "Request no. {attempt}/{max} - failed.");
                    last_status = status;
                }
                Err(Failure::Fatal(e)) => {
                    tracing::warn!(error = %e, "Request no. {attempt}/{max} - failed permanently.");
                    return Err(e);
                }
            }

            if attempt < max {
                let delay = retry.backoff.delay(attempt);
                tracing::debug!(?delay, "backing off");
                self.inner.config.sleeper.sleep_blocking(delay);
            }
        }

        tracing::error!("All {max} requests failed.");
        Err(YfError::RetriesExhausted {
            attempts: max,
            last_status,
        })
    }

    fn call(&self, req: ApiRequest, mode: CacheMode) -> Result<Value, YfError> {
        let key = req.cache_key();
        if mode.reads()
            && let Some(hit) = self.inner.cache.get(&key)
        {
            tracing::debug!(op = req.op, "cache hit");
            return Ok(hit);
        }

        let mut params = req.params;
        if req.needs_crumb {
            params.set(CRUMB_PARAM, self.crumb()?);
        }
        let value: Value = self.request(&req.url, &params, None)?.json()?;

        if mode.writes() {
            self.inner.cache.put(key, value.clone());
        }
        Ok(value)
    }

    fn send_once(
        &self,
        req: reqwest::blocking::RequestBuilder,
        shown: &str,
    ) -> Result<Response, Failure> {
        let transport = |e: reqwest::Error| {
            if self.inner.config.retry.retries_transport(&e) {
                tracing::debug!(error = %e.without_url(), "retryable transport error");
                Failure::Retryable(None)
            } else {
                // `without_url` keeps the crumb out of error messages.
                Failure::Fatal(YfError::Http(e.without_url()))
            }
        };

        let resp = req.send().map_err(transport)?;
        let status = resp.status().as_u16();
        match StatusClass::of(status) {
            StatusClass::Success => {
                let body = resp.text().map_err(transport)?;
                Ok(Response::new(status, shown.to_string(), body))
            }
            StatusClass::Retryable => Err(Failure::Retryable(Some(status))),
            StatusClass::Permanent => Err(Failure::Fatal(YfError::Status {
                status,
                url: shown.to_string(),
            })),
        }
    }

    /* ---------------- Endpoints ---------------- */

    /// See [`crate::YfClient::get_chart`].
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for a bad symbol or window, otherwise any
    /// request error.
    pub fn get_chart(
        &self,
        ticker: &str,
        query: &ChartQuery,
        mode: CacheMode,
    ) -> Result<Value, YfError> {
        self.call(endpoints::chart(&self.inner.config.base_url, ticker, query)?, mode)
    }

    /// See [`crate::YfClient::get_quote`].
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for an empty list, otherwise any request or
    /// crumb error.
    pub fn get_quote(
        &self,
        tickers: &str,
        include_pre_post: Option<bool>,
        mode: CacheMode,
    ) -> Result<Value, YfError> {
        let req = endpoints::quote(&self.inner.config.base_url, tickers, include_pre_post)?;
        self.call(req, mode)
    }

    /// See [`crate::YfClient::get_quote_type`].
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for an empty list, otherwise any request error.
    pub fn get_quote_type(&self, tickers: &str, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::quote_type(&self.inner.config.base_url, tickers)?, mode)
    }

    /// See [`crate::YfClient::get_quote_summary`].
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] when `modules` is empty, otherwise any
    /// request or crumb error.
    pub fn get_quote_summary(
        &self,
        ticker: &str,
        modules: &[QuoteSummaryModule],
        mode: CacheMode,
    ) -> Result<Value, YfError> {
        let req = endpoints::quote_summary(&self.inner.config.base_url, ticker, modules)?;
        self.call(req, mode)
    }

    /// See [`crate::YfClient::get_timeseries`].
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for unknown types or an inverted window,
    /// otherwise any request error.
    pub fn get_timeseries(
        &self,
        ticker: &str,
        types: &str,
        period1: Option<i64>,
        period2: Option<i64>,
        mode: CacheMode,
    ) -> Result<Value, YfError> {
        let req = endpoints::timeseries(
            &self.inner.config.base_url,
            ticker,
            types,
            period1,
            period2,
            Utc::now(),
        )?;
        self.call(req, mode)
    }

    /// See [`crate::YfClient::get_options`].
    ///
    /// # Errors
    ///
    /// Any request or crumb error.
    pub fn get_options(&self, ticker: &str, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::options(&self.inner.config.base_url, ticker)?, mode)
    }

    /// See [`crate::YfClient::get_search`].
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for a blank query, otherwise any request error.
    pub fn get_search(&self, query: &str, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::search(&self.inner.config.base_url, query)?, mode)
    }

    /// See [`crate::YfClient::get_recommendations`].
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for an empty list, otherwise any request error.
    pub fn get_recommendations(&self, tickers: &str, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::recommendations(&self.inner.config.base_url, tickers)?, mode)
    }

    /// See [`crate::YfClient::get_insights`].
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for an empty list, otherwise any request error.
    pub fn get_insights(&self, tickers: &str, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::insights(&self.inner.config.base_url, tickers)?, mode)
    }

    /// See [`crate::YfClient::get_ratings`].
    ///
    /// # Errors
    ///
    /// Any request error.
    pub fn get_ratings(&self, ticker: &str, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::ratings(&self.inner.config.base_url, ticker)?, mode)
    }

    /// See [`crate::YfClient::get_market_summaries`].
    ///
    /// # Errors
    ///
    /// Any request error.
    pub fn get_market_summaries(&self, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::market_summaries(&self.inner.config.base_url)?, mode)
    }

    /// See [`crate::YfClient::get_trending`].
    ///
    /// # Errors
    ///
    /// Any request error.
    pub fn get_trending(&self, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::trending(&self.inner.config.base_url)?, mode)
    }

    /// See [`crate::YfClient::get_currencies`].
    ///
    /// # Errors
    ///
    /// Any request error.
    pub fn get_currencies(&self, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::currencies(&self.inner.config.base_url)?, mode)
    }

    /// See [`crate::YfClient::get_calendar_events`].
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for an inverted or too long window,
    /// otherwise any request error.
    pub fn get_calendar_events(
        &self,
        modules: &[CalendarModule],
        start_ms: Option<i64>,
        end_ms: Option<i64>,
        mode: CacheMode,
    ) -> Result<Value, YfError> {
        let req = endpoints::calendar_events(
            &self.inner.config.base_url,
            modules,
            start_ms,
            end_ms,
            Utc::now(),
        )?;
        self.call(req, mode)
    }
}

/// Why an attempt did not produce a response.
enum Failure {
    /// Status of the attempt, or `None` for a transport error.
    Retryable(Option<u16>),
    Fatal(YfError),
}

fn blocking_http_client(config: &ClientConfig) -> Result<reqwest::blocking::Client, YfError> {
    let mut httpb = reqwest::blocking::Client::builder()
        .user_agent(config.user_agent.as_str())
        .cookie_store(true)
        .timeout(config.timeout);
    if let Some(ct) = config.connect_timeout {
        httpb = httpb.connect_timeout(ct);
    }
    Ok(httpb.build()?)
}

/// Keeps a blocking client's session open; closes it on drop.
#[derive(Debug)]
pub struct SessionGuard {
    client: YfClient,
}

impl Deref for SessionGuard {
    type Target = YfClient;

    fn deref(&self) -> &YfClient {
        &self.client
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.client.close();
    }
}
