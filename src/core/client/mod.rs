//! Public client surface + builder.
//! Internals are split into `session` (lazy HTTP session), `auth` (cookie/crumb),
//! `send` (retrying executor), `api` (endpoint calls), `retry` (policy) and
//! `constants` (UA + defaults).

mod api;
mod auth;
pub(crate) mod constants;
mod retry;
mod send;
mod session;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use url::Url;

use crate::core::YfError;
use crate::core::cache::{CacheMode, ResultCache};
use crate::core::endpoints::ApiRequest;
use crate::core::params::CRUMB_PARAM;
use constants::{
    CRUMB_PATH, DEFAULT_BASE_URL, DEFAULT_CACHE_CAPACITY, DEFAULT_COOKIE_URL, DEFAULT_TIMEOUT,
    USER_AGENT,
};

pub(crate) use auth::validate_crumb;
pub use retry::{Backoff, RetryConfig, Sleeper, SystemSleeper};
pub(crate) use retry::StatusClass;

/// Validated settings shared by every client built from them.
///
/// Obtain one from [`YfClientBuilder::build_config`]; a registry stores it and
/// builds clients from it on demand, which cannot fail.
#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) base_url: Url,
    pub(crate) crumb_url: Url,
    pub(crate) cookie_url: Option<Url>,
    pub(crate) user_agent: String,
    pub(crate) timeout: Duration,
    pub(crate) connect_timeout: Option<Duration>,
    pub(crate) retry: RetryConfig,
    pub(crate) cache_capacity: usize,
    pub(crate) sleeper: Arc<dyn Sleeper>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        YfClientBuilder::default()
            .build_config()
            .expect("default client config")
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("crumb_url", &self.crumb_url.as_str())
            .field("cookie_url", &self.cookie_url.as_ref().map(Url::as_str))
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("cache_capacity", &self.cache_capacity)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Host every endpoint path is joined to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Where the crumb is fetched from.
    #[must_use]
    pub const fn crumb_url(&self) -> &Url {
        &self.crumb_url
    }

    /// Cookie bootstrap URL, if the client performs one before fetching a crumb.
    #[must_use]
    pub const fn cookie_url(&self) -> Option<&Url> {
        self.cookie_url.as_ref()
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retry policy.
    #[must_use]
    pub const fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Maximum number of memoized results; 0 disables the cache.
    #[must_use]
    pub const fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client, YfError> {
        let mut httpb = reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .cookie_store(true)
            .timeout(self.timeout);
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }
        Ok(httpb.build()?)
    }
}

/* ----------------------- Client ----------------------- */

#[derive(Default)]
struct SessionState {
    http: Option<reqwest::Client>,
    crumb: Option<String>,
    /// Bumped every time a session is opened.
    generation: u64,
}

struct Inner {
    config: ClientConfig,
    state: RwLock<SessionState>,
    crumb_fetch_lock: Mutex<()>,
    cache: ResultCache,
}

/// Async client for the Yahoo Finance API.
///
/// Cloning is cheap and clones share the session, crumb and result cache.
/// The HTTP session opens lazily on the first request and can be closed and
/// reopened any number of times.
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
    /// Create a new builder.
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

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn base_url(&self) -> &Url {
        &self.inner.config.base_url
    }

    /// Cache lookup, crumb injection, retrying GET and JSON decoding, in that
    /// order. Results are stored according to `mode`.
    pub(crate) async fn call(&self, req: ApiRequest, mode: CacheMode) -> Result<Value, YfError> {
        let key = req.cache_key();
        if mode.reads()
            && let Some(hit) = self.inner.cache.get(&key)
        {
            tracing::debug!(op = req.op, "cache hit");
            return Ok(hit);
        }

        let mut params = req.params;
        if req.needs_crumb {
            params.set(CRUMB_PARAM, self.crumb().await?);
        }
        let value: Value = self.request(&req.url, &params, None).await?.json()?;

        if mode.writes() {
            self.inner.cache.put(key, value.clone());
        }
        Ok(value)
    }
}

/* ----------------------- Builder ----------------------- */

/// Builder for [`ClientConfig`], [`YfClient`] and [`crate::blocking::YfClient`].
#[derive(Debug, Default)]
pub struct YfClientBuilder {
    user_agent: Option<String>,
    base_url: Option<Url>,
    crumb_url: Option<Url>,
    cookie_url: Option<Url>,
    no_cookie_bootstrap: bool,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry: RetryConfig,
    cache_capacity: Option<usize>,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl YfClientBuilder {
    /// Override the User-Agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override the API host (default `https://query2.finance.yahoo.com/`).
    ///
    /// Overriding the host also turns off the cookie bootstrap unless
    /// [`cookie_url`](Self::cookie_url) is set explicitly.
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Override the crumb URL (default: `v1/test/getcrumb` under the base URL).
    #[must_use]
    pub fn crumb_url(mut self, url: Url) -> Self {
        self.crumb_url = Some(url);
        self
    }

    /// Override the cookie bootstrap URL.
    #[must_use]
    pub fn cookie_url(mut self, url: Url) -> Self {
        self.cookie_url = Some(url);
        self.no_cookie_bootstrap = false;
        self
    }

    /// Fetch the crumb without requesting a consent cookie first.
    #[must_use]
    pub fn no_cookie_bootstrap(mut self) -> Self {
        self.cookie_url = None;
        self.no_cookie_bootstrap = true;
        self
    }

    /// Per-request timeout. Default: 5 seconds.
    #[must_use]
    pub const fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    #[must_use]
    pub const fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Total attempts per request, including the first. Default: 5.
    #[must_use]
    pub const fn max_retries(mut self, attempts: u32) -> Self {
        self.retry.max_retries = attempts;
        self
    }

    /// Delay policy between attempts.
    #[must_use]
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.retry.backoff = backoff;
        self
    }

    /// Treat connection failures as retryable.
    #[must_use]
    pub const fn retry_on_connect(mut self, yes: bool) -> Self {
        self.retry.retry_on_connect = yes;
        self
    }

    /// Replace the whole retry policy.
    #[must_use]
    pub fn retry_config(mut self, cfg: RetryConfig) -> Self {
        self.retry = cfg;
        self
    }

    /// Maximum number of memoized results. 0 disables caching. Default: 128.
    #[must_use]
    pub const fn cache_capacity(mut self, entries: usize) -> Self {
        self.cache_capacity = Some(entries);
        self
    }

    /// Replace how backoff delays are waited out.
    #[must_use]
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Validate the settings without creating a client.
    ///
    /// # Errors
    ///
    /// Returns [`YfError::InvalidParams`] if `max_retries` is 0, the timeout is
    /// zero, or the base URL cannot carry a path; [`YfError::Url`] if a default
    /// URL fails to parse.
    pub fn build_config(self) -> Result<ClientConfig, YfError> {
        if self.retry.max_retries == 0 {
            return Err(YfError::InvalidParams("max_retries must be at least 1".into()));
        }
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(YfError::InvalidParams("timeout must be greater than zero".into()));
        }

        let base_overridden = self.base_url.is_some();
        let base_url = match self.base_url {
            Some(u) => u,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };
        if base_url.cannot_be_a_base() {
            return Err(YfError::InvalidParams(format!(
                "base URL {base_url} cannot carry a path"
            )));
        }

        let crumb_url = match self.crumb_url {
            Some(u) => u,
            None => base_with_slash(&base_url).join(CRUMB_PATH)?,
        };
        let cookie_url = match (self.cookie_url, self.no_cookie_bootstrap) {
            (_, true) => None,
            (Some(u), false) => Some(u),
            (None, false) if base_overridden => None,
            (None, false) => Some(Url::parse(DEFAULT_COOKIE_URL)?),
        };

        Ok(ClientConfig {
            base_url,
            crumb_url,
            cookie_url,
            user_agent: self.user_agent.unwrap_or_else(|| USER_AGENT.to_string()),
            timeout,
            connect_timeout: self.connect_timeout,
            retry: self.retry,
            cache_capacity: self.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY),
            sleeper: self.sleeper.unwrap_or_else(|| Arc::new(SystemSleeper)),
        })
    }

    /// Build an async client.
    ///
    /// # Errors
    ///
    /// See [`build_config`](Self::build_config).
    pub fn build(self) -> Result<YfClient, YfError> {
        Ok(YfClient::new(self.build_config()?))
    }

    /// Build a blocking client.
    ///
    /// # Errors
    ///
    /// See [`build_config`](Self::build_config).
    pub fn build_blocking(self) -> Result<crate::blocking::YfClient, YfError> {
        Ok(crate::blocking::YfClient::new(self.build_config()?))
    }
}

/// `Url::join` drops the last segment unless the path ends in `/`.
fn base_with_slash(base: &Url) -> Url {
    let mut u = base.clone();
    if !u.path().ends_with('/') {
        u.set_path(&format!("{}/", u.path()));
    }
    u
}
