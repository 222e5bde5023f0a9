//! Centralized constants for default endpoints, UA and client defaults.

use std::time::Duration;

/// Default desktop UA to avoid trivial bot blocking.
pub(crate) const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; Linux x86_64) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) ",
    "Chrome/122.0.0.0 Safari/537.36"
);

/// Yahoo Finance API host every endpoint path is joined to.
pub(crate) const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/";

/// A URL that returns a Set-Cookie header for Yahoo domains.
pub(crate) const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com/consent";

/// Path of the crumb endpoint, relative to the base URL.
pub(crate) const CRUMB_PATH: &str = "v1/test/getcrumb";

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const DEFAULT_MAX_RETRIES: u32 = 5;
pub(crate) const DEFAULT_CACHE_CAPACITY: usize = 128;
