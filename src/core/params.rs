//! Ordered query parameters and crumb-safe URL rendering.

use std::borrow::Cow;
use std::fmt;

use url::Url;

/// Query parameter under which the crumb is sent.
pub const CRUMB_PARAM: &str = "crumb";

const REDACTED: &str = "REDACTED";

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryValue {
    /// A string value, sent as-is.
    Str(String),
    /// An integer value.
    Int(i64),
    /// A boolean value, sent as `true`/`false`.
    Bool(bool),
}

impl QueryValue {
    fn encode(&self) -> Cow<'_, str> {
        match self {
            Self::Str(s) => Cow::Borrowed(s),
            Self::Int(i) => Cow::Owned(i.to_string()),
            Self::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for QueryValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for QueryValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Insertion-ordered query parameters.
///
/// Setting a key that already exists replaces its value in place, so merging
/// a set of defaults with call-specific values keeps a stable order.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, QueryValue)>,
}

impl QueryParams {
    /// Empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Merge `other` into `self`; values from `other` win.
    pub fn extend(&mut self, other: &Self) {
        for (k, v) in &other.pairs {
            self.set(k.clone(), v.clone());
        }
    }

    /// Value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        let idx = self.pairs.iter().position(|(k, _)| k == key)?;
        Some(self.pairs.remove(idx).1)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `url` with these parameters appended to its query string.
    #[must_use]
    pub fn apply_to(&self, url: &Url) -> Url {
        self.render(url, |_, v| v.encode())
    }

    /// `url` with these parameters appended, the crumb value replaced by
    /// `REDACTED`. Use this for anything that ends up in logs or errors.
    #[must_use]
    pub fn redacted_url(&self, url: &Url) -> String {
        self.render(url, |k, v| {
            if k == CRUMB_PARAM {
                Cow::Borrowed(REDACTED)
            } else {
                v.encode()
            }
        })
        .to_string()
    }

    /// Encoded form without the crumb, used as part of cache keys.
    pub(crate) fn cache_fragment(&self) -> String {
        let mut ser = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in self.pairs.iter().filter(|(k, _)| k != CRUMB_PARAM) {
            ser.append_pair(k, &v.encode());
        }
        ser.finish()
    }

    fn render<'a>(
        &'a self,
        url: &Url,
        value: impl Fn(&str, &'a QueryValue) -> Cow<'a, str>,
    ) -> Url {
        let mut out = url.clone();
        if !self.pairs.is_empty() {
            let mut qp = out.query_pairs_mut();
            for (k, v) in &self.pairs {
                qp.append_pair(k, &value(k.as_str(), v));
            }
        }
        out
    }
}

impl fmt::Debug for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in &self.pairs {
            if k == CRUMB_PARAM {
                map.entry(k, &REDACTED);
            } else {
                map.entry(k, v);
            }
        }
        map.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}
