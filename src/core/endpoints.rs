//! Request builders for every supported endpoint.
//!
//! Builders are pure: they validate inputs, resolve time-relative defaults to
//! concrete values and return an [`ApiRequest`]. Both the async and the
//! blocking client execute the same requests, so cache keys match across modes.

use chrono::{DateTime, TimeDelta, Utc};
use url::Url;

use crate::core::YfError;
use crate::core::cache::CacheKey;
use crate::core::models::{
    CalendarModule, ChartEvent, Interval, QuoteSummaryModule, Range, join_unique,
};
use crate::core::params::QueryParams;
use crate::core::timeseries;

/// 2020-01-01T00:00:00Z, the default start of a fundamentals timeseries.
pub(crate) const DEFAULT_TIMESERIES_START: i64 = 1_577_836_800;

/// The calendar screener rejects windows longer than this.
const CALENDAR_MAX_DAYS: i64 = 150;
const CALENDAR_DEFAULT_DAYS: i64 = 149;

/// A fully resolved call: URL with path parameters substituted, flat query
/// parameters, and whether a crumb must be attached.
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    pub(crate) op: &'static str,
    pub(crate) url: Url,
    pub(crate) params: QueryParams,
    pub(crate) needs_crumb: bool,
}

impl ApiRequest {
    fn new(op: &'static str, url: Url, params: QueryParams) -> Self {
        Self {
            op,
            url,
            params,
            needs_crumb: false,
        }
    }

    const fn with_crumb(mut self) -> Self {
        self.needs_crumb = true;
        self
    }

    pub(crate) fn cache_key(&self) -> CacheKey {
        CacheKey::new(
            self.op,
            format!("{}?{}", self.url, self.params.cache_fragment()),
        )
    }
}

/// Parameters for the chart endpoint.
///
/// Either a relative [`Range`] or an absolute `period1`/`period2` window (epoch
/// seconds) may be given; Yahoo prefers the window when both are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartQuery {
    interval: Interval,
    range: Option<Range>,
    period1: Option<i64>,
    period2: Option<i64>,
    include_pre_post: Option<bool>,
    events: Vec<ChartEvent>,
}

impl ChartQuery {
    /// Chart at `interval`, with every corporate event attached.
    #[must_use]
    pub fn new(interval: Interval) -> Self {
        Self {
            interval,
            range: None,
            period1: None,
            period2: None,
            include_pre_post: None,
            events: ChartEvent::ALL.to_vec(),
        }
    }

    /// Relative lookback.
    #[must_use]
    pub const fn range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    /// Absolute window in epoch seconds.
    #[must_use]
    pub const fn between(mut self, period1: i64, period2: i64) -> Self {
        self.period1 = Some(period1);
        self.period2 = Some(period2);
        self
    }

    /// Start of the window only.
    #[must_use]
    pub const fn period1(mut self, period1: i64) -> Self {
        self.period1 = Some(period1);
        self
    }

    /// End of the window only.
    #[must_use]
    pub const fn period2(mut self, period2: i64) -> Self {
        self.period2 = Some(period2);
        self
    }

    /// Include pre- and post-market bars.
    #[must_use]
    pub const fn include_pre_post(mut self, yes: bool) -> Self {
        self.include_pre_post = Some(yes);
        self
    }

    /// Events to attach; an empty list omits the `events` parameter.
    #[must_use]
    pub fn events(mut self, events: impl Into<Vec<ChartEvent>>) -> Self {
        self.events = events.into();
        self
    }
}

fn default_params() -> QueryParams {
    QueryParams::new()
        .with("region", "US")
        .with("lang", "en-US")
        .with("formatted", false)
        .with("corsDomain", "finance.yahoo.com")
}

/// Join path segments onto `base`, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, YfError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| YfError::InvalidParams(format!("base URL {base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn symbol(ticker: &str) -> Result<&str, YfError> {
    let t = ticker.trim();
    if t.is_empty() || t.contains(',') {
        return Err(YfError::InvalidParams(format!("invalid ticker symbol {ticker:?}")));
    }
    Ok(t)
}

/// Normalize a comma-separated ticker list: trimmed, no empties.
pub(crate) fn symbol_list(tickers: &str) -> Result<String, YfError> {
    let parts: Vec<&str> = tickers
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        return Err(YfError::InvalidParams("at least one ticker symbol required".into()));
    }
    Ok(parts.join(","))
}

pub(crate) fn chart(base: &Url, ticker: &str, q: &ChartQuery) -> Result<ApiRequest, YfError> {
    if let (Some(p1), Some(p2)) = (q.period1, q.period2)
        && p1 > p2
    {
        return Err(YfError::InvalidParams(format!(
            "chart period1 ({p1}) must not be after period2 ({p2})"
        )));
    }

    let mut params = default_params()
        .with("source", "cosaic")
        .with("includeAdjustedClose", true)
        .with("userYfid", true)
        .with("interval", q.interval.as_str());
    if let Some(r) = q.range {
        params.set("range", r.as_str());
    }
    if let Some(p1) = q.period1 {
        params.set("period1", p1);
    }
    if let Some(p2) = q.period2 {
        params.set("period2", p2);
    }
    if let Some(pp) = q.include_pre_post {
        params.set("includePrePost", pp);
    }
    if !q.events.is_empty() {
        params.set("events", join_unique(&q.events, ChartEvent::as_str));
    }

    let url = endpoint(base, &["v8", "finance", "chart", symbol(ticker)?])?;
    Ok(ApiRequest::new("chart", url, params))
}

pub(crate) fn quote(
    base: &Url,
    tickers: &str,
    include_pre_post: Option<bool>,
) -> Result<ApiRequest, YfError> {
    let mut params = default_params().with("symbols", symbol_list(tickers)?);
    if let Some(pp) = include_pre_post {
        params.set("includePrePost", pp);
    }
    let url = endpoint(base, &["v7", "finance", "quote"])?;
    Ok(ApiRequest::new("quote", url, params).with_crumb())
}

pub(crate) fn quote_type(base: &Url, tickers: &str) -> Result<ApiRequest, YfError> {
    let params = default_params()
        .with("enablePrivateCompany", true)
        .with("symbol", symbol_list(tickers)?);
    let url = endpoint(base, &["v1", "finance", "quoteType", ""])?;
    Ok(ApiRequest::new("quote_type", url, params))
}

pub(crate) fn quote_summary(
    base: &Url,
    ticker: &str,
    modules: &[QuoteSummaryModule],
) -> Result<ApiRequest, YfError> {
    if modules.is_empty() {
        return Err(YfError::InvalidParams("at least one quoteSummary module required".into()));
    }
    let params = default_params()
        .with("enablePrivateCompany", true)
        .with("enableQSPExpandedEarnings", true)
        .with("overnightPrice", true)
        .with("modules", join_unique(modules, QuoteSummaryModule::as_str));
    let url = endpoint(base, &["v10", "finance", "quoteSummary", symbol(ticker)?])?;
    Ok(ApiRequest::new("quote_summary", url, params).with_crumb())
}

pub(crate) fn timeseries(
    base: &Url,
    ticker: &str,
    types: &str,
    period1: Option<i64>,
    period2: Option<i64>,
    now: DateTime<Utc>,
) -> Result<ApiRequest, YfError> {
    let types = timeseries::normalize_types(types)?;
    let period1 = period1.unwrap_or(DEFAULT_TIMESERIES_START);
    let period2 = period2.unwrap_or_else(|| now.timestamp());
    if period1 > period2 {
        return Err(YfError::InvalidParams(format!(
            "timeseries period1 ({period1}) must not be after period2 ({period2})"
        )));
    }

    let params = default_params()
        .with("merge", false)
        .with("padTimeSeries", true)
        .with("type", types)
        .with("period1", period1)
        .with("period2", period2);
    let url = endpoint(
        base,
        &["ws", "fundamentals-timeseries", "v1", "finance", "timeseries", symbol(ticker)?],
    )?;
    Ok(ApiRequest::new("timeseries", url, params))
}

pub(crate) fn options(base: &Url, ticker: &str) -> Result<ApiRequest, YfError> {
    let params = default_params().with("date", -1).with("straddle", false);
    let url = endpoint(base, &["v7", "finance", "options", symbol(ticker)?])?;
    Ok(ApiRequest::new("options", url, params).with_crumb())
}

pub(crate) fn search(base: &Url, query: &str) -> Result<ApiRequest, YfError> {
    let q = query.trim();
    if q.is_empty() {
        return Err(YfError::InvalidParams("search query must not be empty".into()));
    }
    let params = default_params().with("q", q);
    let url = endpoint(base, &["v1", "finance", "search"])?;
    Ok(ApiRequest::new("search", url, params))
}

pub(crate) fn recommendations(base: &Url, tickers: &str) -> Result<ApiRequest, YfError> {
    let list = symbol_list(tickers)?;
    let url = endpoint(base, &["v6", "finance", "recommendationsbysymbol", &list])?;
    Ok(ApiRequest::new("recommendations", url, default_params()))
}

pub(crate) fn insights(base: &Url, tickers: &str) -> Result<ApiRequest, YfError> {
    let params = default_params()
        .with("disableRelatedReports", true)
        .with("getAllResearchReports", true)
        .with("reportsCount", 4)
        .with("ssl", true)
        .with("symbols", symbol_list(tickers)?);
    let url = endpoint(base, &["ws", "insights", "v3", "finance", "insights"])?;
    Ok(ApiRequest::new("insights", url, params))
}

pub(crate) fn ratings(base: &Url, ticker: &str) -> Result<ApiRequest, YfError> {
    let params = default_params().with("exclude_noncurrent", true);
    let url = endpoint(base, &["v2", "ratings", "top", symbol(ticker)?])?;
    Ok(ApiRequest::new("ratings", url, params))
}

pub(crate) fn market_summaries(base: &Url) -> Result<ApiRequest, YfError> {
    let url = endpoint(base, &["v6", "finance", "quote", "marketSummary"])?;
    Ok(ApiRequest::new("market_summaries", url, default_params()))
}

pub(crate) fn trending(base: &Url) -> Result<ApiRequest, YfError> {
    let url = endpoint(base, &["v1", "finance", "trending", "US"])?;
    Ok(ApiRequest::new("trending", url, default_params()))
}

pub(crate) fn currencies(base: &Url) -> Result<ApiRequest, YfError> {
    let url = endpoint(base, &["v1", "finance", "currencies"])?;
    Ok(ApiRequest::new("currencies", url, default_params()))
}

/// `start_ms`/`end_ms` are epoch milliseconds. `end_ms` defaults to `now`,
/// `start_ms` to 149 days before the end.
pub(crate) fn calendar_events(
    base: &Url,
    modules: &[CalendarModule],
    start_ms: Option<i64>,
    end_ms: Option<i64>,
    now: DateTime<Utc>,
) -> Result<ApiRequest, YfError> {
    let out_of_range = || YfError::InvalidParams("calendar window is out of range".into());
    let end = end_ms.unwrap_or_else(|| now.timestamp_millis());
    let start = match start_ms {
        Some(s) => s,
        None => end
            .checked_sub(TimeDelta::days(CALENDAR_DEFAULT_DAYS).num_milliseconds())
            .ok_or_else(out_of_range)?,
    };
    if start > end {
        return Err(YfError::InvalidParams(format!(
            "calendar startDate ({start}) must not be after endDate ({end})"
        )));
    }
    let span = end.checked_sub(start).ok_or_else(out_of_range)?;
    if span > TimeDelta::days(CALENDAR_MAX_DAYS).num_milliseconds() {
        return Err(YfError::InvalidParams(format!(
            "calendar window must not exceed {CALENDAR_MAX_DAYS} days"
        )));
    }

    let mut params = default_params()
        .with("countPerDay", 25)
        .with("economicEventsHighImportanceOnly", true)
        .with("economicEventsRegionFilter", "");
    if !modules.is_empty() {
        params.set("modules", join_unique(modules, CalendarModule::as_str));
    }
    params.set("startDate", start);
    params.set("endDate", end);

    let url = endpoint(base, &["ws", "screeners", "v1", "finance", "calendar-events"])?;
    Ok(ApiRequest::new("calendar_events", url, params))
}
