//! One method per endpoint. Each builds an [`ApiRequest`] and runs it through
//! [`YfClient::call`]; payloads are returned undecoded.

use chrono::Utc;
use serde_json::Value;

use super::YfClient;
use crate::core::YfError;
use crate::core::cache::CacheMode;
use crate::core::endpoints::{self, ChartQuery};
use crate::core::models::{CalendarModule, QuoteSummaryModule};

impl YfClient {
    /// Price history and events for one symbol (`/v8/finance/chart/{ticker}`).
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for a bad symbol or window, otherwise any
    /// request error.
    #[tracing::instrument(skip(self, query), err, fields(symbol = %ticker))]
    pub async fn get_chart(
        &self,
        ticker: &str,
        query: &ChartQuery,
        mode: CacheMode,
    ) -> Result<Value, YfError> {
        self.call(endpoints::chart(self.base_url(), ticker, query)?, mode)
            .await
    }

    /// Quotes for a comma-separated list of symbols, in one request.
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for an empty list, otherwise any request or
    /// crumb error.
    #[tracing::instrument(skip(self), err)]
    pub async fn get_quote(
        &self,
        tickers: &str,
        include_pre_post: Option<bool>,
        mode: CacheMode,
    ) -> Result<Value, YfError> {
        let req = endpoints::quote(self.base_url(), tickers, include_pre_post)?;
        self.call(req, mode).await
    }

    /// Instrument type and exchange metadata for a comma-separated list of symbols.
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for an empty list, otherwise any request error.
    #[tracing::instrument(skip(self), err)]
    pub async fn get_quote_type(&self, tickers: &str, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::quote_type(self.base_url(), tickers)?, mode)
            .await
    }

    /// The requested `quoteSummary` modules for one symbol.
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] when `modules` is empty, otherwise any
    /// request or crumb error.
    #[tracing::instrument(skip(self, modules), err, fields(symbol = %ticker))]
    pub async fn get_quote_summary(
        &self,
        ticker: &str,
        modules: &[QuoteSummaryModule],
        mode: CacheMode,
    ) -> Result<Value, YfError> {
        self.call(
            endpoints::quote_summary(self.base_url(), ticker, modules)?,
            mode,
        )
        .await
    }

    /// Fundamentals timeseries. `types` is a comma-separated list of
    /// frequency-prefixed fields, e.g. `annualTotalRevenue,quarterlyEBIT`.
    /// `period1` defaults to 2020-01-01 and `period2` to now.
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for unknown types or an inverted window,
    /// otherwise any request error.
    #[tracing::instrument(skip(self), err, fields(symbol = %ticker))]
    pub async fn get_timeseries(
        &self,
        ticker: &str,
        types: &str,
        period1: Option<i64>,
        period2: Option<i64>,
        mode: CacheMode,
    ) -> Result<Value, YfError> {
        let req =
            endpoints::timeseries(self.base_url(), ticker, types, period1, period2, Utc::now())?;
        self.call(req, mode).await
    }

    /// Option chain for the nearest expiry.
    ///
    /// # Errors
    ///
    /// Any request or crumb error.
    #[tracing::instrument(skip(self), err, fields(symbol = %ticker))]
    pub async fn get_options(&self, ticker: &str, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::options(self.base_url(), ticker)?, mode)
            .await
    }

    /// Free-text search over symbols, news and lists.
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for a blank query, otherwise any request error.
    #[tracing::instrument(skip(self), err)]
    pub async fn get_search(&self, query: &str, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::search(self.base_url(), query)?, mode)
            .await
    }

    /// Symbols similar to the given ones.
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for an empty list, otherwise any request error.
    #[tracing::instrument(skip(self), err)]
    pub async fn get_recommendations(
        &self,
        tickers: &str,
        mode: CacheMode,
    ) -> Result<Value, YfError> {
        self.call(endpoints::recommendations(self.base_url(), tickers)?, mode)
            .await
    }

    /// Technical and valuation insights plus research reports.
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for an empty list, otherwise any request error.
    #[tracing::instrument(skip(self), err)]
    pub async fn get_insights(&self, tickers: &str, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::insights(self.base_url(), tickers)?, mode)
            .await
    }

    /// Current analyst ratings.
    ///
    /// # Errors
    ///
    /// Any request error.
    #[tracing::instrument(skip(self), err, fields(symbol = %ticker))]
    pub async fn get_ratings(&self, ticker: &str, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::ratings(self.base_url(), ticker)?, mode)
            .await
    }

    /// Headline indices per region.
    ///
    /// # Errors
    ///
    /// Any request error.
    #[tracing::instrument(skip(self), err)]
    pub async fn get_market_summaries(&self, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::market_summaries(self.base_url())?, mode)
            .await
    }

    /// Trending US symbols.
    ///
    /// # Errors
    ///
    /// Any request error.
    #[tracing::instrument(skip(self), err)]
    pub async fn get_trending(&self, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::trending(self.base_url())?, mode).await
    }

    /// Every currency Yahoo quotes.
    ///
    /// # Errors
    ///
    /// Any request error.
    #[tracing::instrument(skip(self), err)]
    pub async fn get_currencies(&self, mode: CacheMode) -> Result<Value, YfError> {
        self.call(endpoints::currencies(self.base_url())?, mode)
            .await
    }

    /// Earnings, economic events, IPOs and SEC reports in a window of at most
    /// 150 days. Bounds are epoch milliseconds; `end_ms` defaults to now and
    /// `start_ms` to 149 days before the end. Empty `modules` asks for all.
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for an inverted or too long window,
    /// otherwise any request error.
    #[tracing::instrument(skip(self, modules), err)]
    pub async fn get_calendar_events(
        &self,
        modules: &[CalendarModule],
        start_ms: Option<i64>,
        end_ms: Option<i64>,
        mode: CacheMode,
    ) -> Result<Value, YfError> {
        let req =
            endpoints::calendar_events(self.base_url(), modules, start_ms, end_ms, Utc::now())?;
        self.call(req, mode).await
    }
}
