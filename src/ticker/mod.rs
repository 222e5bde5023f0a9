pub(crate) mod envelope;

use serde_json::Value;
use tokio::sync::OnceCell;

use crate::core::{
    CacheMode, ChartQuery, Frequency, QuoteSummaryModule, Statement, YfClient, YfError,
    timeseries,
};
use crate::registry::{ClientLease, ClientRegistry};
use envelope::summary_accessors;

/// A high-level interface for a single ticker symbol.
///
/// A `Ticker` is a lightweight handle: it takes a lease on the registry's
/// shared [`YfClient`] on its first request and gives it back on
/// [`close`](Self::close) or drop. Every method returns the relevant part of
/// Yahoo's JSON with the response envelope stripped.
///
/// # Example
///
/// ```no_run
/// # use yafin::{ChartQuery, Interval, Range, Ticker};
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut ticker = Ticker::new("TSLA");
///
/// let quote = ticker.quote(None).await?;
/// println!("Tesla's last price: {}", quote["regularMarketPrice"]);
///
/// let chart = ticker.chart(&ChartQuery::new(Interval::D1).range(Range::Y1)).await?;
/// println!("{} bars", chart["timestamp"].as_array().map_or(0, Vec::len));
///
/// ticker.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Ticker {
    symbol: String,
    registry: ClientRegistry,
    lease: OnceCell<ClientLease>,
    cache_mode: CacheMode,
}

impl Ticker {
    /// Ticker backed by the process-wide [`ClientRegistry::global`].
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_registry(ClientRegistry::global(), symbol)
    }

    /// Ticker backed by `registry`.
    pub fn with_registry(registry: &ClientRegistry, symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            registry: registry.clone(),
            lease: OnceCell::new(),
            cache_mode: CacheMode::Use,
        }
    }

    /// Sets the cache mode for all subsequent API calls made by this `Ticker` instance.
    #[must_use]
    pub const fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// The symbol this ticker queries.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Whether this ticker currently holds a lease.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.lease.initialized()
    }

    /// Give the client lease back. Calling it again, or on a ticker that never
    /// made a request, does nothing; a later request takes a new lease.
    pub async fn close(&mut self) {
        if let Some(lease) = self.lease.take() {
            lease.release().await;
        }
    }

    async fn client(&self) -> &YfClient {
        self.lease.get_or_init(|| self.registry.acquire()).await
    }

    /* ---------------- Prices ---------------- */

    /// Price bars and events.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response has no chart result.
    #[tracing::instrument(skip(self, query), err, fields(symbol = %self.symbol))]
    pub async fn chart(&self, query: &ChartQuery) -> Result<Value, YfError> {
        let body = self
            .client()
            .await
            .get_chart(&self.symbol, query, self.cache_mode)
            .await?;
        envelope::take(body, envelope::CHART)
    }

    /// Latest quote.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the symbol is unknown.
    #[tracing::instrument(skip(self), err, fields(symbol = %self.symbol))]
    pub async fn quote(&self, include_pre_post: Option<bool>) -> Result<Value, YfError> {
        let body = self
            .client()
            .await
            .get_quote(&self.symbol, include_pre_post, self.cache_mode)
            .await?;
        envelope::take(body, envelope::QUOTE)
    }

    /// Instrument type, exchange and names.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the symbol is unknown.
    #[tracing::instrument(skip(self), err, fields(symbol = %self.symbol))]
    pub async fn quote_type(&self) -> Result<Value, YfError> {
        let body = self
            .client()
            .await
            .get_quote_type(&self.symbol, self.cache_mode)
            .await?;
        envelope::take(body, envelope::QUOTE_TYPE)
    }

    /* ---------------- quoteSummary ---------------- */

    /// The given `quoteSummary` modules in one request; all modules when
    /// `modules` is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the symbol is unknown.
    #[tracing::instrument(skip(self, modules), err, fields(symbol = %self.symbol))]
    pub async fn quote_summary(&self, modules: &[QuoteSummaryModule]) -> Result<Value, YfError> {
        let modules = if modules.is_empty() {
            QuoteSummaryModule::ALL
        } else {
            modules
        };
        let body = self
            .client()
            .await
            .get_quote_summary(&self.symbol, modules, self.cache_mode)
            .await?;
        envelope::take(body, envelope::QUOTE_SUMMARY)
    }

    /// A single `quoteSummary` module. Modules that only wrap a list
    /// (histories, trends, ownership and insider lists) return the list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the module is absent.
    #[tracing::instrument(skip(self), err, fields(symbol = %self.symbol))]
    pub async fn quote_summary_module(&self, module: QuoteSummaryModule) -> Result<Value, YfError> {
        let body = self
            .client()
            .await
            .get_quote_summary(&self.symbol, &[module], self.cache_mode)
            .await?;
        envelope::summary_module(body, module)
    }

    /* ---------------- Fundamentals ---------------- */

    /// Income statement timeseries. `period1`/`period2` are epoch seconds and
    /// default to 2020-01-01 and now.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn income_statement(
        &self,
        frequency: Frequency,
        period1: Option<i64>,
        period2: Option<i64>,
    ) -> Result<Vec<Value>, YfError> {
        self.statement(Statement::IncomeStatement, frequency, period1, period2)
            .await
    }

    /// Balance sheet timeseries.
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for [`Frequency::Trailing`], otherwise any
    /// request error.
    pub async fn balance_sheet(
        &self,
        frequency: Frequency,
        period1: Option<i64>,
        period2: Option<i64>,
    ) -> Result<Vec<Value>, YfError> {
        self.statement(Statement::BalanceSheet, frequency, period1, period2)
            .await
    }

    /// Cash flow timeseries.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn cash_flow(
        &self,
        frequency: Frequency,
        period1: Option<i64>,
        period2: Option<i64>,
    ) -> Result<Vec<Value>, YfError> {
        self.statement(Statement::CashFlow, frequency, period1, period2)
            .await
    }

    /// Any of the three statements.
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for a trailing balance sheet, otherwise any
    /// request error.
    #[tracing::instrument(skip(self), err, fields(symbol = %self.symbol))]
    pub async fn statement(
        &self,
        statement: Statement,
        frequency: Frequency,
        period1: Option<i64>,
        period2: Option<i64>,
    ) -> Result<Vec<Value>, YfError> {
        let types = timeseries::statement_types(frequency, statement)?;
        let body = self
            .client()
            .await
            .get_timeseries(&self.symbol, &types, period1, period2, self.cache_mode)
            .await?;
        envelope::take_list(body, envelope::TIMESERIES)
    }

    /* ---------------- Other endpoints ---------------- */

    /// Option chain for the nearest expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or there is no chain.
    #[tracing::instrument(skip(self), err, fields(symbol = %self.symbol))]
    pub async fn options(&self) -> Result<Value, YfError> {
        let body = self
            .client()
            .await
            .get_options(&self.symbol, self.cache_mode)
            .await?;
        envelope::take(body, envelope::OPTIONS)
    }

    /// Search results for the symbol, as returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[tracing::instrument(skip(self), err, fields(symbol = %self.symbol))]
    pub async fn search(&self) -> Result<Value, YfError> {
        self.client()
            .await
            .get_search(&self.symbol, self.cache_mode)
            .await
    }

    /// Similar symbols.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the result is absent.
    #[tracing::instrument(skip(self), err, fields(symbol = %self.symbol))]
    pub async fn recommendations(&self) -> Result<Value, YfError> {
        let body = self
            .client()
            .await
            .get_recommendations(&self.symbol, self.cache_mode)
            .await?;
        envelope::take(body, envelope::FINANCE)
    }

    /// Technical and valuation insights.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the result is absent.
    #[tracing::instrument(skip(self), err, fields(symbol = %self.symbol))]
    pub async fn insights(&self) -> Result<Value, YfError> {
        let body = self
            .client()
            .await
            .get_insights(&self.symbol, self.cache_mode)
            .await?;
        envelope::take(body, envelope::FINANCE)
    }

    /// Analyst ratings, as returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[tracing::instrument(skip(self), err, fields(symbol = %self.symbol))]
    pub async fn ratings(&self) -> Result<Value, YfError> {
        self.client()
            .await
            .get_ratings(&self.symbol, self.cache_mode)
            .await
    }
}

macro_rules! async_summary_accessors {
    ($( $name:ident => $module:ident ),* $(,)?) => {
        impl Ticker {
            $(
                #[doc = concat!("The [`QuoteSummaryModule::", stringify!($module), "`] module.")]
                ///
                /// # Errors
                ///
                /// Returns an error if the request fails or the module is absent.
                pub async fn $name(&self) -> Result<Value, YfError> {
                    self.quote_summary_module(QuoteSummaryModule::$module).await
                }
            )*
        }
    };
}
summary_accessors!(async_summary_accessors);
