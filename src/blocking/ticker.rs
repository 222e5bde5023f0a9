use std::sync::OnceLock;

use serde_json::Value;

use super::{ClientLease, ClientRegistry, YfClient};
use crate::core::{
    CacheMode, ChartQuery, Frequency, QuoteSummaryModule, Statement, YfError, timeseries,
};
use crate::ticker::envelope::{self, summary_accessors};

/// Blocking counterpart of [`crate::Ticker`].
#[derive(Debug)]
pub struct Ticker {
    symbol: String,
    registry: ClientRegistry,
    lease: OnceLock<ClientLease>,
    cache_mode: CacheMode,
}

impl Ticker {
    /// Ticker backed by the process-wide blocking registry.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self::with_registry(ClientRegistry::global(), symbol)
    }

    /// Ticker backed by `registry`.
    pub fn with_registry(registry: &ClientRegistry, symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            registry: registry.clone(),
            lease: OnceLock::new(),
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
        self.lease.get().is_some()
    }

    /// Give the client lease back. Idempotent; a later request takes a new lease.
    pub fn close(&mut self) {
        if let Some(lease) = self.lease.take() {
            lease.release();
        }
    }

    fn client(&self) -> &YfClient {
        self.lease.get_or_init(|| self.registry.acquire())
    }

    /// Price bars and events.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response has no chart result.
    pub fn chart(&self, query: &ChartQuery) -> Result<Value, YfError> {
        let body = self.client().get_chart(&self.symbol, query, self.cache_mode)?;
        envelope::take(body, envelope::CHART)
    }

    /// Latest quote.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the symbol is unknown.
    pub fn quote(&self, include_pre_post: Option<bool>) -> Result<Value, YfError> {
        let body = self
            .client()
            .get_quote(&self.symbol, include_pre_post, self.cache_mode)?;
        envelope::take(body, envelope::QUOTE)
    }

    /// Instrument type, exchange and names.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the symbol is unknown.
    pub fn quote_type(&self) -> Result<Value, YfError> {
        let body = self.client().get_quote_type(&self.symbol, self.cache_mode)?;
        envelope::take(body, envelope::QUOTE_TYPE)
    }

    /// The given `quoteSummary` modules; all modules when `modules` is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the symbol is unknown.
    pub fn quote_summary(&self, modules: &[QuoteSummaryModule]) -> Result<Value, YfError> {
        let modules = if modules.is_empty() {
            QuoteSummaryModule::ALL
        } else {
            modules
        };
        let body = self
            .client()
            .get_quote_summary(&self.symbol, modules, self.cache_mode)?;
        envelope::take(body, envelope::QUOTE_SUMMARY)
    }

    /// A single `quoteSummary` module, list-wrapping modules unwrapped.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the module is absent.
    pub fn quote_summary_module(&self, module: QuoteSummaryModule) -> Result<Value, YfError> {
        let body = self
            .client()
            .get_quote_summary(&self.symbol, &[module], self.cache_mode)?;
        envelope::summary_module(body, module)
    }

    /// Income statement timeseries.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn income_statement(
        &self,
        frequency: Frequency,
        period1: Option<i64>,
        period2: Option<i64>,
    ) -> Result<Vec<Value>, YfError> {
        self.statement(Statement::IncomeStatement, frequency, period1, period2)
    }

    /// Balance sheet timeseries.
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for [`Frequency::Trailing`], otherwise any
    /// request error.
    pub fn balance_sheet(
        &self,
        frequency: Frequency,
        period1: Option<i64>,
        period2: Option<i64>,
    ) -> Result<Vec<Value>, YfError> {
        self.statement(Statement::BalanceSheet, frequency, period1, period2)
    }

    /// Cash flow timeseries.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn cash_flow(
        &self,
        frequency: Frequency,
        period1: Option<i64>,
        period2: Option<i64>,
    ) -> Result<Vec<Value>, YfError> {
        self.statement(Statement::CashFlow, frequency, period1, period2)
    }

    /// Any of the three statements.
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for a trailing balance sheet, otherwise any
    /// request error.
    pub fn statement(
        &self,
        statement: Statement,
        frequency: Frequency,
        period1: Option<i64>,
        period2: Option<i64>,
    ) -> Result<Vec<Value>, YfError> {
        let types = timeseries::statement_types(frequency, statement)?;
        let body =
            self.client()
                .get_timeseries(&self.symbol, &types, period1, period2, self.cache_mode)?;
        envelope::take_list(body, envelope::TIMESERIES)
    }

    /// Option chain for the nearest expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or there is no chain.
    pub fn options(&self) -> Result<Value, YfError> {
        let body = self.client().get_options(&self.symbol, self.cache_mode)?;
        envelope::take(body, envelope::OPTIONS)
    }

    /// Search results for the symbol, as returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn search(&self) -> Result<Value, YfError> {
        self.client().get_search(&self.symbol, self.cache_mode)
    }

    /// Similar symbols.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the result is absent.
    pub fn recommendations(&self) -> Result<Value, YfError> {
        let body = self
            .client()
            .get_recommendations(&self.symbol, self.cache_mode)?;
        envelope::take(body, envelope::FINANCE)
    }

    /// Technical and valuation insights.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the result is absent.
    pub fn insights(&self) -> Result<Value, YfError> {
        let body = self.client().get_insights(&self.symbol, self.cache_mode)?;
        envelope::take(body, envelope::FINANCE)
    }

    /// Analyst ratings, as returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn ratings(&self) -> Result<Value, YfError> {
        self.client().get_ratings(&self.symbol, self.cache_mode)
    }
}

macro_rules! blocking_summary_accessors {
    ($( $name:ident => $module:ident ),* $(,)?) => {
        impl Ticker {
            $(
                #[doc = concat!("The [`QuoteSummaryModule::", stringify!($module), "`] module.")]
                ///
                /// # Errors
                ///
                /// Returns an error if the request fails or the module is absent.
                pub fn $name(&self) -> Result<Value, YfError> {
                    self.quote_summary_module(QuoteSummaryModule::$module)
                }
            )*
        }
    };
}
summary_accessors!(blocking_summary_accessors);
