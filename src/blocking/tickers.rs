use std::sync::OnceLock;

use serde_json::Value;

use super::{ClientLease, ClientRegistry, Ticker, YfClient};
use crate::core::endpoints::symbol_list;
use crate::core::{CacheMode, ChartQuery, Frequency, QuoteSummaryModule, Statement, YfError};
use crate::ticker::envelope::{self, summary_accessors};

/// Blocking counterpart of [`crate::Tickers`]. Non-batched operations run
/// one symbol after another.
#[derive(Debug)]
pub struct Tickers {
    symbols: String,
    registry: ClientRegistry,
    lease: OnceLock<ClientLease>,
    members: Vec<Ticker>,
    cache_mode: CacheMode,
}

impl Tickers {
    /// Comma-separated symbols, backed by the process-wide blocking registry.
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] if the list holds no symbol.
    pub fn new(tickers: &str) -> Result<Self, YfError> {
        Self::with_registry(ClientRegistry::global(), tickers)
    }

    /// Comma-separated symbols, backed by `registry`.
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] if the list holds no symbol.
    pub fn with_registry(registry: &ClientRegistry, tickers: &str) -> Result<Self, YfError> {
        let symbols = symbol_list(tickers)?;
        let members = symbols
            .split(',')
            .map(|s| Ticker::with_registry(registry, s))
            .collect();
        Ok(Self {
            symbols,
            registry: registry.clone(),
            lease: OnceLock::new(),
            members,
            cache_mode: CacheMode::Use,
        })
    }

    /// Sets the cache mode for this handle and every member ticker.
    #[must_use]
    pub fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self.members = self
            .members
            .into_iter()
            .map(|t| t.cache_mode(mode))
            .collect();
        self
    }

    /// The normalized symbols, in order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(Ticker::symbol)
    }

    /// The member tickers, in order.
    #[must_use]
    pub fn tickers(&self) -> &[Ticker] {
        &self.members
    }

    /// Release this handle's lease and every member's.
    pub fn close(&mut self) {
        if let Some(lease) = self.lease.take() {
            lease.release();
        }
        for t in &mut self.members {
            t.close();
        }
    }

    fn client(&self) -> &YfClient {
        self.lease.get_or_init(|| self.registry.acquire())
    }

    fn each<T>(&self, f: impl Fn(&Ticker) -> Result<T, YfError>) -> Result<Vec<T>, YfError> {
        self.members.iter().map(f).collect()
    }

    /// Quotes for every symbol, in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn quote(&self, include_pre_post: Option<bool>) -> Result<Vec<Value>, YfError> {
        let body = self
            .client()
            .get_quote(&self.symbols, include_pre_post, self.cache_mode)?;
        envelope::take_list(body, envelope::QUOTES)
    }

    /// Quote types for every symbol, in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn quote_type(&self) -> Result<Vec<Value>, YfError> {
        let body = self.client().get_quote_type(&self.symbols, self.cache_mode)?;
        envelope::take_list(body, envelope::QUOTE_TYPES)
    }

    /// Chart for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub fn chart(&self, query: &ChartQuery) -> Result<Vec<Value>, YfError> {
        self.each(|t| t.chart(query))
    }

    /// `quoteSummary` for every symbol; all modules when `modules` is empty.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub fn quote_summary(&self, modules: &[QuoteSummaryModule]) -> Result<Vec<Value>, YfError> {
        self.each(|t| t.quote_summary(modules))
    }

    /// One `quoteSummary` module for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub fn quote_summary_module(
        &self,
        module: QuoteSummaryModule,
    ) -> Result<Vec<Value>, YfError> {
        self.each(|t| t.quote_summary_module(module))
    }

    /// Income statements for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub fn income_statement(
        &self,
        frequency: Frequency,
        period1: Option<i64>,
        period2: Option<i64>,
    ) -> Result<Vec<Vec<Value>>, YfError> {
        self.statement(Statement::IncomeStatement, frequency, period1, period2)
    }

    /// Balance sheets for every symbol.
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for [`Frequency::Trailing`], otherwise the
    /// first member error.
    pub fn balance_sheet(
        &self,
        frequency: Frequency,
        period1: Option<i64>,
        period2: Option<i64>,
    ) -> Result<Vec<Vec<Value>>, YfError> {
        self.statement(Statement::BalanceSheet, frequency, period1, period2)
    }

    /// Cash flow statements for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub fn cash_flow(
        &self,
        frequency: Frequency,
        period1: Option<i64>,
        period2: Option<i64>,
    ) -> Result<Vec<Vec<Value>>, YfError> {
        self.statement(Statement::CashFlow, frequency, period1, period2)
    }

    /// Any statement for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub fn statement(
        &self,
        statement: Statement,
        frequency: Frequency,
        period1: Option<i64>,
        period2: Option<i64>,
    ) -> Result<Vec<Vec<Value>>, YfError> {
        self.each(|t| t.statement(statement, frequency, period1, period2))
    }

    /// Option chains for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub fn options(&self) -> Result<Vec<Value>, YfError> {
        self.each(Ticker::options)
    }

    /// Search results for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub fn search(&self) -> Result<Vec<Value>, YfError> {
        self.each(Ticker::search)
    }

    /// Similar symbols for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub fn recommendations(&self) -> Result<Vec<Value>, YfError> {
        self.each(Ticker::recommendations)
    }

    /// Insights for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub fn insights(&self) -> Result<Vec<Value>, YfError> {
        self.each(Ticker::insights)
    }

    /// Ratings for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub fn ratings(&self) -> Result<Vec<Value>, YfError> {
        self.each(Ticker::ratings)
    }
}

macro_rules! blocking_fan_out_summary_accessors {
    ($( $name:ident => $module:ident ),* $(,)?) => {
        impl Tickers {
            $(
                #[doc = concat!(
                    "The [`QuoteSummaryModule::",
                    stringify!($module),
                    "`] module for every symbol."
                )]
                ///
                /// # Errors
                ///
                /// Fails with the first member error.
                pub fn $name(&self) -> Result<Vec<Value>, YfError> {
                    self.quote_summary_module(QuoteSummaryModule::$module)
                }
            )*
        }
    };
}
summary_accessors!(blocking_fan_out_summary_accessors);
