use futures::future::try_join_all;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::core::endpoints::symbol_list;
use crate::core::{
    CacheMode, ChartQuery, Frequency, QuoteSummaryModule, Statement, YfClient, YfError,
};
use crate::registry::{ClientLease, ClientRegistry};
use crate::ticker::Ticker;
use crate::ticker::envelope::{self, summary_accessors};

/// Several symbols queried together.
///
/// `quote` and `quote_type` go out as a single batched request. Every other
/// operation runs concurrently on one [`Ticker`] per symbol and returns the
/// results in the order the symbols were given. The first failure fails the
/// whole call.
///
/// ```no_run
/// # use yafin::Tickers;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut tickers = Tickers::new("AAPL, MSFT, NVDA")?;
/// for q in tickers.quote(None).await? {
///     println!("{}: {}", q["symbol"], q["regularMarketPrice"]);
/// }
/// tickers.close().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Tickers {
    symbols: String,
    registry: ClientRegistry,
    lease: OnceCell<ClientLease>,
    members: Vec<Ticker>,
    cache_mode: CacheMode,
}

impl Tickers {
    /// Comma-separated symbols, backed by [`ClientRegistry::global`].
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
            lease: OnceCell::new(),
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
    pub async fn close(&mut self) {
        if let Some(lease) = self.lease.take() {
            lease.release().await;
        }
        for t in &mut self.members {
            t.close().await;
        }
    }

    async fn client(&self) -> &YfClient {
        self.lease.get_or_init(|| self.registry.acquire()).await
    }

    /* ---------------- Batched ---------------- */

    /// Quotes for every symbol, in one request. Unknown symbols are simply
    /// absent from the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[tracing::instrument(skip(self), err, fields(symbols = %self.symbols))]
    pub async fn quote(&self, include_pre_post: Option<bool>) -> Result<Vec<Value>, YfError> {
        let body = self
            .client()
            .await
            .get_quote(&self.symbols, include_pre_post, self.cache_mode)
            .await?;
        envelope::take_list(body, envelope::QUOTES)
    }

    /// Quote types for every symbol, in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[tracing::instrument(skip(self), err, fields(symbols = %self.symbols))]
    pub async fn quote_type(&self) -> Result<Vec<Value>, YfError> {
        let body = self
            .client()
            .await
            .get_quote_type(&self.symbols, self.cache_mode)
            .await?;
        envelope::take_list(body, envelope::QUOTE_TYPES)
    }

    /* ---------------- Fan-out ---------------- */

    /// Chart for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub async fn chart(&self, query: &ChartQuery) -> Result<Vec<Value>, YfError> {
        try_join_all(self.members.iter().map(|t| t.chart(query))).await
    }

    /// `quoteSummary` for every symbol; all modules when `modules` is empty.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub async fn quote_summary(
        &self,
        modules: &[QuoteSummaryModule],
    ) -> Result<Vec<Value>, YfError> {
        try_join_all(self.members.iter().map(|t| t.quote_summary(modules))).await
    }

    /// One `quoteSummary` module for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub async fn quote_summary_module(
        &self,
        module: QuoteSummaryModule,
    ) -> Result<Vec<Value>, YfError> {
        try_join_all(self.members.iter().map(|t| t.quote_summary_module(module))).await
    }

    /// Income statements for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub async fn income_statement(
        &self,
        frequency: Frequency,
        period1: Option<i64>,
        period2: Option<i64>,
    ) -> Result<Vec<Vec<Value>>, YfError> {
        self.statement(Statement::IncomeStatement, frequency, period1, period2)
            .await
    }

    /// Balance sheets for every symbol.
    ///
    /// # Errors
    ///
    /// [`YfError::InvalidParams`] for [`Frequency::Trailing`], otherwise the
    /// first member error.
    pub async fn balance_sheet(
        &self,
        frequency: Frequency,
        period1: Option<i64>,
        period2: Option<i64>,
    ) -> Result<Vec<Vec<Value>>, YfError> {
        self.statement(Statement::BalanceSheet, frequency, period1, period2)
            .await
    }

    /// Cash flow statements for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub async fn cash_flow(
        &self,
        frequency: Frequency,
        period1: Option<i64>,
        period2: Option<i64>,
    ) -> Result<Vec<Vec<Value>>, YfError> {
        self.statement(Statement::CashFlow, frequency, period1, period2)
            .await
    }

    /// Any statement for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub async fn statement(
        &self,
        statement: Statement,
        frequency: Frequency,
        period1: Option<i64>,
        period2: Option<i64>,
    ) -> Result<Vec<Vec<Value>>, YfError> {
        try_join_all(
            self.members
                .iter()
                .map(|t| t.statement(statement, frequency, period1, period2)),
        )
        .await
    }

    /// Option chains for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub async fn options(&self) -> Result<Vec<Value>, YfError> {
        try_join_all(self.members.iter().map(Ticker::options)).await
    }

    /// Search results for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub async fn search(&self) -> Result<Vec<Value>, YfError> {
        try_join_all(self.members.iter().map(Ticker::search)).await
    }

    /// Similar symbols for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub async fn recommendations(&self) -> Result<Vec<Value>, YfError> {
        try_join_all(self.members.iter().map(Ticker::recommendations)).await
    }

    /// Insights for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub async fn insights(&self) -> Result<Vec<Value>, YfError> {
        try_join_all(self.members.iter().map(Ticker::insights)).await
    }

    /// Ratings for every symbol.
    ///
    /// # Errors
    ///
    /// Fails with the first member error.
    pub async fn ratings(&self) -> Result<Vec<Value>, YfError> {
        try_join_all(self.members.iter().map(Ticker::ratings)).await
    }
}

macro_rules! fan_out_summary_accessors {
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
                pub async fn $name(&self) -> Result<Vec<Value>, YfError> {
                    self.quote_summary_module(QuoteSummaryModule::$module).await
                }
            )*
        }
    };
}
summary_accessors!(fan_out_summary_accessors);
