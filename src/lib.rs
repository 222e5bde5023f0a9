//! yafin: typed client for the undocumented Yahoo Finance API.
//!
//! Three layers, each usable on its own:
//!
//! - [`YfClient`]: one lazily opened HTTP session with cookie/crumb
//!   authentication, retry with exponential backoff, and an LRU result cache.
//!   Every endpoint is a `get_*` method returning raw [`serde_json::Value`].
//! - [`Ticker`]: per-symbol facade that strips Yahoo's response envelopes.
//! - [`Tickers`]: several symbols at once, batched where Yahoo allows it and
//!   fanned out concurrently otherwise.
//!
//! Facades share a single client through a reference-counted
//! [`ClientRegistry`]; the client is closed when the last handle lets go.
//! The [`blocking`] module mirrors all of it for synchronous code.
//!
//! ```no_run
//! # use yafin::{YfClient, CacheMode};
//! # #[tokio::main]
//! # async fn main() -> Result<(), yafin::YfError> {
//! let client = YfClient::default();
//! let quotes = client.get_quote("AAPL,MSFT", None, CacheMode::Use).await?;
//! println!("{}", quotes["quoteResponse"]["result"][0]["regularMarketPrice"]);
//! client.close().await;
//! # Ok(())
//! # }
//! ```

pub mod blocking;
pub mod core;
pub mod registry;
pub mod ticker;
pub mod tickers;

pub use crate::core::{
    Backoff, CacheMode, CalendarModule, ChartEvent, ChartQuery, ClientConfig, Frequency,
    Interval, QueryParams, QueryValue, QuoteSummaryModule, Range, Response, RetryConfig,
    Sleeper, Statement, SystemSleeper, YfClient, YfClientBuilder, YfError,
};
pub use registry::{ClientLease, ClientRegistry};
pub use ticker::Ticker;
pub use tickers::Tickers;
