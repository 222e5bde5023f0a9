//! Blocking API.
//!
//! Mirrors the async client, registry and facades for synchronous code. It
//! shares configuration ([`crate::YfClientBuilder::build_blocking`]), endpoint
//! builders, retry policy and caching with the async side; requests block the
//! calling thread and the registry is guarded by a thread lock.
//!
//! These types must not be used from within an async runtime.
//!
//! ```no_run
//! use yafin::blocking::Ticker;
//!
//! let mut t = Ticker::new("AAPL");
//! let price = t.price()?;
//! println!("{}", price["regularMarketPrice"]);
//! t.close();
//! # Ok::<(), yafin::YfError>(())
//! ```

mod client;
mod registry;
mod ticker;
mod tickers;

pub use client::{SessionGuard, YfClient};
pub use registry::{ClientLease, ClientRegistry};
pub use ticker::Ticker;
pub use tickers::Tickers;
