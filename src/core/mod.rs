//! Core components of the `yafin` client.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The async [`YfClient`], its builder and [`ClientConfig`].
//! - The primary [`YfError`] type.
//! - Request parameters, responses and the result cache.

/// The async client (`YfClient`), builder, configuration and retry policy.
pub mod client;
/// The primary error type (`YfError`) for the crate.
pub mod error;
/// Typed request parameters (intervals, ranges, modules, ...).
pub mod models;
/// Fundamentals timeseries field catalogue.
pub mod timeseries;

pub(crate) mod cache;
pub(crate) mod endpoints;
pub(crate) mod params;
pub(crate) mod response;

// convenient re-exports so most code can just `use crate::core::YfClient`
pub use cache::CacheMode;
pub use client::{
    Backoff, ClientConfig, RetryConfig, Sleeper, SystemSleeper, YfClient, YfClientBuilder,
};
pub use endpoints::ChartQuery;
pub use error::YfError;
pub use models::{
    CalendarModule, ChartEvent, Frequency, Interval, QuoteSummaryModule, Range, Statement,
};
pub use params::{CRUMB_PARAM, QueryParams, QueryValue};
pub use response::Response;
