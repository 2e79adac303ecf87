//! Vendor-agnostic retrieval of daily OHLCV bars.
//!
//! [`models`] holds the canonical bar types every provider returns, and
//! [`providers`] holds the [`DataProvider`](providers::DataProvider) trait with
//! its implementations (Alpaca REST and a JSON file source).

pub mod models;
pub mod providers;
