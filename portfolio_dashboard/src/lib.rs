//! Time-series analytics behind the portfolio dashboard.
//!
//! The pipeline turns raw daily bars into chart-ready data:
//!
//! 1. [`fetch`] pulls bars from a [`DataProvider`](market_data_ingestor::providers::DataProvider)
//!    and converts them to [`series::Series`].
//! 2. [`indicators`] adds simple moving averages.
//! 3. [`window`] trims each series to the trailing months of interest.
//! 4. [`normalize`] rescales peers to a common 1.0 start and [`rank`] picks
//!    the best and worst performer.
//! 5. [`chart`] reshapes everything into rows for the renderer.
//!
//! [`pipeline`] wires the steps together. Every step is a pure function of its
//! inputs; only the fetch touches the network.

pub mod chart;
pub mod config;
pub mod error;
pub mod fetch;
pub mod horizon;
pub mod indicators;
pub mod normalize;
pub mod pipeline;
pub mod providers;
pub mod rank;
pub mod series;
pub mod summary;
pub mod window;
