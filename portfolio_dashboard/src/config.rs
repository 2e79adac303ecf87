//! Dashboard settings.
//!
//! Loaded from TOML through [`shared_utils::config`]. Every field has a
//! default, so an empty file (or none at all) gives a working setup:
//!
//! ```toml
//! timezone = "America/New_York"
//! moving_average_windows = [5, 20, 40, 60]
//! default_months = 4
//! index_history = "1y"
//! fetch_timeout_secs = 30
//!
//! [[indices]]
//! symbol = "^GSPC"
//! title = "S&P 500 Index"
//!
//! [peers]
//! default_tickers = "AAPL,MSFT,NVDA"
//! default_horizon = "6mo"
//!
//! [provider]
//! kind = "file"
//! path = "bars.json"
//! ```

use std::num::{NonZeroU32, NonZeroUsize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use market_data_ingestor::models::asset::AssetClass;
use serde::{Deserialize, Serialize};
use shared_utils::config::{ConfigError, read_toml, read_toml_or_default};

use crate::fetch::FetchOptions;
use crate::horizon::Horizon;
use crate::window::TrailingMonths;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Exchange time zone used to assign bars to trading days.
    pub timezone: Tz,
    pub moving_average_windows: Vec<NonZeroUsize>,
    /// Trailing months shown on index charts when none is given.
    pub default_months: u32,
    /// History fetched for index charts. Longer than the visible window so
    /// the first visible points already have averages.
    pub index_history: Horizon,
    pub indices: Vec<IndexCfg>,
    pub peers: PeersCfg,
    pub fetch_timeout_secs: u64,
    pub provider: ProviderCfg,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexCfg {
    pub symbol: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PeersCfg {
    /// Comma-joined tickers used when the caller gives none.
    pub default_tickers: String,
    pub default_horizon: Horizon,
}

/// Which data source backs the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderCfg {
    /// Alpaca market data API; keys come from the environment.
    Alpaca {
        #[serde(default)]
        requests_per_minute: Option<NonZeroU32>,
    },
    /// JSON file of bars keyed by symbol.
    File { path: PathBuf },
}

impl Default for ProviderCfg {
    fn default() -> Self {
        Self::Alpaca {
            requests_per_minute: None,
        }
    }
}

impl Default for PeersCfg {
    fn default() -> Self {
        Self {
            default_tickers: "AAPL,MSFT,NVDA,GOOGL,AMZN".to_string(),
            default_horizon: Horizon::OneYear,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::New_York,
            moving_average_windows: [5, 20, 40, 60]
                .into_iter()
                .filter_map(NonZeroUsize::new)
                .collect(),
            default_months: 4,
            index_history: Horizon::OneYear,
            indices: vec![
                IndexCfg {
                    symbol: "^IXIC".to_string(),
                    title: "NASDAQ Index".to_string(),
                },
                IndexCfg {
                    symbol: "^GSPC".to_string(),
                    title: "S&P 500 Index".to_string(),
                },
            ],
            peers: PeersCfg::default(),
            fetch_timeout_secs: 30,
            provider: ProviderCfg::default(),
        }
    }
}

impl DashboardConfig {
    /// Reads and validates the file at `path`, which must exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = read_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`Self::load`], but a missing file means defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = read_toml_or_default(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if TrailingMonths::new(self.default_months).is_err() {
            return Err(ConfigError::Invalid(format!(
                "default_months must be between {} and {}, got {}",
                TrailingMonths::MIN,
                TrailingMonths::MAX,
                self.default_months
            )));
        }
        if self.moving_average_windows.is_empty() {
            return Err(ConfigError::Invalid(
                "moving_average_windows must not be empty".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch_timeout_secs must be positive".to_string(),
            ));
        }
        if let Some(index) = self.indices.iter().find(|i| i.symbol.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "index '{}' has an empty symbol",
                index.title
            )));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn fetch_options(&self, asset_class: AssetClass) -> FetchOptions {
        FetchOptions {
            tz: self.timezone,
            timeout: self.fetch_timeout(),
            asset_class,
        }
    }
}
