//! Offline provider backed by a JSON document on disk.
//!
//! The document maps symbols to bars, using the same short field names as the
//! Alpaca bars payload:
//!
//! ```json
//! {
//!   "AAPL": [
//!     {"t": "2024-01-02T05:00:00Z", "o": 187.15, "h": 188.44, "l": 183.89, "c": 185.64, "v": 82488674}
//!   ]
//! }
//! ```
//!
//! `"c": null` is accepted and yields a bar without a close.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use indexmap::IndexMap;
use snafu::IntoError;

use crate::{
    models::{
        bar::{Bar, BarSeries},
        request_params::BarsRequestParams,
    },
    providers::{
        DataFileSnafu, DataProvider, InitSnafu, ProviderError, ProviderInitError,
        alpaca_rest::{params::validate_timeframe, response::AlpacaBar},
    },
};

pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    /// Creates a provider for `path`. The file is read on every fetch so
    /// edits show up without a restart.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<IndexMap<String, Vec<AlpacaBar>>, ProviderInitError> {
        let display = self.path.display().to_string();
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DataFileSnafu {
                path: display.clone(),
                message: e.to_string(),
            }
            .build()
        })?;
        serde_json::from_str(&content).map_err(|e| {
            DataFileSnafu {
                path: display,
                message: e.to_string(),
            }
            .build()
        })
    }
}

#[async_trait]
impl DataProvider for JsonFileProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        validate_timeframe(&params.timeframe)?;

        let mut document = self
            .load()
            .await
            .map_err(|source| InitSnafu.into_error(source))?;

        let mut result = Vec::with_capacity(params.symbols.len());
        for symbol in &params.symbols {
            let Some(raw) = document.shift_remove(symbol) else {
                continue;
            };
            let mut bars: Vec<Bar> = raw
                .into_iter()
                .filter(|b| b.timestamp >= params.start && b.timestamp < params.end)
                .map(Bar::from)
                .collect();
            if bars.is_empty() {
                continue;
            }
            bars.sort_by_key(|b| b.timestamp);
            result.push(BarSeries::new(symbol.clone(), params.timeframe, bars));
        }

        tracing::debug!(
            path = %self.path.display(),
            requested = params.symbols.len(),
            returned = result.len(),
            "loaded bars from file"
        );
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
