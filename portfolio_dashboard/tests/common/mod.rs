#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use indexmap::IndexMap;
use market_data_ingestor::models::bar::{Bar, BarSeries};
use market_data_ingestor::models::request_params::BarsRequestParams;
use market_data_ingestor::providers::{DataProvider, ProviderError, RateLimitedSnafu};
use portfolio_dashboard::config::DashboardConfig;
use portfolio_dashboard::pipeline::Dashboard;

/// In-memory provider. Symbols it does not know are left out of the
/// response, like a real source with partial data.
pub struct StaticProvider {
    bars: IndexMap<String, Vec<Bar>>,
    throttled: bool,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self {
            bars: IndexMap::new(),
            throttled: false,
        }
    }

    pub fn throttled() -> Self {
        Self {
            bars: IndexMap::new(),
            throttled: true,
        }
    }

    pub fn with(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }
}

#[async_trait]
impl DataProvider for StaticProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Vec<BarSeries>, ProviderError> {
        if self.throttled {
            return RateLimitedSnafu {
                message: "429 Too Many Requests",
                retry_after: Some(60u64),
            }
            .fail();
        }
        Ok(params
            .symbols
            .iter()
            .filter_map(|s| {
                let bars: Vec<Bar> = self
                    .bars
                    .get(s)?
                    .iter()
                    .filter(|b| b.timestamp >= params.start && b.timestamp < params.end)
                    .cloned()
                    .collect();
                Some(BarSeries::new(s.clone(), params.timeframe, bars))
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One bar per calendar day from `start`, stamped mid-session in New York.
/// `None` becomes a NaN close.
pub fn daily_bars(start: NaiveDate, closes: &[Option<f64>]) -> Vec<Bar> {
    let session = NaiveTime::from_hms_opt(16, 0, 0).unwrap();
    start
        .iter_days()
        .zip(closes)
        .map(|(day, close)| {
            let c = close.unwrap_or(f64::NAN);
            Bar {
                timestamp: day.and_time(session).and_utc(),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1_000.0,
                trade_count: None,
                vwap: None,
            }
        })
        .collect()
}

/// Like [`daily_bars`], stamped at local midnight in `tz`. Zones east of
/// UTC put these on the previous UTC day.
pub fn local_midnight_bars(tz: Tz, start: NaiveDate, closes: &[Option<f64>]) -> Vec<Bar> {
    daily_bars(start, closes)
        .into_iter()
        .zip(start.iter_days())
        .map(|(bar, day)| Bar {
            timestamp: tz
                .from_local_datetime(&day.and_time(NaiveTime::MIN))
                .unwrap()
                .with_timezone(&Utc),
            ..bar
        })
        .collect()
}

pub fn closes(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}

/// `n` daily closes rising by one from `first`.
pub fn ramp(first: f64, n: usize) -> Vec<Option<f64>> {
    (0..n).map(|i| Some(first + i as f64)).collect()
}

pub fn dashboard(provider: StaticProvider) -> Dashboard {
    dashboard_with(provider, DashboardConfig::default())
}

pub fn dashboard_with(provider: StaticProvider, config: DashboardConfig) -> Dashboard {
    Dashboard::new(Box::new(provider), config)
}
