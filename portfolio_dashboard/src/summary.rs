//! Headline numbers for one series.

use chrono::NaiveDate;
use serde::Serialize;

use crate::series::Series;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub ticker: String,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub last_close: Option<f64>,
    /// `(last / first - 1) * 100` over the closes that are present.
    pub change_percent: Option<f64>,
    /// Sample standard deviation of day-to-day percent changes, in percent.
    pub volatility_percent: Option<f64>,
    /// Saturates at `u64::MAX`.
    pub total_volume: u64,
}

pub fn summarize(series: &Series) -> SeriesSummary {
    let closes: Vec<f64> = series.bars().iter().filter_map(|b| b.close).collect();
    let first = closes.first().copied();
    let last = closes.last().copied();

    let change_percent = match (first, last) {
        (Some(first), Some(last)) if first != 0.0 => Some((last / first - 1.0) * 100.0),
        _ => None,
    };

    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();

    SeriesSummary {
        ticker: series.ticker().to_string(),
        first_date: series.first_date(),
        last_date: series.last_date(),
        last_close: last,
        change_percent,
        volatility_percent: sample_std_dev(&returns).map(|s| s * 100.0),
        total_volume: series
            .bars()
            .iter()
            .map(|b| b.volume)
            .fold(0, u64::saturating_add),
    }
}

fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(var.sqrt())
}
