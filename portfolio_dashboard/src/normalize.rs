//! Rescales series to a common starting value of 1.0.

use chrono::NaiveDate;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{BaseFailure, TickerError};
use crate::series::Series;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizedPoint {
    pub date: NaiveDate,
    /// `close / base_close`, `None` where the close is missing.
    pub value: Option<f64>,
}

/// A series divided by its own first close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedSeries {
    pub ticker: String,
    pub base_date: NaiveDate,
    pub base_close: f64,
    /// Starts at `base_date` with a value of exactly 1.0.
    pub points: Vec<NormalizedPoint>,
}

impl NormalizedSeries {
    /// Last defined value.
    pub fn final_value(&self) -> Option<f64> {
        self.points.iter().rev().find_map(|p| p.value)
    }
}

/// Output of [`normalize`]: one entry per usable ticker, in input order,
/// plus the tickers that had to be left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Normalized {
    pub series: IndexMap<String, NormalizedSeries>,
    pub failures: Vec<TickerError>,
}

/// Normalizes one series against its first bar with a close.
///
/// Bars before that one are dropped, so the first point is 1.0.
pub fn normalize_series(series: &Series) -> Result<NormalizedSeries, TickerError> {
    if series.is_empty() {
        return Err(TickerError::data_unavailable(series.ticker()));
    }
    let bars = series.bars();
    let Some((start, base_close)) = bars
        .iter()
        .enumerate()
        .find_map(|(i, b)| b.close.map(|c| (i, c)))
    else {
        return Err(TickerError::invalid_base(
            series.ticker(),
            BaseFailure::MissingClose,
        ));
    };
    let base = &bars[start];
    if base_close == 0.0 {
        return Err(TickerError::invalid_base(
            series.ticker(),
            BaseFailure::ZeroClose,
        ));
    }

    let points = bars[start..]
        .iter()
        .map(|b| NormalizedPoint {
            date: b.date,
            value: b.close.map(|c| c / base_close),
        })
        .collect();

    Ok(NormalizedSeries {
        ticker: series.ticker().to_string(),
        base_date: base.date,
        base_close,
        points,
    })
}

/// Normalizes every series in parallel. One bad ticker never affects the
/// others.
pub fn normalize(series: &[Series]) -> Normalized {
    let results: Vec<Result<NormalizedSeries, TickerError>> =
        series.par_iter().map(normalize_series).collect();

    let mut out = Normalized::default();
    for result in results {
        match result {
            Ok(n) => {
                out.series.insert(n.ticker.clone(), n);
            }
            Err(e) => out.failures.push(e),
        }
    }
    out
}
