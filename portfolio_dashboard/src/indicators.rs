//! Simple moving averages over daily closes.

use std::num::NonZeroUsize;

use chrono::NaiveDate;
use serde::Serialize;

use crate::series::{Dated, PriceBar, Series};
use crate::window::{self, TrailingMonths};

/// A bar with one moving-average value per window of its [`IndicatorSet`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub bar: PriceBar,
    /// Same order as [`IndicatorSet::windows`]. `None` where undefined.
    pub values: Vec<Option<f64>>,
}

impl Dated for IndicatorRow {
    fn date(&self) -> NaiveDate {
        self.bar.date
    }
}

/// A series annotated with moving averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSet {
    pub ticker: String,
    pub windows: Vec<NonZeroUsize>,
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorSet {
    /// `MA_{w}` for every window, in window order.
    pub fn column_names(&self) -> Vec<String> {
        self.windows.iter().map(|w| column_name(*w)).collect()
    }

    /// Values of one window across all rows.
    pub fn column(&self, window: NonZeroUsize) -> Option<Vec<Option<f64>>> {
        let idx = self.windows.iter().position(|w| *w == window)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// Trailing window of the annotated rows. Averages keep the values they
    /// had on the full history.
    pub fn filter_trailing(&self, months: TrailingMonths, anchor: NaiveDate) -> Self {
        Self {
            ticker: self.ticker.clone(),
            windows: self.windows.clone(),
            rows: window::filter_trailing(&self.rows, months, anchor),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn column_name(window: NonZeroUsize) -> String {
    format!("MA_{window}")
}

/// Annotates `series` with a simple moving average per window.
///
/// Duplicate windows are computed once, keeping first-occurrence order.
pub fn compute_moving_averages(series: &Series, windows: &[NonZeroUsize]) -> IndicatorSet {
    let mut unique: Vec<NonZeroUsize> = Vec::with_capacity(windows.len());
    for w in windows {
        if !unique.contains(w) {
            unique.push(*w);
        }
    }

    let closes = series.closes();
    let columns: Vec<Vec<Option<f64>>> = unique
        .iter()
        .map(|w| simple_moving_average(&closes, w.get()))
        .collect();

    let rows = series
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            bar: bar.clone(),
            values: columns.iter().map(|col| col[i]).collect(),
        })
        .collect();

    IndicatorSet {
        ticker: series.ticker().to_string(),
        windows: unique,
        rows,
    }
}

/// Mean of the `window` values ending at each index.
///
/// The first `window - 1` entries are `None`, as is any entry whose window
/// contains a missing value. A window of zero yields all `None`.
pub fn simple_moving_average(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || window > values.len() {
        return out;
    }
    for (i, slot) in out.iter_mut().enumerate().skip(window - 1) {
        let slice = &values[i + 1 - window..=i];
        let sum: Option<f64> = slice.iter().copied().sum();
        *slot = sum.map(|s| s / window as f64);
    }
    out
}
