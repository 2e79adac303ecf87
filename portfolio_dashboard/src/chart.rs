//! Rows shaped for the chart renderer.
//!
//! Two shapes are produced:
//! - tidy rows (`date`, `series`, `value`), one per defined value, for line
//!   charts of normalized peers and of moving averages;
//! - candle rows, one per trading day, carrying OHLC plus every indicator as
//!   a flat named column.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::indicators::{self, IndicatorSet};
use crate::normalize::NormalizedSeries;

/// One point of one line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub date: NaiveDate,
    pub series: String,
    pub value: f64,
}

/// Anything that can be flattened into tidy rows.
pub trait Renderable {
    /// Appends this item's rows to `out`, grouped by series and ordered by
    /// date. Undefined values are skipped.
    fn append_rows(&self, out: &mut Vec<ChartRow>);
}

impl Renderable for NormalizedSeries {
    fn append_rows(&self, out: &mut Vec<ChartRow>) {
        out.extend(self.points.iter().filter_map(|p| {
            Some(ChartRow {
                date: p.date,
                series: self.ticker.clone(),
                value: p.value?,
            })
        }));
    }
}

impl Renderable for IndicatorSet {
    fn append_rows(&self, out: &mut Vec<ChartRow>) {
        for (idx, window) in self.windows.iter().enumerate() {
            let name = indicators::column_name(*window);
            out.extend(self.rows.iter().filter_map(|row| {
                Some(ChartRow {
                    date: row.bar.date,
                    series: name.clone(),
                    value: row.values[idx]?,
                })
            }));
        }
    }
}

/// Tidy rows for a set of normalized series.
pub fn to_renderable_rows<R: Renderable>(items: &[R]) -> Vec<ChartRow> {
    let mut out = Vec::new();
    for item in items {
        item.append_rows(&mut out);
    }
    out
}

/// Tidy rows for the moving averages of one set.
pub fn indicator_rows(set: &IndicatorSet) -> Vec<ChartRow> {
    let mut out = Vec::with_capacity(set.rows.len() * set.windows.len());
    set.append_rows(&mut out);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: Option<f64>,
    /// `None` when the close is missing.
    pub direction: Option<Direction>,
    #[serde(flatten)]
    pub indicators: IndexMap<String, Option<f64>>,
}

/// One candle per trading day, with each moving average as a named column.
pub fn candle_rows(set: &IndicatorSet) -> Vec<CandleRow> {
    let names = set.column_names();
    set.rows
        .iter()
        .map(|row| {
            let bar = &row.bar;
            let direction = bar.close.map(|close| {
                if bar.open <= close {
                    Direction::Up
                } else {
                    Direction::Down
                }
            });
            CandleRow {
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                direction,
                indicators: names.iter().cloned().zip(row.values.iter().copied()).collect(),
            }
        })
        .collect()
}
