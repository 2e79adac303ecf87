//! Daily price series for one ticker.

use chrono::NaiveDate;
use chrono_tz::Tz;
use market_data_ingestor::models::bar::{Bar, BarSeries};
use serde::Serialize;

/// Anything that sits on a calendar date. Lets the window filter work on
/// plain bars and on indicator rows alike.
pub trait Dated {
    /// Trading day of the item.
    fn date(&self) -> NaiveDate;
}

/// One trading day for one ticker.
///
/// `low <= open, close <= high` holds for well-formed data but is not
/// enforced; nothing downstream relies on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    /// `None` when the source had no close for the day.
    pub close: Option<f64>,
    pub volume: u64,
}

impl PriceBar {
    /// Bar with a close and zero volume; handy for synthetic data.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close: Some(close),
            volume: 0,
        }
    }

    /// Converts a provider bar, assigning it to its trading day in `tz`.
    pub fn from_bar(bar: &Bar, tz: Tz) -> Self {
        Self {
            date: bar.timestamp.with_timezone(&tz).date_naive(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.has_close().then_some(bar.close),
            // `as` saturates, so negative or NaN volume lands on 0.
            volume: bar.volume.round() as u64,
        }
    }
}

impl Dated for PriceBar {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Date-ordered bars for exactly one ticker.
///
/// Dates are strictly increasing. Gaps (weekends, holidays) are expected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl Series {
    /// Builds a series, sorting by date. When a date appears more than once
    /// the last occurrence wins.
    pub fn new(ticker: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self {
            ticker: ticker.into(),
            bars: deduped,
        }
    }

    /// Converts a provider series, mapping timestamps to trading days in `tz`.
    pub fn from_bar_series(source: &BarSeries, tz: Tz) -> Self {
        let bars = source.bars.iter().map(|b| PriceBar::from_bar(b, tz)).collect();
        Self::new(source.symbol.clone(), bars)
    }

    /// Bars are already strictly ordered (e.g. a filtered subsequence).
    pub(crate) fn from_ordered(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        debug_assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
        Self {
            ticker: ticker.into(),
            bars,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Close column, `None` where missing.
    pub fn closes(&self) -> Vec<Option<f64>> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// True when no bar carries a close (including the empty series).
    pub fn has_no_closes(&self) -> bool {
        self.bars.iter().all(|b| b.close.is_none())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use market_data_ingestor::models::timeframe::TimeFrame;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn new_sorts_and_keeps_last_duplicate() {
        let series = Series::new(
            "AAPL",
            vec![
                PriceBar::from_close(day(3), 3.0),
                PriceBar::from_close(day(1), 1.0),
                PriceBar::from_close(day(3), 33.0),
                PriceBar::from_close(day(2), 2.0),
            ],
        );
        let dates: Vec<_> = series.bars().iter().map(|b| b.date).collect();
        assert_eq!(dates, [day(1), day(2), day(3)]);
        assert_eq!(series.bars()[2].close, Some(33.0));
    }

    #[test]
    fn provider_bars_land_on_exchange_trading_day() {
        // 2024-01-03 01:00Z is still Jan 2 in New York.
        let bar = Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 3, 1, 0, 0).unwrap(),
            open: 10.0,
            high: 11.0,
            low: 9.0,
            close: f64::NAN,
            volume: 1234.4,
            trade_count: None,
            vwap: None,
        };
        let source = BarSeries::new("^GSPC", TimeFrame::day(), vec![bar]);
        let series = Series::from_bar_series(&source, chrono_tz::America::New_York);

        assert_eq!(series.ticker(), "^GSPC");
        let converted = &series.bars()[0];
        assert_eq!(converted.date, day(2));
        assert_eq!(converted.close, None);
        assert_eq!(converted.volume, 1234);
        assert!(series.has_no_closes());
    }

    #[test]
    fn inverted_high_low_is_tolerated() {
        let bar = PriceBar {
            date: day(1),
            open: 5.0,
            high: 1.0,
            low: 9.0,
            close: Some(5.0),
            volume: 0,
        };
        let series = Series::new("ODD", vec![bar]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.closes(), [Some(5.0)]);
    }
}
