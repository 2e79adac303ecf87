//! Best and worst performer of a normalized peer group.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::PipelineError;
use crate::normalize::NormalizedSeries;

/// A ticker and its final normalized value.
#[derive(Debug, Clone, PartialEq)]
pub struct Performer {
    pub ticker: String,
    pub final_value: f64,
}

impl Performer {
    /// Move since the base date in percent; 1.5 is +50%.
    pub fn percent_change(&self) -> f64 {
        (self.final_value - 1.0) * 100.0
    }

    /// [`Self::percent_change`] rounded to two decimals. Values that round
    /// to zero print as `0.00`, never `-0.00`.
    pub fn display_percent(&self) -> String {
        let s = format!("{:.2}", self.percent_change());
        match s.strip_prefix('-') {
            Some(rest) if rest.bytes().all(|b| b == b'0' || b == b'.') => rest.to_string(),
            _ => s,
        }
    }
}

impl Serialize for Performer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Performer", 3)?;
        s.serialize_field("ticker", &self.ticker)?;
        s.serialize_field("final_value", &self.final_value)?;
        s.serialize_field("percent_change", &self.display_percent())?;
        s.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Ranking {
    pub best: Performer,
    pub worst: Performer,
}

/// Orders by value; on equal values the alphabetically smaller ticker
/// compares greater, so `max_by` prefers it for best and `min_by` prefers
/// the larger ticker for worst.
fn by_value_then_ticker(a: &(&str, f64), b: &(&str, f64)) -> Ordering {
    a.1.total_cmp(&b.1).then_with(|| b.0.cmp(a.0))
}

/// Picks the highest and lowest final value.
///
/// Series without any defined value are skipped. Nothing left to rank is
/// [`PipelineError::EmptySelection`].
pub fn rank(normalized: &IndexMap<String, NormalizedSeries>) -> Result<Ranking, PipelineError> {
    let snapshot: Vec<(&str, f64)> = normalized
        .iter()
        .filter_map(|(ticker, series)| Some((ticker.as_str(), series.final_value()?)))
        .filter(|(_, v)| v.is_finite())
        .collect();

    let best = snapshot.iter().max_by(|a, b| by_value_then_ticker(a, b));
    let worst = snapshot.iter().min_by(|a, b| by_value_then_ticker(a, b));

    match (best, worst) {
        (Some(&(best, best_value)), Some(&(worst, worst_value))) => Ok(Ranking {
            best: Performer {
                ticker: best.to_string(),
                final_value: best_value,
            },
            worst: Performer {
                ticker: worst.to_string(),
                final_value: worst_value,
            },
        }),
        _ => Err(PipelineError::EmptySelection),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::normalize::NormalizedPoint;

    fn normalized(entries: &[(&str, f64)]) -> IndexMap<String, NormalizedSeries> {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        entries
            .iter()
            .map(|(ticker, last)| {
                let series = NormalizedSeries {
                    ticker: ticker.to_string(),
                    base_date: date,
                    base_close: 1.0,
                    points: vec![
                        NormalizedPoint {
                            date,
                            value: Some(1.0),
                        },
                        NormalizedPoint {
                            date: date.succ_opt().unwrap(),
                            value: Some(*last),
                        },
                    ],
                };
                (ticker.to_string(), series)
            })
            .collect()
    }

    #[test]
    fn picks_extremes() {
        let ranking = rank(&normalized(&[("AAPL", 1.2), ("MSFT", 0.9), ("NVDA", 3.0)])).unwrap();
        assert_eq!(ranking.best.ticker, "NVDA");
        assert_eq!(ranking.worst.ticker, "MSFT");
        assert_eq!(ranking.best.display_percent(), "200.00");
        assert_eq!(ranking.worst.display_percent(), "-10.00");
    }

    #[test]
    fn tiny_moves_display_as_zero() {
        for final_value in [0.9999999, 1.0, 1.0000001] {
            let p = Performer {
                ticker: "AAPL".to_string(),
                final_value,
            };
            assert_eq!(p.display_percent(), "0.00", "{final_value}");
        }
        let p = Performer {
            ticker: "AAPL".to_string(),
            final_value: 0.9999,
        };
        assert_eq!(p.display_percent(), "-0.01");
    }

    #[test]
    fn ties_are_broken_by_ticker() {
        for order in [[("A", 1.5), ("B", 1.5)], [("B", 1.5), ("A", 1.5)]] {
            let ranking = rank(&normalized(&order)).unwrap();
            assert_eq!(ranking.best.ticker, "A");
            assert_eq!(ranking.worst.ticker, "B");
        }
    }

    #[test]
    fn single_ticker_is_both_best_and_worst() {
        let ranking = rank(&normalized(&[("SOLO", 1.1)])).unwrap();
        assert_eq!(ranking.best, ranking.worst);
    }

    #[test]
    fn nothing_to_rank_is_empty_selection() {
        assert!(matches!(
            rank(&IndexMap::new()),
            Err(PipelineError::EmptySelection)
        ));
    }

    #[test]
    fn performer_serializes_percent() {
        let p = Performer {
            ticker: "NVDA".into(),
            final_value: 1.23456,
        };
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["percent_change"], "23.46");
        assert_eq!(json["ticker"], "NVDA");
    }
}
