use std::collections::BTreeSet;
use std::num::NonZeroUsize;

use chrono::{Days, NaiveDate};
use indexmap::IndexMap;
use portfolio_dashboard::indicators::{compute_moving_averages, simple_moving_average};
use portfolio_dashboard::normalize::{normalize, normalize_series};
use portfolio_dashboard::rank::rank;
use portfolio_dashboard::series::{PriceBar, Series};
use portfolio_dashboard::window::{TrailingMonths, filter_series, trailing_cutoff};
use proptest::prelude::*;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
}

fn series_from(ticker: &str, closes: &[f64]) -> Series {
    let bars = base()
        .iter_days()
        .zip(closes)
        .map(|(d, c)| PriceBar::from_close(d, *c))
        .collect();
    Series::new(ticker, bars)
}

fn close_enough(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #[test]
    fn sma_matches_its_definition(
        closes in proptest::collection::vec(1.0f64..1_000.0, 1..120),
        window in 1usize..30,
    ) {
        let values: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
        let sma = simple_moving_average(&values, window);
        prop_assert_eq!(sma.len(), closes.len());
        for (i, v) in sma.iter().enumerate() {
            if i + 1 < window {
                prop_assert!(v.is_none());
            } else {
                let expected = closes[i + 1 - window..=i].iter().sum::<f64>() / window as f64;
                prop_assert!(close_enough(v.unwrap(), expected));
            }
        }
    }

    #[test]
    fn indicator_set_keeps_every_bar(
        closes in proptest::collection::vec(1.0f64..1_000.0, 0..80),
        windows in proptest::collection::vec(1usize..40, 1..5),
    ) {
        let windows: Vec<NonZeroUsize> = windows.into_iter().filter_map(NonZeroUsize::new).collect();
        let set = compute_moving_averages(&series_from("X", &closes), &windows);
        prop_assert_eq!(set.rows.len(), closes.len());
        prop_assert!(set.rows.iter().all(|r| r.values.len() == set.windows.len()));
    }

    #[test]
    fn trailing_filter_is_the_suffix_from_cutoff(
        offsets in proptest::collection::btree_set(0u64..800, 0..120),
        months in 1u32..=12,
        anchor_offset in 0u64..900,
    ) {
        let dates: BTreeSet<NaiveDate> = offsets
            .iter()
            .map(|o| base().checked_add_days(Days::new(*o)).unwrap())
            .collect();
        let bars: Vec<PriceBar> = dates.iter().map(|d| PriceBar::from_close(*d, 1.0)).collect();
        let series = Series::new("X", bars);
        let anchor = base().checked_add_days(Days::new(anchor_offset)).unwrap();
        let months = TrailingMonths::new(months).unwrap();
        let cutoff = trailing_cutoff(anchor, months);

        let kept = filter_series(&series, months, anchor);
        prop_assert!(kept.bars().iter().all(|b| b.date >= cutoff));
        let expected: Vec<NaiveDate> = dates.iter().copied().filter(|d| *d >= cutoff).collect();
        let actual: Vec<NaiveDate> = kept.bars().iter().map(|b| b.date).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn normalization_starts_at_one_and_ignores_scale(
        closes in proptest::collection::vec(0.01f64..10_000.0, 1..60),
        scale in 0.001f64..1_000.0,
    ) {
        let scaled: Vec<f64> = closes.iter().map(|c| c * scale).collect();
        let a = normalize_series(&series_from("A", &closes)).unwrap();
        let b = normalize_series(&series_from("B", &scaled)).unwrap();

        prop_assert_eq!(a.points[0].value, Some(1.0));
        prop_assert_eq!(b.points[0].value, Some(1.0));
        for (pa, pb) in a.points.iter().zip(&b.points) {
            prop_assert!(close_enough(pa.value.unwrap(), pb.value.unwrap()));
        }
    }

    #[test]
    fn distinct_finals_never_share_best_and_worst(
        first in 1.0f64..100.0,
        last_a in 1.0f64..100.0,
        last_b in 1.0f64..100.0,
    ) {
        let input = [
            series_from("AAA", &[first, last_a]),
            series_from("BBB", &[first, last_b]),
        ];
        let normalized = normalize(&input);
        let finals: IndexMap<&str, f64> = normalized
            .series
            .iter()
            .map(|(t, s)| (t.as_str(), s.final_value().unwrap()))
            .collect();
        let ranking = rank(&normalized.series).unwrap();

        if finals["AAA"] != finals["BBB"] {
            prop_assert_ne!(&ranking.best.ticker, &ranking.worst.ticker);
        }
        prop_assert!(ranking.best.final_value >= ranking.worst.final_value);
    }
}
