//! Trailing date windows.

use chrono::{Months, NaiveDate};
use serde::Serialize;

use crate::error::PipelineError;
use crate::series::{Dated, Series};

/// Number of trailing calendar months to keep, always in `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TrailingMonths(u32);

impl TrailingMonths {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 12;

    pub fn new(months: u32) -> Result<Self, PipelineError> {
        if (Self::MIN..=Self::MAX).contains(&months) {
            Ok(Self(months))
        } else {
            Err(PipelineError::InvalidMonths { months })
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for TrailingMonths {
    type Error = PipelineError;

    fn try_from(months: u32) -> Result<Self, Self::Error> {
        Self::new(months)
    }
}

/// `anchor` minus `months` calendar months. A day that does not exist in the
/// target month is clamped to that month's last day, so 2024-03-31 minus one
/// month is 2024-02-29.
pub fn subtract_months(anchor: NaiveDate, months: u32) -> NaiveDate {
    anchor
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

/// First date kept by a trailing window ending at `anchor`.
pub fn trailing_cutoff(anchor: NaiveDate, months: TrailingMonths) -> NaiveDate {
    subtract_months(anchor, months.get())
}

/// Keeps every item dated on or after `cutoff`, in input order.
pub fn filter_since<T: Dated + Clone>(items: &[T], cutoff: NaiveDate) -> Vec<T> {
    items
        .iter()
        .filter(|item| item.date() >= cutoff)
        .cloned()
        .collect()
}

/// Keeps the trailing `months` before `anchor`. Items after the anchor are
/// not dropped; the fetch never asks for them.
pub fn filter_trailing<T: Dated + Clone>(
    items: &[T],
    months: TrailingMonths,
    anchor: NaiveDate,
) -> Vec<T> {
    filter_since(items, trailing_cutoff(anchor, months))
}

/// [`filter_since`] over a whole series.
pub fn filter_series_since(series: &Series, cutoff: NaiveDate) -> Series {
    Series::from_ordered(series.ticker(), filter_since(series.bars(), cutoff))
}

/// [`filter_trailing`] over a whole series.
pub fn filter_series(series: &Series, months: TrailingMonths, anchor: NaiveDate) -> Series {
    filter_series_since(series, trailing_cutoff(anchor, months))
}
