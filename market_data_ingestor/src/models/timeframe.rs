//! Bar interval (amount × unit).

use std::{fmt, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeFrameError {
    #[error("Invalid amount for {unit:?}: {message}")]
    InvalidAmount {
        unit: TimeFrameUnit,
        message: String,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFrameUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

/// A timeframe = amount × unit (e.g., 5-Minute, 1-Day, 6-Month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFrame {
    pub amount: NonZeroU32,
    pub unit: TimeFrameUnit,
}

impl TimeFrame {
    pub const fn new(amount: NonZeroU32, unit: TimeFrameUnit) -> Self {
        Self { amount, unit }
    }

    /// One trading day, the only interval the dashboard asks for.
    pub const fn day() -> Self {
        Self::new(NonZeroU32::MIN, TimeFrameUnit::Day)
    }
}

/// `"5Min"`, `"1Hour"`, `"1Day"`, `"1Week"`, `"3Month"`.
impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            TimeFrameUnit::Minute => "Min",
            TimeFrameUnit::Hour => "Hour",
            TimeFrameUnit::Day => "Day",
            TimeFrameUnit::Week => "Week",
            TimeFrameUnit::Month => "Month",
        };
        write!(f, "{}{unit}", self.amount)
    }
}

impl FromStr for TimeFrame {
    type Err = TimeFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| TimeFrameError::InvalidInput {
                message: format!("missing unit in {s:?}"),
            })?;
        let (digits, unit) = s.split_at(split);
        let amount: u32 = digits.parse().map_err(|_| TimeFrameError::InvalidInput {
            message: format!("missing amount in {s:?}"),
        })?;
        let unit = match unit.to_ascii_lowercase().as_str() {
            "m" | "min" | "minute" => TimeFrameUnit::Minute,
            "h" | "hour" => TimeFrameUnit::Hour,
            "d" | "day" => TimeFrameUnit::Day,
            "w" | "week" => TimeFrameUnit::Week,
            "mo" | "month" => TimeFrameUnit::Month,
            other => {
                return Err(TimeFrameError::InvalidInput {
                    message: format!("unknown unit: {other}"),
                });
            }
        };
        let amount = NonZeroU32::new(amount).ok_or_else(|| TimeFrameError::InvalidAmount {
            unit,
            message: "amount must be > 0".into(),
        })?;
        Ok(Self::new(amount, unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_vendor_format() {
        assert_eq!(TimeFrame::day().to_string(), "1Day");
        let five_min = TimeFrame::new(NonZeroU32::new(5).unwrap(), TimeFrameUnit::Minute);
        assert_eq!(five_min.to_string(), "5Min");
    }

    #[test]
    fn parse_accepts_short_and_long_units() {
        assert_eq!("1d".parse::<TimeFrame>().unwrap(), TimeFrame::day());
        assert_eq!("1Day".parse::<TimeFrame>().unwrap(), TimeFrame::day());
        let tf: TimeFrame = "3Month".parse().unwrap();
        assert_eq!(tf.amount.get(), 3);
        assert_eq!(tf.unit, TimeFrameUnit::Month);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!(
            "0d".parse::<TimeFrame>(),
            Err(TimeFrameError::InvalidAmount { unit: TimeFrameUnit::Day, .. })
        ));
        assert!("15".parse::<TimeFrame>().is_err());
        assert!("Day".parse::<TimeFrame>().is_err());
        assert!("2fortnight".parse::<TimeFrame>().is_err());
    }
}
