//! Comparison horizons and the peer selection input.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::PipelineError;
use crate::window;

/// How far back a peer comparison looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "20y")]
    TwentyYears,
}

impl Horizon {
    pub const ALL: [Horizon; 7] = [
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
        Self::FiveYears,
        Self::TenYears,
        Self::TwentyYears,
    ];

    pub fn months(self) -> u32 {
        match self {
            Self::OneMonth => 1,
            Self::ThreeMonths => 3,
            Self::SixMonths => 6,
            Self::OneYear => 12,
            Self::FiveYears => 60,
            Self::TenYears => 120,
            Self::TwentyYears => 240,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
            Self::TwentyYears => "20y",
        }
    }

    /// First date covered when the horizon ends at `anchor`.
    pub fn start(self, anchor: NaiveDate) -> NaiveDate {
        window::subtract_months(anchor, self.months())
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown horizon '{0}', expected one of 1mo, 3mo, 6mo, 1y, 5y, 10y, 20y")]
pub struct ParseHorizonError(String);

impl FromStr for Horizon {
    type Err = ParseHorizonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|h| h.label() == wanted)
            .ok_or_else(|| ParseHorizonError(s.to_string()))
    }
}

/// The user's peer basket and horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    tickers: Vec<String>,
    horizon: Horizon,
}

impl Selection {
    /// Normalizes tickers (trimmed, uppercased, de-duplicated, blanks
    /// dropped). Nothing left means [`PipelineError::EmptySelection`].
    pub fn new<I, S>(tickers: I, horizon: Horizon) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for raw in tickers {
            let ticker = raw.as_ref().trim().to_ascii_uppercase();
            if !ticker.is_empty() && !out.contains(&ticker) {
                out.push(ticker);
            }
        }
        if out.is_empty() {
            return Err(PipelineError::EmptySelection);
        }
        Ok(Self {
            tickers: out,
            horizon,
        })
    }

    /// Parses a comma-joined ticker list and a horizon label.
    pub fn parse(tickers: &str, horizon: &str) -> Result<Self, PipelineError> {
        let horizon = horizon
            .parse::<Horizon>()
            .map_err(|e| PipelineError::InvalidSelection {
                message: e.to_string(),
            })?;
        Self::new(tickers.split(','), horizon)
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }
}
