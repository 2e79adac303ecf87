//! Error types for the analytics pipeline.
//!
//! Two levels:
//! - [`TickerError`]: something wrong with one ticker. Collected and returned
//!   next to the successful results; the rest of the batch carries on.
//! - [`PipelineError`]: the whole run cannot produce a result.

use std::fmt;

use market_data_ingestor::providers::ProviderError;
use serde::Serialize;
use thiserror::Error;

/// Why a series has no usable normalization base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseFailure {
    /// No bar in the series carries a close.
    MissingClose,
    /// The first close is exactly zero.
    ZeroClose,
}

impl fmt::Display for BaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingClose => f.write_str("no close price in range"),
            Self::ZeroClose => f.write_str("first close is zero"),
        }
    }
}

/// What went wrong for a single ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TickerErrorKind {
    /// The source returned no rows for the ticker.
    #[error("no data returned by the source")]
    DataUnavailable,

    /// The ticker cannot be rescaled, so it is left out of the comparison.
    #[error("invalid normalization base: {reason}")]
    InvalidNormalizationBase {
        /// The specific reason.
        reason: BaseFailure,
    },
}

/// A per-ticker failure, reported alongside successful results.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{ticker}: {kind}")]
pub struct TickerError {
    /// Ticker symbol the failure belongs to.
    pub ticker: String,
    /// The failure.
    #[serde(flatten)]
    pub kind: TickerErrorKind,
}

impl TickerError {
    pub fn data_unavailable(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            kind: TickerErrorKind::DataUnavailable,
        }
    }

    pub fn invalid_base(ticker: impl Into<String>, reason: BaseFailure) -> Self {
        Self {
            ticker: ticker.into(),
            kind: TickerErrorKind::InvalidNormalizationBase { reason },
        }
    }
}

/// Failures that abort a whole pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The source throttled us. Nothing from this attempt may be shown.
    #[error("rate limited by the data provider, retry later: {message}")]
    RateLimited {
        /// Provider message.
        message: String,
        /// Seconds to wait, when known.
        retry_after: Option<u64>,
    },

    /// No ticker was selected, or none survived to the ranking step.
    #[error("no valid tickers to compare, select at least one ticker with data")]
    EmptySelection,

    /// Trailing window outside 1..=12 months.
    #[error("trailing window must be between 1 and 12 months, got {months}")]
    InvalidMonths {
        /// The rejected value.
        months: u32,
    },

    /// The selection input could not be parsed.
    #[error("invalid selection: {message}")]
    InvalidSelection {
        /// What was wrong.
        message: String,
    },

    /// The provider did not answer within the configured time.
    #[error("data fetch did not finish within {secs}s")]
    FetchTimeout {
        /// Configured limit.
        secs: u64,
    },

    /// Any other provider failure.
    #[error("data provider failed: {source}")]
    Provider {
        /// Underlying provider error.
        source: ProviderError,
    },
}

impl From<ProviderError> for PipelineError {
    fn from(source: ProviderError) -> Self {
        match source {
            ProviderError::RateLimited {
                message,
                retry_after,
                ..
            } => Self::RateLimited {
                message,
                retry_after,
            },
            source => Self::Provider { source },
        }
    }
}

impl PipelineError {
    /// Whether the caller should retry later instead of changing its input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::FetchTimeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use market_data_ingestor::providers::{RateLimitedSnafu, ValidationSnafu};

    use super::*;

    #[test]
    fn provider_rate_limit_maps_to_rate_limited() {
        let err: PipelineError = RateLimitedSnafu {
            message: "slow down",
            retry_after: Some(12u64),
        }
        .build()
        .into();
        assert!(matches!(
            err,
            PipelineError::RateLimited { retry_after: Some(12), .. }
        ));
        assert!(err.is_retryable());
        assert!(err.to_string().contains("retry later"));
    }

    #[test]
    fn other_provider_errors_are_wrapped() {
        let err: PipelineError = ValidationSnafu { message: "bad" }.build().into();
        assert!(matches!(err, PipelineError::Provider { .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn ticker_error_serializes_flat() {
        let err = TickerError::invalid_base("XYZ", BaseFailure::ZeroClose);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "ticker": "XYZ",
                "kind": "invalid_normalization_base",
                "reason": "zero_close"
            })
        );
        assert_eq!(
            err.to_string(),
            "XYZ: invalid normalization base: first close is zero"
        );
    }
}
