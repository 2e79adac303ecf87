use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::{
    models::{
        request_params::{BarsRequestParams, ProviderParams},
        timeframe::{TimeFrame, TimeFrameUnit},
    },
    providers::{ProviderError, ValidationSnafu},
};

/// Specifies the corporate action adjustment for stock data.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    #[default]
    Raw,
    Split,
    Dividend,
    All,
}

/// Specifies the source feed for stock data.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    #[default]
    Sip,
    Iex,
    Otc,
}

/// Specifies the sort order for the bars.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sort {
    #[default]
    Asc,
    Desc,
}

/// Alpaca-specific parameters for a bars request.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AlpacaBarsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Adjustment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<Feed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
}

/// Largest page Alpaca serves per request.
pub const MAX_PAGE_LIMIT: u32 = 10_000;

/// Checks the timeframe against the amounts Alpaca accepts.
pub fn validate_timeframe(tf: &TimeFrame) -> Result<(), ProviderError> {
    let amount = tf.amount.get();
    let ok = match tf.unit {
        TimeFrameUnit::Minute => (1..=59).contains(&amount),
        TimeFrameUnit::Hour => (1..=23).contains(&amount),
        TimeFrameUnit::Day | TimeFrameUnit::Week => amount == 1,
        TimeFrameUnit::Month => [1, 2, 3, 4, 6, 12].contains(&amount),
    };
    if ok {
        Ok(())
    } else {
        ValidationSnafu {
            message: format!("timeframe {tf} is not supported by Alpaca"),
        }
        .fail()
    }
}

/// Builds the query string for one page of `/v2/stocks/bars`.
pub fn construct_params(params: &BarsRequestParams) -> Vec<(String, String)> {
    let mut query = vec![
        ("symbols".to_string(), params.symbols.join(",")),
        ("timeframe".to_string(), params.timeframe.to_string()),
        (
            "start".to_string(),
            params.start.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        (
            "end".to_string(),
            params.end.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
    ];

    let alpaca = match &params.provider_specific {
        ProviderParams::Alpaca(p) => p.clone(),
        ProviderParams::None => AlpacaBarsParams::default(),
    };

    // The dashboard compares prices across years, so split-adjusted data is
    // the sensible default when the caller did not ask for anything else.
    let adjustment = alpaca.adjustment.unwrap_or(Adjustment::Split);
    query.push(("adjustment".to_string(), as_query_value(&adjustment)));
    if let Some(feed) = alpaca.feed {
        query.push(("feed".to_string(), as_query_value(&feed)));
    }
    if let Some(currency) = alpaca.currency {
        query.push(("currency".to_string(), currency));
    }
    let limit = alpaca.limit.unwrap_or(MAX_PAGE_LIMIT).min(MAX_PAGE_LIMIT);
    query.push(("limit".to_string(), limit.to_string()));
    if let Some(sort) = alpaca.sort {
        query.push(("sort".to_string(), as_query_value(&sort)));
    }
    query
}

fn as_query_value<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default()
}
