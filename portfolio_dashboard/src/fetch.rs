//! Bridge between a [`DataProvider`] and the analytics types.

use std::time::Duration;

use chrono::{Days, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use indexmap::IndexMap;
use market_data_ingestor::models::asset::AssetClass;
use market_data_ingestor::models::request_params::BarsRequestParams;
use market_data_ingestor::providers::DataProvider;
use tracing::{debug, warn};

use crate::error::{PipelineError, TickerError};
use crate::series::Series;

/// How the fetch talks to the provider.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Exchange time zone; decides which trading day a bar belongs to.
    pub tz: Tz,
    pub timeout: Duration,
    pub asset_class: AssetClass,
}

/// Series that came back with rows, in request order, plus tickers that
/// came back empty.
#[derive(Debug, Clone, Default)]
pub struct Fetched {
    pub series: Vec<Series>,
    pub failures: Vec<TickerError>,
}

/// Fetches daily bars for `tickers` between `start` and `anchor`, both
/// inclusive.
///
/// A provider rate limit aborts the whole fetch and anything already
/// received is dropped.
pub async fn fetch_series(
    provider: &(dyn DataProvider + Send + Sync),
    tickers: &[String],
    start: NaiveDate,
    anchor: NaiveDate,
    options: &FetchOptions,
) -> Result<Fetched, PipelineError> {
    // Trading days are local to `options.tz`, which can sit up to a day
    // either side of UTC. Ask for one extra UTC day at each end and trim by
    // local date below.
    let request_start = start.checked_sub_days(Days::new(1)).unwrap_or(start);
    let request_end = anchor.checked_add_days(Days::new(2)).unwrap_or(anchor);
    let mut params = BarsRequestParams::daily(
        tickers.to_vec(),
        request_start.and_time(NaiveTime::MIN).and_utc(),
        request_end.and_time(NaiveTime::MIN).and_utc(),
    );
    params.asset_class = options.asset_class;

    debug!(
        provider = provider.name(),
        tickers = tickers.len(),
        %start,
        %anchor,
        "fetching bars"
    );

    let response = tokio::time::timeout(options.timeout, provider.fetch_bars(params))
        .await
        .map_err(|_| PipelineError::FetchTimeout {
            secs: options.timeout.as_secs(),
        })??;

    let mut by_symbol: IndexMap<String, Series> = response
        .iter()
        .map(|raw| (raw.symbol.clone(), Series::from_bar_series(raw, options.tz)))
        .collect();

    let mut fetched = Fetched::default();
    for ticker in tickers {
        let in_range = by_symbol.shift_remove(ticker).map(|series| {
            let bars = series
                .bars()
                .iter()
                .filter(|b| b.date >= start && b.date <= anchor)
                .cloned()
                .collect();
            Series::new(ticker.clone(), bars)
        });
        match in_range {
            Some(series) if !series.is_empty() => fetched.series.push(series),
            _ => {
                warn!(%ticker, "no data returned by the source");
                fetched.failures.push(TickerError::data_unavailable(ticker.clone()));
            }
        }
    }
    Ok(fetched)
}
