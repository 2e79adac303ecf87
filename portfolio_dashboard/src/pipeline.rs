//! End-to-end runs: fetch, compute, reshape.
//!
//! The pure halves ([`build_index_view`], [`compare_peers`]) take series that
//! are already in memory. [`Dashboard`] adds the provider fetch in front of
//! them.

use std::num::NonZeroUsize;

use chrono::NaiveDate;
use market_data_ingestor::models::asset::AssetClass;
use market_data_ingestor::providers::DataProvider;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::chart::{self, CandleRow, ChartRow};
use crate::config::DashboardConfig;
use crate::error::{PipelineError, TickerError};
use crate::fetch::fetch_series;
use crate::horizon::{Horizon, Selection};
use crate::indicators::compute_moving_averages;
use crate::normalize::{NormalizedSeries, normalize};
use crate::rank::{Ranking, rank};
use crate::series::Series;
use crate::summary::{SeriesSummary, summarize};
use crate::window::{self, TrailingMonths};

#[derive(Debug, Clone)]
pub struct IndexViewParams {
    pub windows: Vec<NonZeroUsize>,
    pub months: TrailingMonths,
    pub anchor: NaiveDate,
}

/// Candlestick chart of one index with its moving averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexView {
    pub ticker: String,
    pub title: String,
    pub anchor: NaiveDate,
    pub months: TrailingMonths,
    /// Indicator column names present on every candle.
    pub columns: Vec<String>,
    pub candles: Vec<CandleRow>,
    pub indicator_rows: Vec<ChartRow>,
    /// Computed over the visible window only.
    pub summary: SeriesSummary,
}

impl IndexView {
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

/// Averages are computed on the whole of `series` before the trailing
/// window is applied, so the first visible candles are not blank.
pub fn build_index_view(series: &Series, title: &str, params: &IndexViewParams) -> IndexView {
    let full = compute_moving_averages(series, &params.windows);
    let visible = full.filter_trailing(params.months, params.anchor);
    let visible_series = window::filter_series(series, params.months, params.anchor);

    IndexView {
        ticker: series.ticker().to_string(),
        title: title.to_string(),
        anchor: params.anchor,
        months: params.months,
        columns: visible.column_names(),
        candles: chart::candle_rows(&visible),
        indicator_rows: chart::indicator_rows(&visible),
        summary: summarize(&visible_series),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexReport {
    pub views: Vec<IndexView>,
    pub failures: Vec<TickerError>,
}

/// Normalized comparison of a peer basket.
#[derive(Debug, Clone, Serialize)]
pub struct PeerReport {
    pub horizon: Horizon,
    pub anchor: NaiveDate,
    pub start: NaiveDate,
    /// Tickers that made it into the comparison, in selection order.
    pub tickers: Vec<String>,
    pub rows: Vec<ChartRow>,
    pub ranking: Ranking,
    pub summaries: Vec<SeriesSummary>,
    pub failures: Vec<TickerError>,
}

/// Windows each series to the selection's horizon, normalizes and ranks.
///
/// `prior_failures` (typically from the fetch) are carried into the report
/// ahead of failures found here. A selected ticker with no series and no
/// prior failure is reported as [`TickerErrorKind::DataUnavailable`].
///
/// [`TickerErrorKind::DataUnavailable`]: crate::error::TickerErrorKind::DataUnavailable
pub fn compare_peers(
    series: &[Series],
    selection: &Selection,
    anchor: NaiveDate,
    prior_failures: Vec<TickerError>,
) -> Result<PeerReport, PipelineError> {
    let horizon = selection.horizon();
    let start = horizon.start(anchor);

    let mut failures = prior_failures;
    let mut wanted: Vec<&Series> = Vec::with_capacity(selection.tickers().len());
    for ticker in selection.tickers() {
        match series.iter().find(|s| s.ticker() == ticker) {
            Some(s) => wanted.push(s),
            None if failures.iter().any(|f| &f.ticker == ticker) => {}
            None => failures.push(TickerError::data_unavailable(ticker.clone())),
        }
    }
    let windowed: Vec<Series> = wanted
        .par_iter()
        .map(|s| window::filter_series_since(s, start))
        .collect();

    let normalized = normalize(&windowed);
    failures.extend(normalized.failures);
    for failure in &failures {
        warn!(ticker = %failure.ticker, error = %failure.kind, "ticker left out of comparison");
    }

    let ranking = rank(&normalized.series)?;
    info!(
        %horizon,
        best = %ranking.best.ticker,
        best_pct = %ranking.best.display_percent(),
        worst = %ranking.worst.ticker,
        worst_pct = %ranking.worst.display_percent(),
        "peer comparison ready"
    );

    let summaries = windowed
        .par_iter()
        .filter(|s| normalized.series.contains_key(s.ticker()))
        .map(summarize)
        .collect();
    let tickers = normalized.series.keys().cloned().collect();
    let ordered: Vec<NormalizedSeries> = normalized.series.into_values().collect();

    Ok(PeerReport {
        horizon,
        anchor,
        start,
        tickers,
        rows: chart::to_renderable_rows(&ordered),
        ranking,
        summaries,
        failures,
    })
}

/// A configured data source plus the settings to run it with.
pub struct Dashboard {
    provider: Box<dyn DataProvider + Send + Sync>,
    config: DashboardConfig,
}

impl Dashboard {
    pub fn new(provider: Box<dyn DataProvider + Send + Sync>, config: DashboardConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Index charts for every configured index, or only `only` when given.
    ///
    /// `months` falls back to the configured default. An index with no
    /// candles inside the visible window is reported as a failure.
    pub async fn index_views(
        &self,
        months: Option<u32>,
        anchor: NaiveDate,
        only: Option<&str>,
    ) -> Result<IndexReport, PipelineError> {
        let months = TrailingMonths::new(months.unwrap_or(self.config.default_months))?;
        let indices: Vec<_> = self
            .config
            .indices
            .iter()
            .filter(|i| only.is_none_or(|o| i.symbol.eq_ignore_ascii_case(o.trim())))
            .collect();
        if indices.is_empty() {
            return Err(PipelineError::EmptySelection);
        }

        let start = self
            .config
            .index_history
            .start(anchor)
            .min(window::trailing_cutoff(anchor, months));
        let symbols: Vec<String> = indices.iter().map(|i| i.symbol.clone()).collect();
        let fetched = fetch_series(
            self.provider.as_ref(),
            &symbols,
            start,
            anchor,
            &self.config.fetch_options(AssetClass::Index),
        )
        .await?;

        let params = IndexViewParams {
            windows: self.config.moving_average_windows.clone(),
            months,
            anchor,
        };
        let built: Vec<IndexView> = fetched
            .series
            .par_iter()
            .map(|s| {
                let title = indices
                    .iter()
                    .find(|i| i.symbol == s.ticker())
                    .map_or(s.ticker(), |i| i.title.as_str());
                build_index_view(s, title, &params)
            })
            .collect();

        let mut failures = fetched.failures;
        let mut views = Vec::with_capacity(built.len());
        for view in built {
            if view.is_empty() {
                warn!(ticker = %view.ticker, "no candles in the visible window");
                failures.push(TickerError::data_unavailable(view.ticker));
            } else {
                views.push(view);
            }
        }

        info!(
            views = views.len(),
            failures = failures.len(),
            months = months.get(),
            "index views ready"
        );
        Ok(IndexReport { views, failures })
    }

    /// Peer comparison for `selection` ending at `anchor`.
    pub async fn peers(
        &self,
        selection: &Selection,
        anchor: NaiveDate,
    ) -> Result<PeerReport, PipelineError> {
        let start = selection.horizon().start(anchor);
        let fetched = fetch_series(
            self.provider.as_ref(),
            selection.tickers(),
            start,
            anchor,
            &self.config.fetch_options(AssetClass::UsEquity),
        )
        .await?;
        compare_peers(&fetched.series, selection, anchor, fetched.failures)
    }
}
