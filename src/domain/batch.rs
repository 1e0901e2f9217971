//! Batch runs over every (ticker × strategy) pair.
//!
//! Each ticker is loaded once. Runs are independent and execute on the rayon
//! pool; every run enriches its own copy of the series and owns its
//! portfolio. A failed load or run is recorded and the batch carries on.

use std::collections::BTreeMap;

use rayon::prelude::*;

use super::backtest::{BacktestConfig, BacktestResult, run_backtest};
use super::error::StratbenchError;
use super::indicator::enrich;
use super::price_bar::PriceSeries;
use super::strategy::Strategy;
use crate::ports::data_port::DataPort;

#[derive(Debug)]
pub struct RunFailure {
    pub ticker: String,
    /// `None` when the ticker's data could not be loaded at all.
    pub strategy: Option<String>,
    pub error: StratbenchError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successful runs, ticker-major in request order.
    pub results: Vec<BacktestResult>,
    pub failures: Vec<RunFailure>,
}

impl BatchReport {
    /// Highest total return per ticker, sorted by ticker.
    pub fn best_by_ticker(&self) -> Vec<&BacktestResult> {
        let mut best: BTreeMap<&str, &BacktestResult> = BTreeMap::new();
        for result in &self.results {
            best.entry(result.ticker.as_str())
                .and_modify(|current| {
                    if result.metrics.total_return_pct > current.metrics.total_return_pct {
                        *current = result;
                    }
                })
                .or_insert(result);
        }
        best.into_values().collect()
    }

    /// The `n` runs with the highest Sharpe ratio, best first.
    pub fn top_by_sharpe(&self, n: usize) -> Vec<&BacktestResult> {
        let mut ranked: Vec<&BacktestResult> = self.results.iter().collect();
        ranked.sort_by(|a, b| b.metrics.sharpe_ratio.total_cmp(&a.metrics.sharpe_ratio));
        ranked.truncate(n);
        ranked
    }

    pub fn run_count(&self) -> usize {
        self.results.len() + self.failures.len()
    }
}

pub fn run_batch(
    data_port: &dyn DataPort,
    strategies: &[Box<dyn Strategy>],
    config: &BacktestConfig,
    tickers: &[String],
) -> BatchReport {
    let mut report = BatchReport::default();

    let loaded: Vec<(String, Result<PriceSeries, StratbenchError>)> = tickers
        .par_iter()
        .map(|ticker| {
            let series = data_port.fetch_bars(ticker, config.start_date, config.end_date);
            (ticker.clone(), series)
        })
        .collect();

    let mut series_list = Vec::with_capacity(loaded.len());
    for (ticker, outcome) in loaded {
        match outcome {
            Ok(series) if series.is_empty() => {
                tracing::warn!(ticker = %ticker, "no bars in range, skipping");
                report.failures.push(RunFailure {
                    ticker: ticker.clone(),
                    strategy: None,
                    error: StratbenchError::NoData { ticker },
                });
            }
            Ok(series) => {
                tracing::info!(ticker = %ticker, bars = series.len(), "loaded price data");
                series_list.push(series);
            }
            Err(error) => {
                tracing::warn!(ticker = %ticker, error = %error, "failed to load price data");
                report.failures.push(RunFailure {
                    ticker,
                    strategy: None,
                    error,
                });
            }
        }
    }

    let jobs: Vec<(&PriceSeries, &dyn Strategy)> = series_list
        .iter()
        .flat_map(|series| strategies.iter().map(move |s| (series, s.as_ref())))
        .collect();

    let outcomes: Vec<(String, String, Result<BacktestResult, StratbenchError>)> = jobs
        .par_iter()
        .map(|(series, strategy)| {
            let enriched = enrich(series, &strategy.indicators());
            (
                series.ticker().to_string(),
                strategy.name(),
                run_backtest(*strategy, &enriched, config),
            )
        })
        .collect();

    for (ticker, strategy, outcome) in outcomes {
        match outcome {
            Ok(result) => report.results.push(result),
            Err(error) => {
                tracing::warn!(ticker = %ticker, strategy = %strategy, error = %error, "run failed");
                report.failures.push(RunFailure {
                    ticker,
                    strategy: Some(strategy),
                    error,
                });
            }
        }
    }

    tracing::info!(
        succeeded = report.results.len(),
        failed = report.failures.len(),
        "batch complete"
    );
    report
}
