#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use stratbench::domain::backtest::BacktestConfig;
use stratbench::domain::error::StratbenchError;
pub use stratbench::domain::price_bar::{PriceBar, PriceSeries};
use stratbench::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        ticker: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, StratbenchError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(StratbenchError::Data {
                reason: reason.clone(),
            });
        }
        let bars = self
            .data
            .get(ticker)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|b| start_date.is_none_or(|s| b.date >= s))
            .filter(|b| end_date.is_none_or(|e| b.date <= e))
            .collect();
        Ok(PriceSeries::new(ticker, bars)?)
    }

    fn list_tickers(&self) -> Result<Vec<String>, StratbenchError> {
        let mut tickers: Vec<String> = self.data.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> PriceBar {
    PriceBar::new(
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        close - 1.0,
        close + 1.0,
        close - 2.0,
        close,
        1000,
    )
}

/// Daily bars with one close per entry of `closes`.
pub fn bars_from_closes(start_date: &str, closes: &[f64]) -> Vec<PriceBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            PriceBar::new(
                start + chrono::Duration::days(i as i64),
                close,
                close + 1.0,
                close - 1.0,
                close,
                1000,
            )
        })
        .collect()
}

/// Steady trend: `start_price + i * step`.
pub fn generate_bars(start_date: &str, count: usize, start_price: f64, step: f64) -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + i as f64 * step).collect();
    bars_from_closes(start_date, &closes)
}

/// Oscillating closes with volume spikes every fifth day, long enough to warm
/// up every default indicator.
pub fn generate_wave_bars(start_date: &str, count: usize) -> Vec<PriceBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + 15.0 * (t / 9.0).sin() + t * 0.05;
            let volume = if i % 5 == 0 { 5_000 } else { 1_000 };
            PriceBar::new(
                start + chrono::Duration::days(i as i64),
                close - 0.5,
                close + 1.5,
                close - 1.5,
                close,
                volume,
            )
        })
        .collect()
}

pub fn no_commission() -> BacktestConfig {
    BacktestConfig {
        commission_pct: 0.0,
        ..BacktestConfig::default()
    }
}

pub fn series(ticker: &str, bars: Vec<PriceBar>) -> PriceSeries {
    PriceSeries::new(ticker, bars).unwrap()
}
