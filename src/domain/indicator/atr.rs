//! Average True Range: rolling mean of the per-day true range.
//!
//! The first bar has no previous close, so its true range is high - low.

use super::sma::rolling_mean;
use crate::domain::price_bar::PriceBar;

pub fn true_ranges(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}

pub fn average_true_range(bars: &[PriceBar], period: usize) -> Vec<f64> {
    rolling_mean(&true_ranges(bars), period)
}
