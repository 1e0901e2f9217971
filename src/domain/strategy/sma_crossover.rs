//! Golden cross / death cross on two simple moving averages.

use super::{Strategy, StrategyKind, first_valid_index};
use crate::domain::indicator::{IndicatorSpec, sma_field};
use crate::domain::price_bar::PriceSeries;
use crate::domain::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmaCrossover {
    pub short_window: usize,
    pub long_window: usize,
}

impl SmaCrossover {
    pub fn new(short_window: usize, long_window: usize) -> Self {
        SmaCrossover {
            short_window,
            long_window,
        }
    }
}

impl Default for SmaCrossover {
    fn default() -> Self {
        SmaCrossover::new(5, 20)
    }
}

impl Strategy for SmaCrossover {
    fn name(&self) -> String {
        format!("SMA Crossover ({}/{})", self.short_window, self.long_window)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Momentum
    }

    fn description(&self) -> String {
        format!(
            "Buy when the {}-day SMA crosses above the {}-day SMA, sell when it crosses below",
            self.short_window, self.long_window
        )
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("short_window", self.short_window.to_string()),
            ("long_window", self.long_window.to_string()),
        ]
    }

    fn indicators(&self) -> Vec<IndicatorSpec> {
        vec![
            IndicatorSpec::Sma(self.short_window),
            IndicatorSpec::Sma(self.long_window),
        ]
    }

    fn compute_signals(&self, series: &PriceSeries) -> Vec<Signal> {
        let short = series.column(&sma_field(self.short_window));
        let long = series.column(&sma_field(self.long_window));
        let above: Vec<bool> = short.iter().zip(&long).map(|(s, l)| s > l).collect();

        let mut signals = vec![Signal::Hold; series.len()];
        for i in 1..above.len() {
            if !above[i - 1] && above[i] {
                signals[i] = Signal::Buy;
            } else if above[i - 1] && !above[i] {
                signals[i] = Signal::Sell;
            }
        }

        // No previous day to cross from: enter if the short average already
        // sits above the long one.
        if let Some(i) = first_valid_index(&[&short, &long]) {
            if above[i] {
                signals[i] = Signal::Buy;
            }
        }

        signals
    }
}
