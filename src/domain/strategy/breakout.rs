//! Price breakout above or below a moving average by a percentage threshold.

use super::{Strategy, StrategyKind, first_valid_index};
use crate::domain::indicator::{IndicatorSpec, sma_field};
use crate::domain::price_bar::PriceSeries;
use crate::domain::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakout {
    pub window: usize,
    /// Percent distance from the average, e.g. 2.0 for 2%.
    pub threshold_pct: f64,
}

impl Breakout {
    pub fn new(window: usize, threshold_pct: f64) -> Self {
        Breakout {
            window,
            threshold_pct,
        }
    }
}

impl Default for Breakout {
    fn default() -> Self {
        Breakout::new(60, 2.0)
    }
}

impl Strategy for Breakout {
    fn name(&self) -> String {
        format!("Breakout ({}-day, {}%)", self.window, self.threshold_pct)
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Momentum
    }

    fn description(&self) -> String {
        format!(
            "Buy when close is more than {}% above the {}-day SMA, sell when more than {}% below",
            self.threshold_pct, self.window, self.threshold_pct
        )
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("window", self.window.to_string()),
            ("threshold_pct", self.threshold_pct.to_string()),
        ]
    }

    fn indicators(&self) -> Vec<IndicatorSpec> {
        vec![IndicatorSpec::Sma(self.window)]
    }

    fn compute_signals(&self, series: &PriceSeries) -> Vec<Signal> {
        let closes = series.column("close");
        let sma = series.column(&sma_field(self.window));
        let up = 1.0 + self.threshold_pct / 100.0;
        let down = 1.0 - self.threshold_pct / 100.0;

        let mut signals: Vec<Signal> = closes
            .iter()
            .zip(&sma)
            .map(|(&close, &avg)| {
                if close > avg * up {
                    Signal::Buy
                } else if close < avg * down {
                    Signal::Sell
                } else {
                    Signal::Hold
                }
            })
            .collect();

        if let Some(i) = first_valid_index(&[&closes, &sma]) {
            if closes[i] > sma[i] * up {
                signals[i] = Signal::Buy;
            }
        }

        signals
    }
}
