//! Breakout through an ATR channel around a moving average.

use super::{Strategy, StrategyKind, first_valid_index};
use crate::domain::indicator::{IndicatorSpec, atr_field, sma_field};
use crate::domain::price_bar::PriceSeries;
use crate::domain::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityBreakout {
    pub sma_window: usize,
    pub atr_window: usize,
    pub atr_multiplier: f64,
}

impl VolatilityBreakout {
    pub fn new(sma_window: usize, atr_window: usize, atr_multiplier: f64) -> Self {
        VolatilityBreakout {
            sma_window,
            atr_window,
            atr_multiplier,
        }
    }

    /// (upper, lower) channel per bar: sma ± multiplier × atr.
    fn channel(&self, series: &PriceSeries) -> (Vec<f64>, Vec<f64>) {
        let sma = series.column(&sma_field(self.sma_window));
        let atr = series.column(&atr_field(self.atr_window));
        sma.iter()
            .zip(&atr)
            .map(|(&m, &a)| (m + self.atr_multiplier * a, m - self.atr_multiplier * a))
            .unzip()
    }
}

impl Default for VolatilityBreakout {
    fn default() -> Self {
        VolatilityBreakout::new(20, 14, 1.5)
    }
}

impl Strategy for VolatilityBreakout {
    fn name(&self) -> String {
        format!(
            "ATR Volatility Breakout ({}/{}, {}x)",
            self.sma_window, self.atr_window, self.atr_multiplier
        )
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Volatility
    }

    fn description(&self) -> String {
        format!(
            "Buy above SMA({}) + {} x ATR({}), sell below SMA({}) - {} x ATR({})",
            self.sma_window,
            self.atr_multiplier,
            self.atr_window,
            self.sma_window,
            self.atr_multiplier,
            self.atr_window
        )
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("sma_window", self.sma_window.to_string()),
            ("atr_window", self.atr_window.to_string()),
            ("atr_multiplier", self.atr_multiplier.to_string()),
        ]
    }

    fn indicators(&self) -> Vec<IndicatorSpec> {
        vec![
            IndicatorSpec::Sma(self.sma_window),
            IndicatorSpec::Atr(self.atr_window),
        ]
    }

    fn compute_signals(&self, series: &PriceSeries) -> Vec<Signal> {
        let closes = series.column("close");
        let (upper, lower) = self.channel(series);

        let mut signals: Vec<Signal> = closes
            .iter()
            .zip(upper.iter().zip(&lower))
            .map(|(&close, (&up, &down))| {
                if close > up {
                    Signal::Buy
                } else if close < down {
                    Signal::Sell
                } else {
                    Signal::Hold
                }
            })
            .collect();

        if let Some(i) = first_valid_index(&[&closes, &upper, &lower]) {
            if closes[i] > upper[i] {
                signals[i] = Signal::Buy;
            }
        }

        signals
    }
}
