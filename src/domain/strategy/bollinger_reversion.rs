//! Mean reversion inside Bollinger Bands.
//!
//! Position within the bands is `(close - lower) / (upper - lower)`. Near the
//! lower band is oversold (BUY), near the upper band overbought (SELL). A close
//! re-entering the bands from outside overrides the position rule on that day.
//! Days whose bands have collapsed to a single value carry no position and are
//! HOLD.

use super::{Strategy, StrategyKind, first_valid_index};
use crate::domain::indicator::{BOLLINGER_LOWER, BOLLINGER_UPPER, IndicatorSpec};
use crate::domain::price_bar::PriceSeries;
use crate::domain::signal::Signal;

pub const OVERSOLD_POSITION: f64 = 0.1;
pub const OVERBOUGHT_POSITION: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerMeanReversion {
    pub window: usize,
    pub num_std: f64,
}

impl BollingerMeanReversion {
    pub fn new(window: usize, num_std: f64) -> Self {
        BollingerMeanReversion { window, num_std }
    }
}

impl Default for BollingerMeanReversion {
    fn default() -> Self {
        BollingerMeanReversion::new(20, 2.0)
    }
}

fn band_position(close: f64, upper: f64, lower: f64) -> Option<f64> {
    let width = upper - lower;
    if width > 0.0 && close.is_finite() {
        Some((close - lower) / width)
    } else {
        None
    }
}

impl Strategy for BollingerMeanReversion {
    fn name(&self) -> String {
        format!(
            "Bollinger Mean Reversion ({}, {} SD)",
            self.window, self.num_std
        )
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::MeanReversion
    }

    fn description(&self) -> String {
        format!(
            "Buy near the lower {}-day, {} SD Bollinger Band, sell near the upper band",
            self.window, self.num_std
        )
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("window", self.window.to_string()),
            ("num_std", self.num_std.to_string()),
        ]
    }

    fn indicators(&self) -> Vec<IndicatorSpec> {
        vec![IndicatorSpec::bollinger(self.window, self.num_std)]
    }

    fn compute_signals(&self, series: &PriceSeries) -> Vec<Signal> {
        let closes = series.column("close");
        let upper = series.column(BOLLINGER_UPPER);
        let lower = series.column(BOLLINGER_LOWER);

        let mut signals = vec![Signal::Hold; series.len()];
        for i in 0..signals.len() {
            let Some(position) = band_position(closes[i], upper[i], lower[i]) else {
                continue;
            };

            if position <= OVERSOLD_POSITION {
                signals[i] = Signal::Buy;
            }
            if position >= OVERBOUGHT_POSITION {
                signals[i] = Signal::Sell;
            }

            if i > 0 {
                if closes[i - 1] < lower[i - 1] && closes[i] >= lower[i] {
                    signals[i] = Signal::Buy;
                }
                if closes[i - 1] > upper[i - 1] && closes[i] <= upper[i] {
                    signals[i] = Signal::Sell;
                }
            }
        }

        if let Some(i) = first_valid_index(&[&closes, &upper, &lower]) {
            if band_position(closes[i], upper[i], lower[i])
                .is_some_and(|position| position <= OVERSOLD_POSITION)
            {
                signals[i] = Signal::Buy;
            }
        }

        signals
    }
}
