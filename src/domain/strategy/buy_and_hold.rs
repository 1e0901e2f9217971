//! Baseline: buy on the first bar and never sell.

use super::{Strategy, StrategyKind};
use crate::domain::indicator::IndicatorSpec;
use crate::domain::price_bar::PriceSeries;
use crate::domain::signal::Signal;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BuyAndHold;

impl Strategy for BuyAndHold {
    fn name(&self) -> String {
        "Buy and Hold".to_string()
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Baseline
    }

    fn description(&self) -> String {
        "Buy on the first day and hold until the end of the period".to_string()
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn indicators(&self) -> Vec<IndicatorSpec> {
        Vec::new()
    }

    fn compute_signals(&self, series: &PriceSeries) -> Vec<Signal> {
        let mut signals = vec![Signal::Hold; series.len()];
        if let Some(first) = signals.first_mut() {
            *first = Signal::Buy;
        }
        signals
    }
}
