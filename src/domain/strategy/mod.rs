//! Strategy contract and the six concrete signal generators.
//!
//! A strategy maps a [`PriceSeries`] to exactly one [`Signal`] per bar. It
//! emits discrete transitions only: BUY where a position should be opened,
//! SELL where it should be closed, HOLD everywhere else. It does not
//! re-assert BUY on every day a position should remain open; persisting the
//! position between transitions is the portfolio's job, and the engine ignores
//! BUY while long and SELL while flat.
//!
//! Rows whose indicators are still warming up (NaN) compare false in every
//! rule and therefore produce HOLD.

pub mod bollinger_reversion;
pub mod breakout;
pub mod buy_and_hold;
pub mod catalog;
pub mod sma_crossover;
pub mod volatility_breakout;
pub mod volume_momentum;

use std::collections::BTreeSet;
use std::fmt;

use crate::domain::error::StratbenchError;
use crate::domain::indicator::IndicatorSpec;
use crate::domain::price_bar::PriceSeries;
use crate::domain::signal::Signal;

pub use bollinger_reversion::BollingerMeanReversion;
pub use breakout::Breakout;
pub use buy_and_hold::BuyAndHold;
pub use catalog::StrategyConfig;
pub use sma_crossover::SmaCrossover;
pub use volatility_breakout::VolatilityBreakout;
pub use volume_momentum::VolumeMomentum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Baseline,
    Momentum,
    Volatility,
    MeanReversion,
    Volume,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Baseline => write!(f, "Baseline"),
            StrategyKind::Momentum => write!(f, "Momentum"),
            StrategyKind::Volatility => write!(f, "Volatility"),
            StrategyKind::MeanReversion => write!(f, "Mean Reversion"),
            StrategyKind::Volume => write!(f, "Volume"),
        }
    }
}

pub trait Strategy: fmt::Debug + Send + Sync {
    /// Display name; includes the parameters so that differently configured
    /// instances of one variant report separately.
    fn name(&self) -> String;

    fn kind(&self) -> StrategyKind;

    fn description(&self) -> String;

    fn parameters(&self) -> Vec<(&'static str, String)>;

    /// Indicator columns this strategy reads.
    fn indicators(&self) -> Vec<IndicatorSpec>;

    /// Signals for an input already known to carry [`Strategy::required_fields`].
    /// Must return one signal per bar.
    fn compute_signals(&self, series: &PriceSeries) -> Vec<Signal>;

    /// Raw bar columns read besides the indicator outputs.
    fn base_fields(&self) -> &'static [&'static str] {
        &["close"]
    }

    fn required_fields(&self) -> BTreeSet<String> {
        let mut fields: BTreeSet<String> = self
            .indicators()
            .iter()
            .flat_map(IndicatorSpec::field_names)
            .collect();
        fields.extend(self.base_fields().iter().map(|f| f.to_string()));
        fields
    }

    /// Validates the input, then computes one signal per bar. The input is
    /// never modified.
    fn generate_signals(&self, series: &PriceSeries) -> Result<Vec<Signal>, StratbenchError> {
        let missing: Vec<String> = self
            .required_fields()
            .into_iter()
            .filter(|field| !series.has_field(field))
            .collect();

        if !missing.is_empty() {
            return Err(StratbenchError::MissingInput {
                strategy: self.name(),
                fields: missing,
            });
        }

        let signals = self.compute_signals(series);
        debug_assert_eq!(signals.len(), series.len());
        Ok(signals)
    }
}

/// First row where every named column holds a finite value.
pub(crate) fn first_valid_index(columns: &[&[f64]]) -> Option<usize> {
    let len = columns.first().map_or(0, |c| c.len());
    (0..len).find(|&i| columns.iter().all(|c| c[i].is_finite()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::price_bar::{PriceBar, PriceSeries};
    use chrono::NaiveDate;

    pub fn day(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
    }

    /// Series from closes plus named indicator columns (use NaN for warm-up).
    pub fn series(closes: &[f64], columns: &[(&str, &[f64])]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let mut bar = PriceBar::new(day(i), c, c, c, c, 1_000);
                for (name, values) in columns {
                    bar = bar.with_indicator(*name, values[i]);
                }
                bar
            })
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::series;
    use super::*;

    #[test]
    fn first_valid_index_skips_warmup() {
        let a = [f64::NAN, 1.0, 2.0, 3.0];
        let b = [f64::NAN, f64::NAN, 2.0, 3.0];
        assert_eq!(first_valid_index(&[&a, &b]), Some(2));
        assert_eq!(first_valid_index(&[&[f64::NAN]]), None);
        assert_eq!(first_valid_index(&[]), None);
    }

    #[test]
    fn kind_display() {
        assert_eq!(StrategyKind::MeanReversion.to_string(), "Mean Reversion");
        assert_eq!(StrategyKind::Baseline.to_string(), "Baseline");
    }

    #[test]
    fn missing_fields_are_reported() {
        let strategy = SmaCrossover::new(5, 20);
        let input = series(&[1.0, 2.0], &[("sma_5", &[1.0, 2.0])]);

        match strategy.generate_signals(&input) {
            Err(StratbenchError::MissingInput { strategy, fields }) => {
                assert_eq!(strategy, "SMA Crossover (5/20)");
                assert_eq!(fields, vec!["sma_20".to_string()]);
            }
            other => panic!("expected MissingInput, got {other:?}"),
        }
    }

    #[test]
    fn every_variant_emits_one_signal_per_bar() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let base = series(&closes, &[]);

        for config in StrategyConfig::defaults() {
            let strategy = config.build();
            let enriched = crate::domain::indicator::enrich(&base, &strategy.indicators());
            let signals = strategy.generate_signals(&enriched).unwrap();
            assert_eq!(signals.len(), closes.len(), "{}", strategy.name());
        }
    }
}
