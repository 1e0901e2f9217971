//! Price moves confirmed by above-average volume.
//!
//! A rise on volume at least `multiplier` times the average is a BUY, a fall
//! on such volume a SELL. Two consecutive moves in the same direction on the
//! second day are evaluated last and take precedence; since both rules require
//! today's direction and high volume they always agree. The first bar with a
//! usable price change and volume ratio has nothing to confirm against and is
//! HOLD.

use super::{Strategy, StrategyKind, first_valid_index};
use crate::domain::indicator::{IndicatorSpec, VOLUME_RATIO};
use crate::domain::price_bar::PriceSeries;
use crate::domain::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeMomentum {
    pub volume_window: usize,
    pub volume_multiplier: f64,
}

impl VolumeMomentum {
    pub fn new(volume_window: usize, volume_multiplier: f64) -> Self {
        VolumeMomentum {
            volume_window,
            volume_multiplier,
        }
    }
}

impl Default for VolumeMomentum {
    fn default() -> Self {
        VolumeMomentum::new(20, 1.5)
    }
}

impl Strategy for VolumeMomentum {
    fn name(&self) -> String {
        format!(
            "Volume Momentum ({}-day, {}x)",
            self.volume_window, self.volume_multiplier
        )
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Volume
    }

    fn description(&self) -> String {
        format!(
            "Trade in the direction of the price move when volume is at least {}x its {}-day average",
            self.volume_multiplier, self.volume_window
        )
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        vec![
            ("volume_window", self.volume_window.to_string()),
            ("volume_multiplier", self.volume_multiplier.to_string()),
        ]
    }

    fn indicators(&self) -> Vec<IndicatorSpec> {
        vec![
            IndicatorSpec::VolumeSma(self.volume_window),
            IndicatorSpec::VolumeRatio(self.volume_window),
        ]
    }

    fn base_fields(&self) -> &'static [&'static str] {
        &["close", "volume"]
    }

    fn compute_signals(&self, series: &PriceSeries) -> Vec<Signal> {
        let closes = series.column("close");
        let ratio = series.column(VOLUME_RATIO);
        let n = closes.len();

        let change: Vec<f64> = (0..n)
            .map(|i| {
                if i == 0 {
                    f64::NAN
                } else {
                    closes[i] - closes[i - 1]
                }
            })
            .collect();
        let up: Vec<bool> = change.iter().map(|&c| c > 0.0).collect();
        let down: Vec<bool> = change.iter().map(|&c| c < 0.0).collect();
        let high_volume: Vec<bool> = ratio
            .iter()
            .map(|&r| r >= self.volume_multiplier)
            .collect();

        let mut signals = vec![Signal::Hold; n];
        for i in 0..n {
            if up[i] && high_volume[i] {
                signals[i] = Signal::Buy;
            }
            if down[i] && high_volume[i] {
                signals[i] = Signal::Sell;
            }
            if i > 0 && up[i] && up[i - 1] && high_volume[i] {
                signals[i] = Signal::Buy;
            }
            if i > 0 && down[i] && down[i - 1] && high_volume[i] {
                signals[i] = Signal::Sell;
            }
        }

        if let Some(i) = first_valid_index(&[&change, &ratio]) {
            signals[i] = Signal::Hold;
        }

        signals
    }
}
