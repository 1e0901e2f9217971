//! Indicator columns derived from raw bars.
//!
//! Each [`IndicatorSpec`] names one windowed transform and the column(s) it
//! writes onto a [`PriceSeries`]. Values are NaN until the window is full.

pub mod atr;
pub mod bollinger;
pub mod sma;
pub mod stddev;
pub mod volume;

use std::fmt;

use crate::domain::price_bar::PriceSeries;

pub const BOLLINGER_UPPER: &str = "bollinger_upper";
pub const BOLLINGER_MIDDLE: &str = "bollinger_middle";
pub const BOLLINGER_LOWER: &str = "bollinger_lower";
pub const VOLUME_RATIO: &str = "volume_ratio";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorSpec {
    Sma(usize),
    Atr(usize),
    /// Band width multiplier as raw `f64` bits, keeping the enum `Eq + Hash`.
    Bollinger { period: usize, num_std_bits: u64 },
    VolumeSma(usize),
    /// Volume divided by its `n`-day average.
    VolumeRatio(usize),
}

impl IndicatorSpec {
    pub fn bollinger(period: usize, num_std: f64) -> Self {
        IndicatorSpec::Bollinger {
            period,
            num_std_bits: num_std.to_bits(),
        }
    }

    pub fn field_names(&self) -> Vec<String> {
        match self {
            IndicatorSpec::Sma(n) => vec![sma_field(*n)],
            IndicatorSpec::Atr(n) => vec![atr_field(*n)],
            IndicatorSpec::Bollinger { .. } => vec![
                BOLLINGER_UPPER.to_string(),
                BOLLINGER_MIDDLE.to_string(),
                BOLLINGER_LOWER.to_string(),
            ],
            IndicatorSpec::VolumeSma(n) => vec![volume_sma_field(*n)],
            IndicatorSpec::VolumeRatio(_) => vec![VOLUME_RATIO.to_string()],
        }
    }

    fn compute(&self, series: &PriceSeries) -> Vec<(String, Vec<f64>)> {
        match self {
            IndicatorSpec::Sma(n) => {
                vec![(sma_field(*n), sma::rolling_mean(&series.column("close"), *n))]
            }
            IndicatorSpec::Atr(n) => {
                vec![(atr_field(*n), atr::average_true_range(series.bars(), *n))]
            }
            IndicatorSpec::Bollinger {
                period,
                num_std_bits,
            } => {
                let bands = bollinger::bollinger_bands(
                    &series.column("close"),
                    *period,
                    f64::from_bits(*num_std_bits),
                );
                vec![
                    (BOLLINGER_UPPER.to_string(), bands.upper),
                    (BOLLINGER_MIDDLE.to_string(), bands.middle),
                    (BOLLINGER_LOWER.to_string(), bands.lower),
                ]
            }
            IndicatorSpec::VolumeSma(n) => {
                vec![(
                    volume_sma_field(*n),
                    sma::rolling_mean(&series.column("volume"), *n),
                )]
            }
            IndicatorSpec::VolumeRatio(n) => {
                let volumes = series.column("volume");
                let average = sma::rolling_mean(&volumes, *n);
                vec![(
                    VOLUME_RATIO.to_string(),
                    volume::volume_ratio(&volumes, &average),
                )]
            }
        }
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorSpec::Sma(n) => write!(f, "SMA({})", n),
            IndicatorSpec::Atr(n) => write!(f, "ATR({})", n),
            IndicatorSpec::Bollinger {
                period,
                num_std_bits,
            } => write!(f, "BOLLINGER({},{})", period, f64::from_bits(*num_std_bits)),
            IndicatorSpec::VolumeSma(n) => write!(f, "VOLUME_SMA({})", n),
            IndicatorSpec::VolumeRatio(n) => write!(f, "VOLUME_RATIO({})", n),
        }
    }
}

pub fn sma_field(period: usize) -> String {
    format!("sma_{}", period)
}

pub fn atr_field(period: usize) -> String {
    format!("atr_{}", period)
}

pub fn volume_sma_field(period: usize) -> String {
    format!("volume_sma_{}", period)
}

/// Returns a new series carrying the columns of `specs`. Columns the input
/// already has (for example supplied by the data file) are left as they are.
pub fn enrich(series: &PriceSeries, specs: &[IndicatorSpec]) -> PriceSeries {
    let columns: Vec<(String, Vec<f64>)> = specs
        .iter()
        .filter(|spec| {
            spec.field_names()
                .iter()
                .any(|field| !series.has_field(field))
        })
        .flat_map(|spec| spec.compute(series))
        .collect();

    if columns.is_empty() {
        return series.clone();
    }

    tracing::debug!(
        ticker = series.ticker(),
        columns = columns.len(),
        "derived indicator columns"
    );
    series.with_columns(columns)
}
