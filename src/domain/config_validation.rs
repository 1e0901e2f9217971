//! Configuration loading and validation.
//!
//! Reads the `[backtest]` section, the `[strategies] enabled` list and one
//! optional section per strategy key, and checks every value before any data
//! is touched.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::StratbenchError;
use crate::domain::strategy::{
    BollingerMeanReversion, Breakout, SmaCrossover, StrategyConfig, VolatilityBreakout,
    VolumeMomentum,
};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "results";

/// Everything a `backtest` command needs, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// `None` means every ticker the data source lists.
    pub tickers: Option<Vec<String>>,
    pub backtest: BacktestConfig,
    pub strategies: Vec<StrategyConfig>,
}

pub fn load_settings(config: &dyn ConfigPort) -> Result<RunSettings, StratbenchError> {
    let backtest = load_backtest_config(config)?;
    let strategies = load_strategies(config)?;

    let data_dir = config
        .get_string("backtest", "data_dir")
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
    let output_dir = config
        .get_string("backtest", "output_dir")
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());
    let tickers = config
        .get_list("backtest", "tickers")
        .filter(|list| !list.is_empty())
        .map(|list| list.into_iter().map(|t| t.to_uppercase()).collect());

    Ok(RunSettings {
        data_dir: PathBuf::from(data_dir),
        output_dir: PathBuf::from(output_dir),
        tickers,
        backtest,
        strategies,
    })
}

pub fn load_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, StratbenchError> {
    let defaults = BacktestConfig::default();

    let starting_capital = double_or(config, "backtest", "starting_capital", defaults.starting_capital)?;
    if starting_capital <= 0.0 {
        return Err(invalid("backtest", "starting_capital", "must be positive"));
    }

    let commission_pct = double_or(config, "backtest", "commission_pct", defaults.commission_pct)?;
    if !(0.0..1.0).contains(&commission_pct) {
        return Err(invalid("backtest", "commission_pct", "must be in [0, 1)"));
    }

    let risk_free_rate = double_or(config, "backtest", "risk_free_rate", defaults.risk_free_rate)?;
    if !(0.0..1.0).contains(&risk_free_rate) {
        return Err(invalid("backtest", "risk_free_rate", "must be in [0, 1)"));
    }

    let start_date = parse_date(config, "start_date")?;
    let end_date = parse_date(config, "end_date")?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start >= end {
            return Err(invalid(
                "backtest",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }

    Ok(BacktestConfig {
        starting_capital,
        commission_pct,
        risk_free_rate,
        start_date,
        end_date,
    })
}

/// Strategies named in `[strategies] enabled` (all of them when absent), each
/// with its parameters read from the section of the same name.
pub fn load_strategies(config: &dyn ConfigPort) -> Result<Vec<StrategyConfig>, StratbenchError> {
    let keys = config
        .get_list("strategies", "enabled")
        .unwrap_or_else(|| StrategyConfig::KEYS.iter().map(|k| k.to_string()).collect());

    if keys.is_empty() {
        return Err(StratbenchError::ConfigMissing {
            section: "strategies".into(),
            key: "enabled".into(),
        });
    }

    let mut seen = HashSet::new();
    let mut strategies = Vec::with_capacity(keys.len());
    for key in &keys {
        if !seen.insert(key.as_str()) {
            return Err(invalid(
                "strategies",
                "enabled",
                &format!("'{key}' is listed more than once"),
            ));
        }
        strategies.push(load_strategy(config, key)?);
    }
    Ok(strategies)
}

/// One strategy by catalog key, defaults overridden by its config section.
pub fn load_strategy(config: &dyn ConfigPort, key: &str) -> Result<StrategyConfig, StratbenchError> {
    let strategy = match StrategyConfig::default_for(key) {
        None => {
            return Err(invalid(
                "strategies",
                "enabled",
                &format!(
                    "unknown strategy '{key}', expected one of: {}",
                    StrategyConfig::KEYS.join(", ")
                ),
            ));
        }
        Some(StrategyConfig::BuyAndHold) => StrategyConfig::BuyAndHold,
        Some(StrategyConfig::SmaCrossover(d)) => StrategyConfig::SmaCrossover(SmaCrossover {
            short_window: window_or(config, key, "short_window", d.short_window)?,
            long_window: window_or(config, key, "long_window", d.long_window)?,
        }),
        Some(StrategyConfig::Breakout(d)) => StrategyConfig::Breakout(Breakout {
            window: window_or(config, key, "window", d.window)?,
            threshold_pct: double_or(config, key, "threshold_pct", d.threshold_pct)?,
        }),
        Some(StrategyConfig::VolatilityBreakout(d)) => {
            StrategyConfig::VolatilityBreakout(VolatilityBreakout {
                sma_window: window_or(config, key, "sma_window", d.sma_window)?,
                atr_window: window_or(config, key, "atr_window", d.atr_window)?,
                atr_multiplier: double_or(config, key, "atr_multiplier", d.atr_multiplier)?,
            })
        }
        Some(StrategyConfig::BollingerMeanReversion(d)) => {
            StrategyConfig::BollingerMeanReversion(BollingerMeanReversion {
                window: window_or(config, key, "window", d.window)?,
                num_std: double_or(config, key, "num_std", d.num_std)?,
            })
        }
        Some(StrategyConfig::VolumeMomentum(d)) => StrategyConfig::VolumeMomentum(VolumeMomentum {
            volume_window: window_or(config, key, "volume_window", d.volume_window)?,
            volume_multiplier: double_or(config, key, "volume_multiplier", d.volume_multiplier)?,
        }),
    };

    validate_strategy(&strategy)?;
    Ok(strategy)
}

/// Parameter checks that hold however the strategy was constructed.
pub fn validate_strategy(strategy: &StrategyConfig) -> Result<(), StratbenchError> {
    let section = strategy.key();
    match strategy {
        StrategyConfig::BuyAndHold => Ok(()),
        StrategyConfig::SmaCrossover(s) => {
            positive_window(section, "short_window", s.short_window)?;
            positive_window(section, "long_window", s.long_window)?;
            if s.short_window >= s.long_window {
                return Err(invalid(
                    section,
                    "short_window",
                    "short_window must be less than long_window",
                ));
            }
            Ok(())
        }
        StrategyConfig::Breakout(s) => {
            positive_window(section, "window", s.window)?;
            positive_value(section, "threshold_pct", s.threshold_pct)
        }
        StrategyConfig::VolatilityBreakout(s) => {
            positive_window(section, "sma_window", s.sma_window)?;
            positive_window(section, "atr_window", s.atr_window)?;
            positive_value(section, "atr_multiplier", s.atr_multiplier)
        }
        StrategyConfig::BollingerMeanReversion(s) => {
            // sample stddev needs at least two observations
            if s.window < 2 {
                return Err(invalid(section, "window", "must be at least 2"));
            }
            positive_value(section, "num_std", s.num_std)
        }
        StrategyConfig::VolumeMomentum(s) => {
            positive_window(section, "volume_window", s.volume_window)?;
            positive_value(section, "volume_multiplier", s.volume_multiplier)
        }
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> StratbenchError {
    StratbenchError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn double_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, StratbenchError> {
    config
        .get_double(section, key)
        .map(|value| value.unwrap_or(default))
        .map_err(|reason| invalid(section, key, &reason))
}

fn window_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, StratbenchError> {
    match config.get_int(section, key) {
        Ok(None) => Ok(default),
        Ok(Some(value)) => usize::try_from(value)
            .map_err(|_| invalid(section, key, "must be a positive integer")),
        Err(reason) => Err(invalid(section, key, &reason)),
    }
}

fn positive_window(section: &str, key: &str, value: usize) -> Result<(), StratbenchError> {
    if value == 0 {
        return Err(invalid(section, key, "must be a positive integer"));
    }
    Ok(())
}

fn positive_value(section: &str, key: &str, value: f64) -> Result<(), StratbenchError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(invalid(section, key, "must be positive"));
    }
    Ok(())
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDate>, StratbenchError> {
    config
        .get_string("backtest", key)
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                invalid(
                    "backtest",
                    key,
                    &format!("invalid {key} format, expected YYYY-MM-DD"),
                )
            })
        })
        .transpose()
}
