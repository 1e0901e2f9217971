//! Catalog of the configurable strategy variants.

use super::{
    BollingerMeanReversion, Breakout, BuyAndHold, SmaCrossover, Strategy, VolatilityBreakout,
    VolumeMomentum,
};

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyConfig {
    BuyAndHold,
    SmaCrossover(SmaCrossover),
    Breakout(Breakout),
    VolatilityBreakout(VolatilityBreakout),
    BollingerMeanReversion(BollingerMeanReversion),
    VolumeMomentum(VolumeMomentum),
}

impl StrategyConfig {
    /// Config keys, in catalog order.
    pub const KEYS: [&'static str; 6] = [
        "buy_and_hold",
        "sma_crossover",
        "breakout",
        "volatility_breakout",
        "bollinger_mean_reversion",
        "volume_momentum",
    ];

    pub fn key(&self) -> &'static str {
        match self {
            StrategyConfig::BuyAndHold => "buy_and_hold",
            StrategyConfig::SmaCrossover(_) => "sma_crossover",
            StrategyConfig::Breakout(_) => "breakout",
            StrategyConfig::VolatilityBreakout(_) => "volatility_breakout",
            StrategyConfig::BollingerMeanReversion(_) => "bollinger_mean_reversion",
            StrategyConfig::VolumeMomentum(_) => "volume_momentum",
        }
    }

    pub fn default_for(key: &str) -> Option<StrategyConfig> {
        match key {
            "buy_and_hold" => Some(StrategyConfig::BuyAndHold),
            "sma_crossover" => Some(StrategyConfig::SmaCrossover(SmaCrossover::default())),
            "breakout" => Some(StrategyConfig::Breakout(Breakout::default())),
            "volatility_breakout" => Some(StrategyConfig::VolatilityBreakout(
                VolatilityBreakout::default(),
            )),
            "bollinger_mean_reversion" => Some(StrategyConfig::BollingerMeanReversion(
                BollingerMeanReversion::default(),
            )),
            "volume_momentum" => Some(StrategyConfig::VolumeMomentum(VolumeMomentum::default())),
            _ => None,
        }
    }

    /// Every variant with its default parameters.
    pub fn defaults() -> Vec<StrategyConfig> {
        Self::KEYS
            .iter()
            .filter_map(|key| Self::default_for(key))
            .collect()
    }

    pub fn build(&self) -> Box<dyn Strategy> {
        match self {
            StrategyConfig::BuyAndHold => Box::new(BuyAndHold),
            StrategyConfig::SmaCrossover(s) => Box::new(*s),
            StrategyConfig::Breakout(s) => Box::new(*s),
            StrategyConfig::VolatilityBreakout(s) => Box::new(*s),
            StrategyConfig::BollingerMeanReversion(s) => Box::new(*s),
            StrategyConfig::VolumeMomentum(s) => Box::new(*s),
        }
    }
}
