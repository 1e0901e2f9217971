//! Backtest engine: signals in, trades and metrics out.
//!
//! One pass over the series. BUY opens a position only when flat, SELL closes
//! it only when long, and every bar appends an equity snapshot. A position
//! still open after the last bar is sold at the last close; that sale does not
//! add a snapshot, so the curve has exactly one point per bar.

use chrono::NaiveDate;

use super::error::StratbenchError;
use super::metrics::{DEFAULT_RISK_FREE_RATE, MetricsRecord};
use super::portfolio::{ClosedTrade, EquitySnapshot, Portfolio};
use super::price_bar::PriceSeries;
use super::signal::{Signal, SignalSummary};
use super::strategy::Strategy;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub starting_capital: f64,
    /// Fraction of notional charged on each buy and each sell.
    pub commission_pct: f64,
    /// Annual rate used by the Sharpe ratio.
    pub risk_free_rate: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            starting_capital: 10_000.0,
            commission_pct: 0.001,
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            start_date: None,
            end_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub ticker: String,
    pub strategy: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub signals: Vec<Signal>,
    pub equity_curve: Vec<EquitySnapshot>,
    pub trades: Vec<ClosedTrade>,
    pub metrics: MetricsRecord,
}

pub fn run_backtest(
    strategy: &dyn Strategy,
    series: &PriceSeries,
    config: &BacktestConfig,
) -> Result<BacktestResult, StratbenchError> {
    let (Some(start_date), Some(end_date)) = (series.first_date(), series.last_date()) else {
        return Err(StratbenchError::NoData {
            ticker: series.ticker().to_string(),
        });
    };

    let name = strategy.name();
    let signals = strategy.generate_signals(series)?;
    let summary = SignalSummary::of(&signals);
    tracing::debug!(
        ticker = series.ticker(),
        strategy = %name,
        buys = summary.buys,
        sells = summary.sells,
        holds = summary.holds,
        "generated signals"
    );

    let mut portfolio = Portfolio::new(config.starting_capital, config.commission_pct);

    for (bar, signal) in series.bars().iter().zip(&signals) {
        let outcome = match signal {
            Signal::Buy if !portfolio.has_position() => {
                Some(portfolio.buy(bar.date, bar.close, None))
            }
            Signal::Sell if portfolio.has_position() => Some(portfolio.sell(bar.date, bar.close)),
            _ => None,
        };

        if let Some(Err(err)) = outcome {
            tracing::warn!(
                ticker = series.ticker(),
                strategy = %name,
                date = %bar.date,
                error = %err,
                "order rejected"
            );
        }

        portfolio.record_day(bar.date, bar.close);
    }

    if portfolio.has_position() {
        if let Some(last) = series.bars().last() {
            portfolio.sell(last.date, last.close)?;
        }
    }

    let starting_capital = portfolio.starting_capital();
    let (equity_curve, trades) = portfolio.into_history();
    let metrics = MetricsRecord::compute(
        starting_capital,
        &equity_curve,
        &trades,
        config.risk_free_rate,
    );

    tracing::info!(
        ticker = series.ticker(),
        strategy = %name,
        days = metrics.num_days,
        trades = metrics.total_trades,
        total_return_pct = metrics.total_return_pct,
        sharpe = metrics.sharpe_ratio,
        "backtest complete"
    );

    Ok(BacktestResult {
        ticker: series.ticker().to_string(),
        strategy: name,
        start_date,
        end_date,
        signals,
        equity_curve,
        trades,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::enrich;
    use crate::domain::price_bar::PriceBar;
    use crate::domain::strategy::{BuyAndHold, SmaCrossover};
    use approx::assert_relative_eq;

    fn make_series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                PriceBar::new(
                    start + chrono::Duration::days(i as i64),
                    c,
                    c + 1.0,
                    c - 1.0,
                    c,
                    10_000,
                )
            })
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    fn no_commission() -> BacktestConfig {
        BacktestConfig {
            commission_pct: 0.0,
            ..BacktestConfig::default()
        }
    }

    #[test]
    fn default_config() {
        let c = BacktestConfig::default();
        assert!((c.starting_capital - 10_000.0).abs() < f64::EPSILON);
        assert!((c.commission_pct - 0.001).abs() < f64::EPSILON);
        assert!((c.risk_free_rate - 0.02).abs() < f64::EPSILON);
        assert!(c.start_date.is_none());
    }

    #[test]
    fn empty_series_is_no_data() {
        let series = PriceSeries::new("EMPTY", vec![]).unwrap();
        let err = run_backtest(&BuyAndHold, &series, &BacktestConfig::default()).unwrap_err();
        assert!(matches!(err, StratbenchError::NoData { ticker } if ticker == "EMPTY"));
    }

    #[test]
    fn buy_and_hold_single_trade_first_to_last() {
        let series = make_series(&[100.0, 105.0, 95.0, 110.0]);
        let result = run_backtest(&BuyAndHold, &series, &no_commission()).unwrap();

        assert_eq!(result.trades.len(), 1);
        let trade = &result.trades[0];
        assert_eq!(trade.entry_date, series.first_date().unwrap());
        assert_eq!(trade.exit_date, series.last_date().unwrap());
        assert_relative_eq!(trade.entry_price, 100.0);
        assert_relative_eq!(trade.exit_price, 110.0);

        assert_eq!(result.equity_curve.len(), 4);
        assert_relative_eq!(result.metrics.final_value, 11_000.0, epsilon = 1e-6);
        assert_relative_eq!(result.metrics.total_return_pct, 10.0, epsilon = 1e-9);
        assert_eq!(result.strategy, "Buy and Hold");
        assert_eq!(result.ticker, "TEST");
    }

    #[test]
    fn curve_tracks_position_value() {
        let series = make_series(&[100.0, 50.0, 100.0]);
        let result = run_backtest(&BuyAndHold, &series, &no_commission()).unwrap();

        let values: Vec<f64> = result
            .equity_curve
            .iter()
            .map(|s| s.portfolio_value)
            .collect();
        assert_relative_eq!(values[0], 10_000.0, epsilon = 1e-6);
        assert_relative_eq!(values[1], 5_000.0, epsilon = 1e-6);
        assert_relative_eq!(values[2], 10_000.0, epsilon = 1e-6);
        assert_relative_eq!(result.metrics.max_drawdown_pct, -50.0, epsilon = 1e-9);
    }

    #[test]
    fn crossover_round_trip() {
        // sma_2 rises above sma_3 on day 3 and meets it (13 = 13) on day 5
        let closes = [10.0, 10.0, 10.0, 13.0, 14.0, 12.0, 8.0, 8.0];
        let strategy = SmaCrossover::new(2, 3);
        let series = enrich(&make_series(&closes), &strategy.indicators());
        let result = run_backtest(&strategy, &series, &no_commission()).unwrap();

        assert_eq!(result.signals.len(), closes.len());
        assert_eq!(result.trades.len(), 1);
        assert_relative_eq!(result.trades[0].entry_price, 13.0);
        assert_relative_eq!(result.trades[0].exit_price, 12.0);
        assert!(result.metrics.total_return_pct < 0.0);
    }

    #[test]
    fn missing_indicator_propagates() {
        let series = make_series(&[10.0, 11.0]);
        let err = run_backtest(&SmaCrossover::default(), &series, &no_commission()).unwrap_err();
        assert!(matches!(err, StratbenchError::MissingInput { .. }));
    }

    #[test]
    fn commission_reduces_final_value() {
        let series = make_series(&[100.0, 100.0]);
        let result = run_backtest(&BuyAndHold, &series, &BacktestConfig::default()).unwrap();
        assert!(result.metrics.final_value < 10_000.0);
    }
}
