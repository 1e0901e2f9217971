//! Performance metrics over an equity curve and its closed trades.
//!
//! Every statistic falls back to a defined value (0) on degenerate input, so a
//! record never carries NaN.

use super::portfolio::{ClosedTrade, EquitySnapshot};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.25;
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRecord {
    pub starting_capital: f64,
    pub final_value: f64,
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
    pub volatility_pct: f64,
    pub num_days: usize,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate_pct: f64,
    pub avg_win_pct: f64,
    pub avg_loss_pct: f64,
    pub profit_factor: f64,
    pub avg_holding_days: f64,
}

impl MetricsRecord {
    pub fn compute(
        starting_capital: f64,
        equity_curve: &[EquitySnapshot],
        trades: &[ClosedTrade],
        risk_free_rate: f64,
    ) -> Self {
        let values: Vec<f64> = equity_curve.iter().map(|s| s.portfolio_value).collect();
        let final_value = values.last().copied().unwrap_or(starting_capital);
        let total = total_return_pct(starting_capital, final_value);
        let returns = daily_returns(&values);
        let stats = TradeStats::of(trades);

        MetricsRecord {
            starting_capital,
            final_value,
            total_return_pct: total,
            annualized_return_pct: annualized_return_pct(total, values.len()),
            sharpe_ratio: sharpe_ratio(&returns, risk_free_rate),
            max_drawdown_pct: max_drawdown_pct(&values),
            volatility_pct: volatility_pct(&returns),
            num_days: values.len(),
            total_trades: stats.total,
            winning_trades: stats.winners,
            losing_trades: stats.losers,
            win_rate_pct: stats.win_rate_pct,
            avg_win_pct: stats.avg_win_pct,
            avg_loss_pct: stats.avg_loss_pct,
            profit_factor: stats.profit_factor,
            avg_holding_days: stats.avg_holding_days,
        }
    }
}

pub fn total_return_pct(starting_capital: f64, final_value: f64) -> f64 {
    if starting_capital > 0.0 {
        (final_value / starting_capital - 1.0) * 100.0
    } else {
        0.0
    }
}

/// Compounds the total return to a 365.25-day year; `num_days` counts equity
/// snapshots.
pub fn annualized_return_pct(total_return_pct: f64, num_days: usize) -> f64 {
    if num_days == 0 {
        return 0.0;
    }
    let growth = 1.0 + total_return_pct / 100.0;
    let annualized = (growth.powf(CALENDAR_DAYS_PER_YEAR / num_days as f64) - 1.0) * 100.0;
    if annualized.is_finite() {
        annualized
    } else {
        0.0
    }
}

/// Percentage change between consecutive values, as fractions. A step from a
/// non-positive value counts as 0.
pub fn daily_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        })
        .collect()
}

/// Annualized excess return over annualized volatility.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let Some(stddev) = sample_stddev(returns) else {
        return 0.0;
    };
    if stddev == 0.0 {
        return 0.0;
    }
    let annual_return = mean(returns) * TRADING_DAYS_PER_YEAR;
    (annual_return - risk_free_rate) / (stddev * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Deepest fall from a running peak, as a non-positive percentage.
pub fn max_drawdown_pct(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;

    for &value in values {
        peak = peak.max(value);
        if peak > 0.0 {
            worst = worst.min((value - peak) / peak * 100.0);
        }
    }

    worst
}

pub fn volatility_pct(returns: &[f64]) -> f64 {
    sample_stddev(returns)
        .map(|s| s * TRADING_DAYS_PER_YEAR.sqrt() * 100.0)
        .unwrap_or(0.0)
}

/// Trade-quality figures. A trade is a winner when its return is strictly
/// positive; break-even trades count as losers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TradeStats {
    pub total: usize,
    pub winners: usize,
    pub losers: usize,
    pub win_rate_pct: f64,
    pub avg_win_pct: f64,
    pub avg_loss_pct: f64,
    pub profit_factor: f64,
    pub avg_holding_days: f64,
}

impl TradeStats {
    pub fn of(trades: &[ClosedTrade]) -> Self {
        if trades.is_empty() {
            return TradeStats::default();
        }

        let (wins, losses): (Vec<&ClosedTrade>, Vec<&ClosedTrade>) =
            trades.iter().partition(|t| t.is_winner());

        let win_returns: Vec<f64> = wins.iter().map(|t| t.return_pct()).collect();
        let loss_returns: Vec<f64> = losses.iter().map(|t| t.return_pct()).collect();
        let gross_profit: f64 = wins.iter().map(|t| t.return_dollars()).sum();
        let gross_loss: f64 = losses.iter().map(|t| t.return_dollars()).sum::<f64>().abs();

        let holding: Vec<f64> = trades.iter().map(|t| t.holding_days() as f64).collect();

        TradeStats {
            total: trades.len(),
            winners: wins.len(),
            losers: losses.len(),
            win_rate_pct: wins.len() as f64 / trades.len() as f64 * 100.0,
            avg_win_pct: mean(&win_returns),
            avg_loss_pct: mean(&loss_returns),
            profit_factor: if gross_loss > 0.0 {
                gross_profit / gross_loss
            } else {
                0.0
            },
            avg_holding_days: mean(&holding),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Sample standard deviation (divides by n - 1); None below two observations.
fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}
