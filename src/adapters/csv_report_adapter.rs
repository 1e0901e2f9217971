//! CSV report adapter: `summary.csv` with one metrics row per run and
//! `trades.csv` with one row per closed trade.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::domain::backtest::BacktestResult;
use crate::domain::batch::BatchReport;
use crate::domain::error::StratbenchError;
use crate::ports::report_port::ReportPort;

pub const SUMMARY_FILE: &str = "summary.csv";
pub const TRADES_FILE: &str = "trades.csv";

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    ticker: &'a str,
    strategy: &'a str,
    start_date: String,
    end_date: String,
    starting_capital: f64,
    final_value: f64,
    total_return_pct: f64,
    annualized_return_pct: f64,
    sharpe_ratio: f64,
    max_drawdown_pct: f64,
    volatility_pct: f64,
    num_days: usize,
    total_trades: usize,
    winning_trades: usize,
    losing_trades: usize,
    win_rate_pct: f64,
    avg_win_pct: f64,
    avg_loss_pct: f64,
    profit_factor: f64,
    avg_holding_days: f64,
}

impl<'a> From<&'a BacktestResult> for SummaryRow<'a> {
    fn from(result: &'a BacktestResult) -> Self {
        let m = &result.metrics;
        SummaryRow {
            ticker: &result.ticker,
            strategy: &result.strategy,
            start_date: result.start_date.format("%Y-%m-%d").to_string(),
            end_date: result.end_date.format("%Y-%m-%d").to_string(),
            starting_capital: m.starting_capital,
            final_value: m.final_value,
            total_return_pct: m.total_return_pct,
            annualized_return_pct: m.annualized_return_pct,
            sharpe_ratio: m.sharpe_ratio,
            max_drawdown_pct: m.max_drawdown_pct,
            volatility_pct: m.volatility_pct,
            num_days: m.num_days,
            total_trades: m.total_trades,
            winning_trades: m.winning_trades,
            losing_trades: m.losing_trades,
            win_rate_pct: m.win_rate_pct,
            avg_win_pct: m.avg_win_pct,
            avg_loss_pct: m.avg_loss_pct,
            profit_factor: m.profit_factor,
            avg_holding_days: m.avg_holding_days,
        }
    }
}

#[derive(Debug, Serialize)]
struct TradeRow<'a> {
    ticker: &'a str,
    strategy: &'a str,
    entry_date: String,
    entry_price: f64,
    exit_date: String,
    exit_price: f64,
    shares: f64,
    return_pct: f64,
    return_dollars: f64,
    holding_days: i64,
}

fn csv_error(path: &Path, err: csv::Error) -> StratbenchError {
    StratbenchError::Data {
        reason: format!("failed to write {}: {}", path.display(), err),
    }
}

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    fn write_summary(&self, report: &BatchReport, path: &Path) -> Result<(), StratbenchError> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
        for result in &report.results {
            writer
                .serialize(SummaryRow::from(result))
                .map_err(|e| csv_error(path, e))?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_trades(&self, report: &BatchReport, path: &Path) -> Result<(), StratbenchError> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
        for result in &report.results {
            for trade in &result.trades {
                writer
                    .serialize(TradeRow {
                        ticker: &result.ticker,
                        strategy: &result.strategy,
                        entry_date: trade.entry_date.format("%Y-%m-%d").to_string(),
                        entry_price: trade.entry_price,
                        exit_date: trade.exit_date.format("%Y-%m-%d").to_string(),
                        exit_price: trade.exit_price,
                        shares: trade.shares,
                        return_pct: trade.return_pct(),
                        return_dollars: trade.return_dollars(),
                        holding_days: trade.holding_days(),
                    })
                    .map_err(|e| csv_error(path, e))?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &BatchReport, output_dir: &Path) -> Result<(), StratbenchError> {
        fs::create_dir_all(output_dir)?;

        let summary = output_dir.join(SUMMARY_FILE);
        self.write_summary(report, &summary)?;

        let trades = output_dir.join(TRADES_FILE);
        self.write_trades(report, &trades)?;

        tracing::info!(
            dir = %output_dir.display(),
            runs = report.results.len(),
            "wrote csv reports"
        );
        Ok(())
    }
}
