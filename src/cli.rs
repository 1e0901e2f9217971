//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::batch::{BatchReport, run_batch};
use crate::domain::config_validation::{RunSettings, load_settings, load_strategies, load_strategy};
use crate::domain::error::StratbenchError;
use crate::domain::strategy::{Strategy, StrategyConfig};
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

/// Environment variable holding the log filter, e.g. `debug` or
/// `stratbench=debug`.
pub const LOG_ENV: &str = "STRATBENCH_LOG";

const TOP_RUNS: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "stratbench", about = "Daily-bar trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every enabled strategy against every ticker
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Run a single ticker instead of the configured list
        #[arg(long)]
        ticker: Option<String>,
        /// Run a single strategy by key, e.g. sma_crossover
        #[arg(short, long)]
        strategy: Option<String>,
        /// Directory for summary.csv and trades.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// List the strategy catalog with parameters
    Strategies {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn init_tracing() -> Result<(), String> {
    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            ticker,
            strategy,
            output,
            dry_run,
        } => run_backtest(
            &config,
            ticker.as_deref(),
            strategy.as_deref(),
            output,
            dry_run,
        ),
        Command::Strategies { config } => run_strategies(config.as_ref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &StratbenchError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = StratbenchError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        fail(&err)
    })
}

/// Narrows the configured strategies to `key`. A catalog strategy that is not
/// enabled in the config is still allowed, with parameters from its section.
pub fn select_strategy(
    adapter: &FileConfigAdapter,
    settings: &RunSettings,
    key: &str,
) -> Result<Vec<StrategyConfig>, StratbenchError> {
    if let Some(found) = settings.strategies.iter().find(|s| s.key() == key) {
        return Ok(vec![found.clone()]);
    }
    load_strategy(adapter, key).map(|s| vec![s])
}

/// `--ticker` wins, then the configured list, then every file in the data
/// directory.
pub fn resolve_tickers(
    data_port: &dyn DataPort,
    settings: &RunSettings,
    ticker_override: Option<&str>,
) -> Result<Vec<String>, StratbenchError> {
    if let Some(ticker) = ticker_override {
        return Ok(vec![ticker.trim().to_uppercase()]);
    }
    match &settings.tickers {
        Some(tickers) => Ok(tickers.clone()),
        None => data_port.list_tickers(),
    }
}

fn run_backtest(
    config_path: &Path,
    ticker_override: Option<&str>,
    strategy_override: Option<&str>,
    output_override: Option<PathBuf>,
    dry_run: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let mut settings = match load_settings(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    if let Some(key) = strategy_override {
        settings.strategies = match select_strategy(&adapter, &settings, key) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };
    }
    if let Some(output) = output_override {
        settings.output_dir = output;
    }

    let data_port = CsvAdapter::new(settings.data_dir.clone());
    let tickers = match resolve_tickers(&data_port, &settings, ticker_override) {
        Ok(t) => t,
        Err(e) => return fail(&e),
    };
    if tickers.is_empty() {
        eprintln!(
            "error: no tickers configured and no CSV files in {}",
            settings.data_dir.display()
        );
        return ExitCode::from(5);
    }

    let strategies: Vec<Box<dyn Strategy>> =
        settings.strategies.iter().map(StrategyConfig::build).collect();

    if dry_run {
        print_plan(&settings, &tickers, &strategies);
        eprintln!("\nDry run complete: configuration is valid");
        return ExitCode::SUCCESS;
    }

    eprintln!(
        "Running {} strategies on {} tickers from {}",
        strategies.len(),
        tickers.len(),
        settings.data_dir.display()
    );

    let report = run_batch(&data_port, &strategies, &settings.backtest, &tickers);
    print_summary(&report);

    if report.results.is_empty() {
        eprintln!("error: no run produced results");
        return report
            .failures
            .first()
            .map(|f| ExitCode::from(&f.error))
            .unwrap_or_else(|| ExitCode::from(5));
    }

    match CsvReportAdapter.write(&report, &settings.output_dir) {
        Ok(()) => {
            eprintln!("\nReports written to: {}", settings.output_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn print_plan(settings: &RunSettings, tickers: &[String], strategies: &[Box<dyn Strategy>]) {
    let bt = &settings.backtest;
    let date_or_open = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.to_string()).unwrap_or_else(|| "open".to_string())
    };

    eprintln!("\nBacktest:");
    eprintln!("  data_dir:         {}", settings.data_dir.display());
    eprintln!("  output_dir:       {}", settings.output_dir.display());
    eprintln!("  range:            {} to {}", date_or_open(bt.start_date), date_or_open(bt.end_date));
    eprintln!("  starting_capital: {:.2}", bt.starting_capital);
    eprintln!("  commission_pct:   {}", bt.commission_pct);
    eprintln!("  risk_free_rate:   {}", bt.risk_free_rate);
    eprintln!("\nTickers: {}", tickers.join(", "));
    eprintln!("\nStrategies:");
    for strategy in strategies {
        let indicators: Vec<String> = strategy.indicators().iter().map(|i| i.to_string()).collect();
        if indicators.is_empty() {
            eprintln!("  {}", strategy.name());
        } else {
            eprintln!("  {}  [{}]", strategy.name(), indicators.join(", "));
        }
    }
}

fn print_summary(report: &BatchReport) {
    eprintln!("\n=== Results ===");
    for result in &report.results {
        let m = &result.metrics;
        eprintln!(
            "  {:<6} {:<40} return {:>8.2}%  sharpe {:>6.2}  max dd {:>7.2}%  trades {:>3}",
            result.ticker,
            result.strategy,
            m.total_return_pct,
            m.sharpe_ratio,
            m.max_drawdown_pct,
            m.total_trades,
        );
    }

    if !report.failures.is_empty() {
        eprintln!("\n=== Failures ===");
        for failure in &report.failures {
            match &failure.strategy {
                Some(strategy) => {
                    eprintln!("  {} / {}: {}", failure.ticker, strategy, failure.error)
                }
                None => eprintln!("  {}: {}", failure.ticker, failure.error),
            }
        }
    }

    let best = report.best_by_ticker();
    if !best.is_empty() {
        eprintln!("\n=== Best Strategy per Ticker ===");
        for result in best {
            eprintln!(
                "  {:<6} {} ({:+.2}%)",
                result.ticker, result.strategy, result.metrics.total_return_pct
            );
        }
    }

    let top = report.top_by_sharpe(TOP_RUNS);
    if !top.is_empty() {
        eprintln!("\n=== Top {} by Sharpe Ratio ===", top.len());
        for (rank, result) in top.iter().enumerate() {
            eprintln!(
                "  {}. {} / {}: {:.3}",
                rank + 1,
                result.ticker,
                result.strategy,
                result.metrics.sharpe_ratio
            );
        }
    }
}

fn run_strategies(config_path: Option<&PathBuf>) -> ExitCode {
    let configs = match config_path {
        Some(path) => {
            let adapter = match load_config(path) {
                Ok(a) => a,
                Err(code) => return code,
            };
            match load_strategies(&adapter) {
                Ok(s) => s,
                Err(e) => return fail(&e),
            }
        }
        None => StrategyConfig::defaults(),
    };

    for config in &configs {
        let strategy = config.build();
        println!("{} ({})", config.key(), strategy.kind());
        println!("  name:        {}", strategy.name());
        println!("  description: {}", strategy.description());
        for (key, value) in strategy.parameters() {
            println!("  {key:<13}{value}");
        }
        let fields: Vec<String> = strategy.required_fields().into_iter().collect();
        println!("  requires:    {}", fields.join(", "));
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match load_settings(&adapter) {
        Ok(settings) => {
            eprintln!(
                "Config valid: {} strategies, capital {:.2}, commission {}",
                settings.strategies.len(),
                settings.backtest.starting_capital,
                settings.backtest.commission_pct
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
