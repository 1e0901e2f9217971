//! CSV file data adapter.
//!
//! One file per ticker, `<data_dir>/<TICKER>.csv`, with a header row naming
//! at least `date,open,high,low,close,volume`. Any further column is carried
//! as an indicator field; an empty cell or `NaN` in such a column is NaN.

use crate::domain::error::StratbenchError;
use crate::domain::price_bar::{PriceBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

const REQUIRED_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

/// Positions of the required columns plus every extra column by name.
struct ColumnLayout {
    required: [usize; 6],
    extra: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn from_headers(headers: &csv::StringRecord, path: &Path) -> Result<Self, StratbenchError> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

        let mut required = [0usize; 6];
        for (slot, column) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = names
                .iter()
                .position(|n| n == column)
                .ok_or_else(|| StratbenchError::Data {
                    reason: format!("{}: missing {} column", path.display(), column),
                })?;
        }

        let extra = names
            .iter()
            .enumerate()
            .filter(|(_, n)| !REQUIRED_COLUMNS.contains(&n.as_str()))
            .map(|(i, n)| (i, n.clone()))
            .collect();

        Ok(ColumnLayout { required, extra })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// `<base>/<TICKER>.csv`, falling back to a file whose stem matches the
    /// ticker ignoring ASCII case.
    fn csv_path(&self, ticker: &str) -> PathBuf {
        let exact = self.base_path.join(format!("{}.csv", ticker));
        if exact.is_file() {
            return exact;
        }

        let Ok(entries) = fs::read_dir(&self.base_path) else {
            return exact;
        };
        entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .find(|path| {
                path.extension().is_some_and(|ext| ext == "csv")
                    && path
                        .file_stem()
                        .is_some_and(|stem| stem.to_string_lossy().eq_ignore_ascii_case(ticker))
            })
            .unwrap_or(exact)
    }
}

fn data_error(path: &Path, line: usize, reason: impl std::fmt::Display) -> StratbenchError {
    StratbenchError::Data {
        reason: format!("{} line {}: {}", path.display(), line, reason),
    }
}

/// Prices must be finite and strictly positive.
fn parse_price(raw: &str, column: &str, path: &Path, line: usize) -> Result<f64, StratbenchError> {
    let price = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| data_error(path, line, format!("invalid {column} value '{raw}': {e}")))?;
    if !(price.is_finite() && price > 0.0) {
        return Err(data_error(
            path,
            line,
            format!("{column} must be a positive number, got '{raw}'"),
        ));
    }
    Ok(price)
}

fn parse_volume(raw: &str, path: &Path, line: usize) -> Result<i64, StratbenchError> {
    let raw = raw.trim();
    let volume = match raw.parse::<i64>() {
        Ok(volume) => Some(volume),
        Err(_) => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v.round() as i64),
    };
    match volume {
        Some(volume) if volume >= 0 => Ok(volume),
        _ => Err(data_error(path, line, format!("invalid volume value '{raw}'"))),
    }
}

fn parse_indicator(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(f64::NAN);
    }
    raw.parse::<f64>().ok()
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        ticker: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, StratbenchError> {
        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| StratbenchError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| StratbenchError::Data {
            reason: format!("{}: CSV header error: {}", path.display(), e),
        })?;
        let layout = ColumnLayout::from_headers(headers, &path)?;
        let [date_col, open_col, high_col, low_col, close_col, volume_col] = layout.required;

        let mut bars = Vec::new();
        for (index, result) in rdr.records().enumerate() {
            let line = index + 2;
            let record = result.map_err(|e| data_error(&path, line, e))?;
            let cell = |col: usize| record.get(col).unwrap_or("");

            let date = NaiveDate::parse_from_str(cell(date_col).trim(), "%Y-%m-%d")
                .map_err(|e| data_error(&path, line, format!("invalid date: {e}")))?;

            if start_date.is_some_and(|start| date < start) || end_date.is_some_and(|end| date > end)
            {
                continue;
            }

            let mut bar = PriceBar::new(
                date,
                parse_price(cell(open_col), "open", &path, line)?,
                parse_price(cell(high_col), "high", &path, line)?,
                parse_price(cell(low_col), "low", &path, line)?,
                parse_price(cell(close_col), "close", &path, line)?,
                parse_volume(cell(volume_col), &path, line)?,
            );

            for (col, name) in &layout.extra {
                let value = parse_indicator(cell(*col)).ok_or_else(|| {
                    data_error(&path, line, format!("invalid {name} value '{}'", cell(*col)))
                })?;
                bar = bar.with_indicator(name.clone(), value);
            }

            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        tracing::debug!(ticker, path = %path.display(), bars = bars.len(), "read csv");
        Ok(PriceSeries::new(ticker, bars)?)
    }

    fn list_tickers(&self) -> Result<Vec<String>, StratbenchError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| StratbenchError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut tickers = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StratbenchError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem() {
                    tickers.push(stem.to_string_lossy().to_uppercase());
                }
            }
        }

        tickers.sort();
        tickers.dedup();
        Ok(tickers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n";

        fs::write(path.join("BHP.csv"), csv_content).unwrap();
        fs::write(path.join("CBA.csv"), "date,open,high,low,close,volume\n").unwrap();
        fs::write(path.join("notes.txt"), "not price data").unwrap();

        (dir, path)
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn fetch_bars_returns_sorted_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter.fetch_bars("BHP", None, None).unwrap();

        assert_eq!(series.ticker(), "BHP");
        assert_eq!(series.len(), 3);
        let bar = &series.bars()[0];
        assert_eq!(bar.date, d(15));
        assert_eq!(bar.open, 100.0);
        assert_eq!(bar.high, 110.0);
        assert_eq!(bar.low, 90.0);
        assert_eq!(bar.close, 105.0);
        assert_eq!(bar.volume, 50000);
        assert_eq!(series.last_date(), Some(d(17)));
    }

    #[test]
    fn fetch_bars_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter.fetch_bars("BHP", Some(d(16)), Some(d(16))).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.first_date(), Some(d(16)));

        let series = adapter.fetch_bars("BHP", Some(d(16)), None).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn header_only_file_is_empty_series() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(adapter.fetch_bars("CBA", None, None).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_data_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let err = adapter.fetch_bars("XYZ", None, None).unwrap_err();
        assert!(matches!(err, StratbenchError::Data { .. }));
    }

    #[test]
    fn extra_columns_become_indicators() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("SPY.csv"),
            "Date,Open,High,Low,Close,Volume,sma_2\n\
             2024-01-01,1,1,1,10,100,\n\
             2024-01-02,1,1,1,12,100,11\n\
             2024-01-03,1,1,1,14,100,NaN\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let series = adapter.fetch_bars("SPY", None, None).unwrap();
        assert!(series.has_field("sma_2"));
        let sma = series.column("sma_2");
        assert!(sma[0].is_nan());
        assert_eq!(sma[1], 11.0);
        assert!(sma[2].is_nan());
    }

    #[test]
    fn missing_required_column_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("X.csv"), "date,open,high,low,close\n").unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let err = adapter.fetch_bars("X", None, None).unwrap_err();
        assert!(err.to_string().contains("missing volume column"));
    }

    #[test]
    fn bad_value_names_the_line() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("X.csv"),
            "date,open,high,low,close,volume\n2024-01-01,1,1,1,abc,100\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let err = adapter.fetch_bars("X", None, None).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("line 2"), "{message}");
        assert!(message.contains("close"), "{message}");
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("X.csv"),
            "date,open,high,low,close,volume\n\
             2024-01-01,1,1,1,1,100\n\
             2024-01-01,1,1,1,1,100\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let err = adapter.fetch_bars("X", None, None).unwrap_err();
        assert!(matches!(err, StratbenchError::Series(_)));
    }

    #[test]
    fn fractional_volume_is_rounded() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("X.csv"),
            "date,open,high,low,close,volume\n2024-01-01,1,1,1,1,1500.0\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let series = adapter.fetch_bars("X", None, None).unwrap();
        assert_eq!(series.bars()[0].volume, 1500);
    }

    fn write_single_row(volume: &str, close: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("X.csv"),
            format!(
                "date,open,high,low,close,volume\n\
                 2024-01-01,100,101,99,100,1000\n\
                 2024-01-02,100,101,99,{close},{volume}\n"
            ),
        )
        .unwrap();
        dir
    }

    #[test]
    fn non_finite_price_is_rejected() {
        for close in ["NaN", "inf", "-inf"] {
            let dir = write_single_row("1000", close);
            let adapter = CsvAdapter::new(dir.path().to_path_buf());
            let err = adapter.fetch_bars("X", None, None).unwrap_err();
            let message = err.to_string();
            assert!(matches!(err, StratbenchError::Data { .. }), "{message}");
            assert!(message.contains("line 3"), "{message}");
            assert!(message.contains("close"), "{message}");
        }
    }

    #[test]
    fn zero_or_negative_price_is_rejected() {
        for close in ["0", "-3"] {
            let dir = write_single_row("1000", close);
            let adapter = CsvAdapter::new(dir.path().to_path_buf());
            let err = adapter.fetch_bars("X", None, None).unwrap_err();
            assert!(err.to_string().contains("must be a positive number"), "{err}");
        }
    }

    #[test]
    fn negative_volume_is_rejected() {
        for volume in ["-5", "-5.0"] {
            let dir = write_single_row(volume, "101");
            let adapter = CsvAdapter::new(dir.path().to_path_buf());
            let err = adapter.fetch_bars("X", None, None).unwrap_err();
            assert!(err.to_string().contains("invalid volume"), "{err}");
        }
    }

    #[test]
    fn lowercase_file_is_found_by_upper_ticker() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("spy.csv"),
            "date,open,high,low,close,volume\n2024-01-01,1,1,1,1,100\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        assert_eq!(adapter.list_tickers().unwrap(), vec!["SPY"]);
        let series = adapter.fetch_bars("SPY", None, None).unwrap();
        assert_eq!(series.ticker(), "SPY");
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn list_tickers_returns_csv_stems() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert_eq!(adapter.list_tickers().unwrap(), vec!["BHP", "CBA"]);
    }
}
