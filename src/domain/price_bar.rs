//! Daily price bar with indicator columns, and the ordered series a backtest
//! consumes.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

use super::error::SeriesError;

/// Fields every bar carries regardless of upstream indicator computation.
pub const BASE_FIELDS: [&str; 5] = ["open", "high", "low", "close", "volume"];

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    /// Named indicator values; NaN during warm-up.
    pub indicators: BTreeMap<String, f64>,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: i64) -> Self {
        PriceBar {
            date,
            open,
            high,
            low,
            close,
            volume,
            indicators: BTreeMap::new(),
        }
    }

    pub fn with_indicator(mut self, name: impl Into<String>, value: f64) -> Self {
        self.indicators.insert(name.into(), value);
        self
    }

    /// Value of a base or indicator field; NaN when the bar has no such field.
    pub fn field(&self, name: &str) -> f64 {
        match name {
            "open" => self.open,
            "high" => self.high,
            "low" => self.low,
            "close" => self.close,
            "volume" => self.volume as f64,
            _ => self.indicators.get(name).copied().unwrap_or(f64::NAN),
        }
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }
}

/// Time-ordered bars for one ticker. Dates are strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
    fields: BTreeSet<String>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        for (index, pair) in bars.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::UnorderedDates {
                    index: index + 1,
                    previous: pair[0].date,
                    current: pair[1].date,
                });
            }
        }

        let fields = bars
            .iter()
            .flat_map(|bar| bar.indicators.keys().cloned())
            .collect();

        Ok(PriceSeries {
            ticker: ticker.into(),
            bars,
            fields,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// True for base fields and for any indicator column of the series, even
    /// if every value in that column is NaN.
    pub fn has_field(&self, name: &str) -> bool {
        BASE_FIELDS.contains(&name) || self.fields.contains(name)
    }

    pub fn indicator_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Vec<f64> {
        self.bars.iter().map(|b| b.field(name)).collect()
    }

    /// Copy of this series with extra columns. Each column must be aligned
    /// with the bars; existing columns of the same name are overwritten.
    pub fn with_columns(&self, columns: Vec<(String, Vec<f64>)>) -> PriceSeries {
        let mut bars = self.bars.clone();
        let mut fields = self.fields.clone();

        for (name, values) in columns {
            debug_assert_eq!(values.len(), bars.len());
            for (bar, value) in bars.iter_mut().zip(values) {
                bar.indicators.insert(name.clone(), value);
            }
            fields.insert(name);
        }

        PriceSeries {
            ticker: self.ticker.clone(),
            bars,
            fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn sample_bar() -> PriceBar {
        PriceBar::new(d(15), 100.0, 110.0, 90.0, 105.0, 50_000)
    }

    #[test]
    fn true_range_hl_dominates() {
        let bar = sample_bar();
        // high-low=20, |high-100|=10, |low-100|=10 → 20
        assert!((bar.true_range(100.0) - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_up() {
        let bar = sample_bar();
        // |110-70|=40
        assert!((bar.true_range(70.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn true_range_gap_down() {
        let bar = sample_bar();
        // |90-130|=40
        assert!((bar.true_range(130.0) - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn field_lookup() {
        let bar = sample_bar().with_indicator("sma_5", 101.5);
        assert_eq!(bar.field("close"), 105.0);
        assert_eq!(bar.field("volume"), 50_000.0);
        assert_eq!(bar.field("sma_5"), 101.5);
        assert!(bar.field("sma_20").is_nan());
    }

    #[test]
    fn series_rejects_unordered_dates() {
        let bars = vec![
            PriceBar::new(d(2), 1.0, 1.0, 1.0, 1.0, 1),
            PriceBar::new(d(2), 1.0, 1.0, 1.0, 1.0, 1),
        ];
        let err = PriceSeries::new("AAPL", bars).unwrap_err();
        assert!(matches!(err, SeriesError::UnorderedDates { index: 1, .. }));
    }

    #[test]
    fn series_collects_indicator_fields() {
        let bars = vec![
            PriceBar::new(d(1), 1.0, 1.0, 1.0, 1.0, 1).with_indicator("sma_5", f64::NAN),
            PriceBar::new(d(2), 1.0, 1.0, 1.0, 1.0, 1).with_indicator("atr_14", 0.5),
        ];
        let series = PriceSeries::new("AAPL", bars).unwrap();
        assert!(series.has_field("close"));
        assert!(series.has_field("sma_5"));
        assert!(series.has_field("atr_14"));
        assert!(!series.has_field("sma_20"));
        assert_eq!(series.indicator_fields().collect::<Vec<_>>(), vec!["atr_14", "sma_5"]);
    }

    #[test]
    fn with_columns_leaves_original_untouched() {
        let bars = vec![
            PriceBar::new(d(1), 1.0, 1.0, 1.0, 10.0, 1),
            PriceBar::new(d(2), 1.0, 1.0, 1.0, 11.0, 1),
        ];
        let series = PriceSeries::new("AAPL", bars).unwrap();
        let enriched = series.with_columns(vec![("sma_1".into(), vec![10.0, 11.0])]);

        assert!(!series.has_field("sma_1"));
        assert!(enriched.has_field("sma_1"));
        assert_eq!(enriched.column("sma_1"), vec![10.0, 11.0]);
        assert_eq!(enriched.ticker(), "AAPL");
    }
}
