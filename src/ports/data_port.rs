//! Price data access port.

use crate::domain::error::StratbenchError;
use crate::domain::price_bar::PriceSeries;
use chrono::NaiveDate;

pub trait DataPort: Sync {
    /// Bars for `ticker` within the inclusive date range, oldest first. An
    /// absent bound leaves that side open.
    fn fetch_bars(
        &self,
        ticker: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<PriceSeries, StratbenchError>;

    /// Every ticker the source can serve, sorted.
    fn list_tickers(&self) -> Result<Vec<String>, StratbenchError>;
}
