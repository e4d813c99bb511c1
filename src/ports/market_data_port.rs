//! Market data access port.

use crate::domain::error::ProfitError;
use crate::domain::price_series::PriceBar;
use chrono::NaiveDate;

pub trait MarketDataPort {
    /// Daily bars for `symbol` dated within `[start_date, end_date]`, oldest first.
    ///
    /// An unknown symbol or a range with no trading yields an empty list
    /// rather than an error.
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, ProfitError>;
}
