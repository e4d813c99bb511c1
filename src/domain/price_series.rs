//! Daily price bars and the validated series the evaluator works on.

use chrono::NaiveDate;

use crate::domain::error::ProfitError;

/// One trading day of OHLC prices for a symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Non-empty, strictly date-ascending run of bars for one symbol, all dated
/// within the requested window.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Keeps the bars dated within `[start, end]`; the first of them becomes
    /// the purchase-day bar.
    pub fn new(
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        mut bars: Vec<PriceBar>,
    ) -> Result<Self, ProfitError> {
        bars.retain(|b| b.date >= start && b.date <= end);
        if bars.is_empty() {
            return Err(ProfitError::NoData {
                symbol: symbol.to_string(),
            });
        }

        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(ProfitError::malformed(format!(
                "price bars for {} are not in ascending date order ({} followed by {})",
                symbol, pair[0].date, pair[1].date
            )));
        }

        Ok(Self {
            symbol: symbol.to_string(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false; construction rejects an empty bar list.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The purchase-day bar.
    pub fn first(&self) -> &PriceBar {
        &self.bars[0]
    }

    pub fn last(&self) -> &PriceBar {
        &self.bars[self.bars.len() - 1]
    }

    /// Bars after the purchase day; the only ones allowed to hit a sell target.
    pub fn after_first(&self) -> &[PriceBar] {
        &self.bars[1..]
    }
}
