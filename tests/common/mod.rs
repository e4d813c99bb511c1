#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use profit_analyzer::domain::error::ProfitError;
pub use profit_analyzer::domain::price_series::PriceBar;
use profit_analyzer::ports::clock_port::ClockPort;
use profit_analyzer::ports::market_data_port::MarketDataPort;
use std::collections::HashMap;
use std::sync::Mutex;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Serves canned bars per symbol, filtered to the requested range.
pub struct MockMarketDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    pub requests: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
    pub ignore_range: bool,
}

impl MockMarketDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: Mutex::new(Vec::new()),
            ignore_range: false,
        }
    }

    /// Returns every stored bar regardless of the requested dates.
    pub fn ignoring_range(mut self) -> Self {
        self.ignore_range = true;
        self
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn requests(&self) -> Vec<(String, NaiveDate, NaiveDate)> {
        self.requests.lock().unwrap().clone()
    }
}

impl MarketDataPort for MockMarketDataPort {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, ProfitError> {
        self.requests
            .lock()
            .unwrap()
            .push((symbol.to_string(), start_date, end_date));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ProfitError::data_source(symbol, reason));
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| {
                        self.ignore_range || (b.date >= start_date && b.date <= end_date)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub struct FixedClock(pub NaiveDate);

impl ClockPort for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub fn bar(date: NaiveDate, high: f64, close: f64) -> PriceBar {
    PriceBar {
        date,
        open: close,
        high,
        low: close.min(high),
        close,
    }
}

/// Bars on consecutive weekdays starting at `start`, one (high, close) pair each.
pub fn weekday_bars(start: NaiveDate, prices: &[(f64, f64)]) -> Vec<PriceBar> {
    use chrono::Datelike;
    let mut bars = Vec::with_capacity(prices.len());
    let mut day = start;
    for &(high, close) in prices {
        while day.weekday().number_from_monday() > 5 {
            day = day + Days::new(1);
        }
        bars.push(bar(day, high, close));
        day = day + Days::new(1);
    }
    bars
}
