//! Profit-target evaluation for a single purchase.
//!
//! The purchase-day bar fixes the buy price but can never trigger the sell
//! target: a position bought at a day's close cannot be sold the same day.
//! Only later bars are scanned, earliest first.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::calendar::BusinessCalendar;
use crate::domain::error::ProfitError;
use crate::domain::price_series::{PriceBar, PriceSeries};

/// One ticker to evaluate.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRequest {
    pub symbol: String,
    pub buy_date: NaiveDate,
    pub target_profit_percent: f64,
}

impl EvaluationRequest {
    /// Trims and upper-cases the symbol; rejects a blank symbol or a non-finite target.
    pub fn new(
        symbol: &str,
        buy_date: NaiveDate,
        target_profit_percent: f64,
    ) -> Result<Self, ProfitError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ProfitError::malformed("ticker symbol is empty"));
        }
        let request = Self {
            symbol,
            buy_date,
            target_profit_percent,
        };
        request.ensure_finite_target()?;
        Ok(request)
    }

    fn ensure_finite_target(&self) -> Result<(), ProfitError> {
        if !self.target_profit_percent.is_finite() {
            return Err(ProfitError::malformed(format!(
                "target profit must be a number, got {}",
                self.target_profit_percent
            )));
        }
        Ok(())
    }

    pub fn ensure_not_future(&self, today: NaiveDate) -> Result<(), ProfitError> {
        if self.buy_date > today {
            return Err(ProfitError::FutureDate {
                buy_date: self.buy_date,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub symbol: String,
    #[serde(with = "iso_date")]
    pub buy_date: NaiveDate,
    pub buy_price: f64,
    pub target_price: f64,
    pub sell_price: f64,
    #[serde(with = "iso_date_opt")]
    pub achieve_date: Option<NaiveDate>,
    #[serde(rename = "days")]
    pub days_held: u32,
    #[serde(rename = "profit")]
    pub profit_percent: f64,
    pub realized: bool,
}

/// Evaluates purchases against a fixed business calendar.
#[derive(Debug, Clone)]
pub struct ProfitEvaluator {
    calendar: BusinessCalendar,
}

impl ProfitEvaluator {
    pub fn new(calendar: BusinessCalendar) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &BusinessCalendar {
        &self.calendar
    }

    pub fn evaluate(
        &self,
        request: &EvaluationRequest,
        bars: Vec<PriceBar>,
        today: NaiveDate,
    ) -> Result<EvaluationResult, ProfitError> {
        request.ensure_not_future(today)?;
        request.ensure_finite_target()?;
        // Bars before the purchase or after today are not part of the holding period.
        let series = PriceSeries::new(&request.symbol, request.buy_date, today, bars)?;
        Ok(self.evaluate_series(request, &series))
    }

    pub fn evaluate_series(
        &self,
        request: &EvaluationRequest,
        series: &PriceSeries,
    ) -> EvaluationResult {
        let buy_price = series.first().close;
        let current_price = series.last().close;
        let target_price = target_price(buy_price, request.target_profit_percent);

        let base = EvaluationResult {
            symbol: request.symbol.clone(),
            buy_date: request.buy_date,
            buy_price,
            target_price,
            sell_price: buy_price,
            achieve_date: None,
            days_held: 0,
            profit_percent: 0.0,
            realized: false,
        };

        // Nothing has traded since the purchase day yet.
        if series.len() == 1 {
            return base;
        }

        match first_bar_reaching(series.after_first(), target_price) {
            Some(hit) => EvaluationResult {
                sell_price: target_price,
                achieve_date: Some(hit.date),
                days_held: self.holding_days(request.buy_date, hit.date),
                profit_percent: request.target_profit_percent,
                realized: true,
                ..base
            },
            None => EvaluationResult {
                sell_price: current_price,
                days_held: self.holding_days(request.buy_date, series.last().date),
                profit_percent: round_to(percent_change(buy_price, current_price), 2),
                ..base
            },
        }
    }

    /// Business days from the day after purchase through `end`.
    fn holding_days(&self, buy_date: NaiveDate, end: NaiveDate) -> u32 {
        match buy_date.succ_opt() {
            Some(start) => self.calendar.business_days_between(start, end),
            None => 0,
        }
    }
}

pub fn target_price(buy_price: f64, target_profit_percent: f64) -> f64 {
    buy_price * (1.0 + target_profit_percent / 100.0)
}

fn first_bar_reaching(bars: &[PriceBar], target_price: f64) -> Option<&PriceBar> {
    bars.iter().find(|bar| bar.high >= target_price)
}

fn percent_change(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        return 0.0;
    }
    (to - from) / from * 100.0
}

/// Rounds to `decimals` places, exact halves to the even neighbour.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

mod iso_date {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }
}

mod iso_date_opt {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            None => serializer.serialize_none(),
        }
    }
}
