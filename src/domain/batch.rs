//! Batch evaluation of submitted positions.
//!
//! Turns raw `(ticker, buy date)` rows into evaluation requests, fetches
//! prices for each through the market data port and evaluates them one after
//! another. A failing ticker does not stop the loop, but any failure fails
//! the whole batch: the successful results are dropped and the joined
//! per-ticker messages are returned instead.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::domain::error::ProfitError;
use crate::domain::evaluator::{EvaluationRequest, EvaluationResult, ProfitEvaluator};
use crate::domain::summary::BatchReport;
use crate::ports::market_data_port::MarketDataPort;

/// A submitted position before any parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRow {
    pub ticker: String,
    pub buy_date: String,
}

impl PositionRow {
    pub fn new(ticker: impl Into<String>, buy_date: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            buy_date: buy_date.into(),
        }
    }

    fn is_blank(&self) -> bool {
        self.ticker.trim().is_empty() || self.buy_date.trim().is_empty()
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d", "%Y.%m.%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Accepts the date shapes form pickers and spreadsheets produce.
pub fn parse_buy_date(input: &str) -> Result<NaiveDate, ProfitError> {
    let trimmed = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| ProfitError::malformed(format!("invalid buy date '{trimmed}'")))
}

pub fn parse_target_profit(input: &str) -> Result<f64, ProfitError> {
    let trimmed = input.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            ProfitError::malformed(format!("target profit must be a number, got '{trimmed}'"))
        })
}

/// Zips form field lists into rows; both lists must be non-empty and equally long.
pub fn pair_rows(tickers: Vec<String>, buy_dates: Vec<String>) -> Result<Vec<PositionRow>, ProfitError> {
    if tickers.is_empty() || buy_dates.is_empty() {
        return Err(ProfitError::malformed("enter at least one ticker and buy date"));
    }
    if tickers.len() != buy_dates.len() {
        return Err(ProfitError::malformed(format!(
            "got {} tickers but {} buy dates",
            tickers.len(),
            buy_dates.len()
        )));
    }
    Ok(tickers
        .into_iter()
        .zip(buy_dates)
        .map(|(ticker, buy_date)| PositionRow { ticker, buy_date })
        .collect())
}

pub fn run_batch(
    evaluator: &ProfitEvaluator,
    market_data: &dyn MarketDataPort,
    rows: &[PositionRow],
    target_profit_percent: f64,
    today: NaiveDate,
) -> Result<BatchReport, ProfitError> {
    let mut results = Vec::with_capacity(rows.len());
    let mut errors = Vec::new();

    for row in rows.iter().filter(|r| !r.is_blank()) {
        let symbol = row.ticker.trim().to_uppercase();
        match evaluate_row(evaluator, market_data, row, target_profit_percent, today) {
            Ok(result) => {
                debug!(
                    symbol = %result.symbol,
                    realized = result.realized,
                    days = result.days_held,
                    "evaluated"
                );
                results.push(result);
            }
            Err(err) => {
                warn!(symbol = %symbol, error = %err, "ticker evaluation failed");
                errors.push(describe_failure(&symbol, &err));
            }
        }
    }

    if !errors.is_empty() {
        info!(
            failed = errors.len(),
            discarded = results.len(),
            "batch failed, discarding results"
        );
        return Err(ProfitError::Batch { errors });
    }

    if results.is_empty() {
        return Err(ProfitError::NothingToAnalyze);
    }

    let report = BatchReport::from_results(results);
    info!(
        realized = report.summary.realized_count,
        unrealized = report.summary.unrealized_count,
        "batch evaluated"
    );
    Ok(report)
}

fn evaluate_row(
    evaluator: &ProfitEvaluator,
    market_data: &dyn MarketDataPort,
    row: &PositionRow,
    target_profit_percent: f64,
    today: NaiveDate,
) -> Result<EvaluationResult, ProfitError> {
    let buy_date = parse_buy_date(&row.buy_date)?;
    let request = EvaluationRequest::new(&row.ticker, buy_date, target_profit_percent)?;
    request.ensure_not_future(today)?;

    let bars = market_data.fetch_prices(&request.symbol, request.buy_date, today)?;
    evaluator.evaluate(&request, bars, today)
}

fn describe_failure(symbol: &str, err: &ProfitError) -> String {
    if err.names_symbol() {
        err.to_string()
    } else {
        format!("{symbol}: {err}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_iso_and_spreadsheet_dates() {
        assert_eq!(parse_buy_date("2024-03-04").unwrap(), date(2024, 3, 4));
        assert_eq!(parse_buy_date(" 2024/03/04 ").unwrap(), date(2024, 3, 4));
        assert_eq!(parse_buy_date("03/04/2024").unwrap(), date(2024, 3, 4));
        assert_eq!(parse_buy_date("2024-03-04 00:00:00").unwrap(), date(2024, 3, 4));
    }

    #[test]
    fn rejects_garbage_date() {
        assert!(matches!(
            parse_buy_date("next tuesday"),
            Err(ProfitError::MalformedInput { .. })
        ));
    }

    #[test]
    fn target_profit_parsing() {
        assert_eq!(parse_target_profit(" 12.5 ").unwrap(), 12.5);
        assert_eq!(parse_target_profit("-3").unwrap(), -3.0);
        assert!(parse_target_profit("ten").is_err());
        assert!(parse_target_profit("").is_err());
        assert!(parse_target_profit("NaN").is_err());
        assert!(parse_target_profit("inf").is_err());
    }

    #[test]
    fn pair_rows_requires_matching_lengths() {
        let err = pair_rows(vec!["AAPL".into()], vec![]).unwrap_err();
        assert!(matches!(err, ProfitError::MalformedInput { .. }));

        let err = pair_rows(
            vec!["AAPL".into(), "MSFT".into()],
            vec!["2024-01-02".into()],
        )
        .unwrap_err();
        assert!(err.to_string().contains("2 tickers but 1 buy dates"));

        let rows = pair_rows(vec!["AAPL".into()], vec!["2024-01-02".into()]).unwrap();
        assert_eq!(rows, vec![PositionRow::new("AAPL", "2024-01-02")]);
    }

    #[test]
    fn failure_messages_name_ticker_once() {
        let no_data = ProfitError::NoData {
            symbol: "ZZZ".into(),
        };
        assert_eq!(describe_failure("ZZZ", &no_data), "ZZZ: no price data found");

        let future = ProfitError::FutureDate {
            buy_date: date(2030, 1, 2),
        };
        assert_eq!(
            describe_failure("AAPL", &future),
            "AAPL: buy date 2030-01-02 is in the future"
        );
    }
}
