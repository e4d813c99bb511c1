//! Yahoo Finance chart API adapter.
//!
//! Requests unadjusted daily bars from `/v8/finance/chart/{symbol}`. Bar
//! timestamps are shifted by the exchange's GMT offset before taking the
//! calendar date, so a US session never lands on the previous UTC day.

use chrono::{DateTime, Days, NaiveDate};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::error::ProfitError;
use crate::domain::price_series::PriceBar;
use crate::ports::market_data_port::MarketDataPort;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; profit-analyzer/0.1)";

pub struct YahooAdapter {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl YahooAdapter {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProfitError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProfitError::ConfigInvalid {
                section: "data".to_string(),
                key: "yahoo_base_url".to_string(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;
        info!(base_url, timeout_secs = timeout.as_secs(), "using Yahoo chart API");
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Query bounds padded by a day on each side. Sessions east of UTC open
/// before UTC midnight of their local date; `parse_chart` trims the excess.
fn request_window(start_date: NaiveDate, end_date: NaiveDate) -> (i64, i64) {
    let from = start_date.checked_sub_days(Days::new(1)).unwrap_or(start_date);
    // period2 is exclusive.
    let until = end_date.checked_add_days(Days::new(2)).unwrap_or(end_date);
    (unix_midnight(from), unix_midnight(until))
}

impl MarketDataPort for YahooAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, ProfitError> {
        if end_date < start_date {
            return Ok(Vec::new());
        }
        let (period1, period2) = request_window(start_date, end_date);

        debug!(symbol, %start_date, %end_date, "requesting chart");
        let response = self
            .client
            .get(self.chart_url(symbol))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .map_err(|e| ProfitError::data_source(symbol, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let body = response
            .text()
            .map_err(|e| ProfitError::data_source(symbol, e))?;
        if !status.is_success() {
            return Err(ProfitError::data_source(
                symbol,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        parse_chart(symbol, &body, start_date, end_date)
    }
}

fn parse_chart(
    symbol: &str,
    body: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<PriceBar>, ProfitError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| ProfitError::data_source(symbol, format!("unexpected response: {}", e)))?;

    let result = match (envelope.chart.result, envelope.chart.error) {
        (Some(mut results), _) if !results.is_empty() => results.swap_remove(0),
        (_, Some(ChartError { code, description })) => {
            // Unknown or delisted symbols come back as an error payload.
            if code.as_deref() == Some("Not Found") {
                return Ok(Vec::new());
            }
            return Err(ProfitError::data_source(
                symbol,
                description.or(code).unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        _ => return Ok(Vec::new()),
    };

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let offset = result.meta.gmtoffset;
    let mut bars = Vec::with_capacity(result.timestamp.len());

    for (i, ts) in result.timestamp.iter().enumerate() {
        let at = |series: &[Option<f64>]| series.get(i).copied().flatten();
        // Halted or not-yet-settled sessions carry nulls.
        let (Some(high), Some(close)) = (at(&quote.high), at(&quote.close)) else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        if date < start_date || date > end_date {
            continue;
        }
        bars.push(PriceBar {
            date,
            open: at(&quote.open).unwrap_or(close),
            high,
            low: at(&quote.low).unwrap_or(close),
            close,
        });
    }

    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    Ok(bars)
}
