//! CSV price directory adapter.
//!
//! Reads `<dir>/<SYMBOL>.csv` files with a header row naming at least
//! `Date`, `High` and `Close` columns (`Open` and `Low` are optional and
//! default to the close). Column names are matched case-insensitively, so
//! CSV exports from most charting tools load unchanged. A symbol with no file
//! has no data.

use crate::domain::error::ProfitError;
use crate::domain::price_series::PriceBar;
use crate::ports::market_data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: Option<usize>,
    high: usize,
    low: Option<usize>,
    close: usize,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

impl Columns {
    fn from_headers(symbol: &str, headers: &csv::StringRecord) -> Result<Self, ProfitError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                ProfitError::data_source(symbol, format!("missing {} column", name))
            })
        };
        Ok(Self {
            date: require("date")?,
            open: find("open"),
            high: require("high")?,
            low: find("low"),
            close: require("close")?,
        })
    }
}

fn field<'a>(symbol: &str, record: &'a csv::StringRecord, idx: usize) -> Result<&'a str, ProfitError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| ProfitError::data_source(symbol, format!("short row at column {}", idx + 1)))
}

fn price(symbol: &str, record: &csv::StringRecord, idx: usize) -> Result<f64, ProfitError> {
    let raw = field(symbol, record, idx)?;
    raw.parse()
        .map_err(|e| ProfitError::data_source(symbol, format!("invalid price '{}': {}", raw, e)))
}

impl MarketDataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, ProfitError> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            debug!(symbol, path = %path.display(), "no price file");
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).map_err(|e| {
            ProfitError::data_source(symbol, format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| ProfitError::data_source(symbol, format!("CSV parse error: {}", e)))?
            .clone();
        let columns = Columns::from_headers(symbol, &headers)?;
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result
                .map_err(|e| ProfitError::data_source(symbol, format!("CSV parse error: {}", e)))?;

            let date_str = field(symbol, &record, columns.date)?;
            // Exports sometimes carry a time part; only the day matters.
            let day = date_str.get(..10).unwrap_or(date_str);
            let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| {
                ProfitError::data_source(symbol, format!("invalid date '{}': {}", date_str, e))
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let close = price(symbol, &record, columns.close)?;
            let high = price(symbol, &record, columns.high)?;
            let open = match columns.open {
                Some(idx) => price(symbol, &record, idx)?,
                None => close,
            };
            let low = match columns.low {
                Some(idx) => price(symbol, &record, idx)?,
                None => close,
            };

            bars.push(PriceBar {
                date,
                open,
                high,
                low,
                close,
            });
        }

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        debug!(symbol, bars = bars.len(), "loaded price file");
        Ok(bars)
    }
}
