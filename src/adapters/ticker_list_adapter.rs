//! Loads the autocomplete ticker list from a JSON file.
//!
//! The file holds an array of either `{"symbol", "name", "rank"}` objects or
//! bare symbol strings. A missing or malformed file disables autocomplete
//! rather than failing start-up.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::domain::ticker::TickerEntry;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTicker {
    Symbol(String),
    Entry(TickerEntry),
}

impl From<RawTicker> for TickerEntry {
    fn from(raw: RawTicker) -> Self {
        match raw {
            RawTicker::Symbol(symbol) => TickerEntry::new(symbol),
            RawTicker::Entry(entry) => entry,
        }
    }
}

pub fn load_ticker_list(path: &Path) -> Vec<TickerEntry> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ticker list unavailable, autocomplete disabled");
            return Vec::new();
        }
    };
    match parse_ticker_list(&content) {
        Ok(tickers) => {
            info!(path = %path.display(), count = tickers.len(), "loaded ticker list");
            tickers
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ticker list is malformed, autocomplete disabled");
            Vec::new()
        }
    }
}

pub fn parse_ticker_list(content: &str) -> Result<Vec<TickerEntry>, serde_json::Error> {
    let raw: Vec<RawTicker> = serde_json::from_str(content)?;
    Ok(raw.into_iter().map(TickerEntry::from).collect())
}
