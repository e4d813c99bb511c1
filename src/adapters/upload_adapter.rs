//! Parses uploaded position sheets (CSV or XLSX) into rows.
//!
//! The first row must name a `Ticker` and a `BuyDate` column; other columns
//! are ignored. Only the first worksheet of a workbook is read.

use calamine::{Data, Reader, Xlsx};
use std::io::Cursor;
use tracing::debug;

use crate::domain::batch::PositionRow;
use crate::domain::error::ProfitError;

pub const TICKER_COLUMN: &str = "Ticker";
pub const BUY_DATE_COLUMN: &str = "BuyDate";

#[derive(Debug, Clone, Copy, PartialEq)]
enum UploadKind {
    Csv,
    Xlsx,
}

fn detect_kind(file_name: &str) -> Result<UploadKind, ProfitError> {
    let lower = file_name.trim().to_lowercase();
    if lower.ends_with(".csv") {
        Ok(UploadKind::Csv)
    } else if lower.ends_with(".xlsx") {
        Ok(UploadKind::Xlsx)
    } else {
        Err(ProfitError::UnsupportedFileFormat {
            file_name: file_name.to_string(),
        })
    }
}

pub fn parse_upload(file_name: &str, bytes: &[u8]) -> Result<Vec<PositionRow>, ProfitError> {
    let rows = match detect_kind(file_name)? {
        UploadKind::Csv => parse_csv(bytes)?,
        UploadKind::Xlsx => parse_xlsx(bytes)?,
    };
    debug!(file_name, rows = rows.len(), "parsed upload");
    Ok(rows)
}

/// Positions of the required columns within a header row.
fn locate_columns<'a, I>(headers: I) -> Result<(usize, usize), ProfitError>
where
    I: IntoIterator<Item = &'a str>,
{
    let headers: Vec<&str> = headers.into_iter().map(str::trim).collect();
    let ticker = headers.iter().position(|h| *h == TICKER_COLUMN);
    let buy_date = headers.iter().position(|h| *h == BUY_DATE_COLUMN);
    match (ticker, buy_date) {
        (Some(t), Some(d)) => Ok((t, d)),
        (t, d) => {
            let missing: Vec<&str> = [(t, TICKER_COLUMN), (d, BUY_DATE_COLUMN)]
                .into_iter()
                .filter(|(found, _)| found.is_none())
                .map(|(_, name)| name)
                .collect();
            Err(ProfitError::MissingColumns {
                missing: missing.join(", "),
            })
        }
    }
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<PositionRow>, ProfitError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers = rdr
        .headers()
        .map_err(|e| ProfitError::malformed(format!("CSV parse error: {}", e)))?
        .clone();
    let (ticker_idx, date_idx) = locate_columns(headers.iter())?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| ProfitError::malformed(format!("CSV parse error: {}", e)))?;
        rows.push(PositionRow::new(
            record.get(ticker_idx).unwrap_or_default().trim(),
            record.get(date_idx).unwrap_or_default().trim(),
        ));
    }
    Ok(rows)
}

fn parse_xlsx(bytes: &[u8]) -> Result<Vec<PositionRow>, ProfitError> {
    let mut workbook = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| ProfitError::malformed(format!("XLSX parse error: {}", e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ProfitError::malformed("XLSX file has no worksheets"))?
        .map_err(|e| ProfitError::malformed(format!("XLSX parse error: {}", e)))?;

    let mut sheet_rows = range.rows();
    let header: Vec<String> = sheet_rows
        .next()
        .map(|cells| cells.iter().map(cell_text).collect())
        .unwrap_or_default();
    let (ticker_idx, date_idx) = locate_columns(header.iter().map(String::as_str))?;

    Ok(sheet_rows
        .map(|cells| {
            let text = |idx: usize| cells.get(idx).map(cell_text).unwrap_or_default();
            PositionRow::new(text(ticker_idx), text(date_idx))
        })
        .collect())
}

/// Renders a cell as the string a user typed; date cells become `YYYY-MM-DD`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
