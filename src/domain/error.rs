//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for profit-analyzer.
#[derive(Debug, thiserror::Error)]
pub enum ProfitError {
    #[error("buy date {buy_date} is in the future")]
    FutureDate { buy_date: NaiveDate },

    #[error("{symbol}: no price data found")]
    NoData { symbol: String },

    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },

    #[error("unsupported file format: {file_name} (upload a CSV or XLSX file)")]
    UnsupportedFileFormat { file_name: String },

    #[error("uploaded file is missing the {missing} column(s); expected Ticker and BuyDate")]
    MissingColumns { missing: String },

    #[error("{}", .errors.join(" / "))]
    Batch { errors: Vec<String> },

    #[error("nothing to analyze: enter at least one ticker and buy date")]
    NothingToAnalyze,

    #[error("{symbol}: market data request failed: {reason}")]
    DataSource { symbol: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ProfitError {
    /// Whether the message already names the ticker it concerns.
    pub fn names_symbol(&self) -> bool {
        matches!(self, Self::NoData { .. } | Self::DataSource { .. })
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
        }
    }

    pub fn data_source(symbol: &str, reason: impl std::fmt::Display) -> Self {
        Self::DataSource {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<&ProfitError> for std::process::ExitCode {
    fn from(err: &ProfitError) -> Self {
        let code: u8 = match err {
            ProfitError::Io(_) => 1,
            ProfitError::ConfigParse { .. } | ProfitError::ConfigInvalid { .. } => 2,
            ProfitError::FutureDate { .. }
            | ProfitError::MalformedInput { .. }
            | ProfitError::UnsupportedFileFormat { .. }
            | ProfitError::MissingColumns { .. }
            | ProfitError::NothingToAnalyze => 3,
            ProfitError::NoData { .. } | ProfitError::DataSource { .. } => 4,
            ProfitError::Batch { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_error_joins_messages() {
        let err = ProfitError::Batch {
            errors: vec!["AAA: no data".into(), "BBB: bad date".into()],
        };
        assert_eq!(err.to_string(), "AAA: no data / BBB: bad date");
    }

    #[test]
    fn future_date_message_names_the_date() {
        let err = ProfitError::FutureDate {
            buy_date: NaiveDate::from_ymd_opt(2030, 5, 1).unwrap(),
        };
        assert_eq!(err.to_string(), "buy date 2030-05-01 is in the future");
    }
}
