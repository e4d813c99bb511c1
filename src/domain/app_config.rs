//! Application configuration: validation and the resolved settings.
//!
//! Every field is checked before the server or CLI builds anything from it.

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::domain::calendar::BusinessCalendar;
use crate::domain::error::ProfitError;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:5002";
pub const DEFAULT_FIRST_YEAR: i32 = 1990;
pub const DEFAULT_TIMEOUT_SECS: i64 = 10;
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Clone, PartialEq)]
pub enum DataProvider {
    Yahoo { base_url: String, timeout_secs: u64 },
    Csv { dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub listen: String,
    pub static_dir: PathBuf,
    pub tickers_path: PathBuf,
    pub provider: DataProvider,
    pub first_year: i32,
    pub last_year: i32,
    pub extra_holidays: Vec<NaiveDate>,
}

impl AppConfig {
    pub fn calendar(&self) -> BusinessCalendar {
        BusinessCalendar::us_federal(self.first_year, self.last_year)
            .with_extra_holidays(self.extra_holidays.iter().copied())
    }
}

pub fn validate_app_config(config: &dyn ConfigPort, current_year: i32) -> Result<(), ProfitError> {
    validate_provider(config)?;
    validate_timeout(config)?;
    validate_years(config, current_year)?;
    parse_extra_holidays(config)?;
    Ok(())
}

/// Validates, then resolves defaults. `current_year` bounds the default calendar range.
pub fn build_app_config(config: &dyn ConfigPort, current_year: i32) -> Result<AppConfig, ProfitError> {
    validate_app_config(config, current_year)?;

    let provider = match provider_name(config).as_str() {
        "csv" => DataProvider::Csv {
            dir: PathBuf::from(
                config
                    .get_string("data", "csv_dir")
                    .unwrap_or_else(|| "data".to_string()),
            ),
        },
        _ => DataProvider::Yahoo {
            base_url: config
                .get_string("data", "yahoo_base_url")
                .unwrap_or_else(|| DEFAULT_YAHOO_BASE_URL.to_string()),
            timeout_secs: config.get_int("data", "timeout_secs", DEFAULT_TIMEOUT_SECS) as u64,
        },
    };

    Ok(AppConfig {
        listen: config
            .get_string("web", "listen")
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string()),
        static_dir: PathBuf::from(
            config
                .get_string("web", "static_dir")
                .unwrap_or_else(|| "static".to_string()),
        ),
        tickers_path: PathBuf::from(
            config
                .get_string("tickers", "path")
                .unwrap_or_else(|| "static/tickers.json".to_string()),
        ),
        provider,
        first_year: first_year(config)?,
        last_year: last_year(config, current_year)?,
        extra_holidays: parse_extra_holidays(config)?,
    })
}

fn provider_name(config: &dyn ConfigPort) -> String {
    config
        .get_string("data", "provider")
        .map(|p| p.trim().to_lowercase())
        .unwrap_or_else(|| "yahoo".to_string())
}

const YEAR_RANGE: std::ops::RangeInclusive<i64> = 1900..=2200;

fn first_year(config: &dyn ConfigPort) -> Result<i32, ProfitError> {
    let raw = config.get_int("calendar", "first_year", i64::from(DEFAULT_FIRST_YEAR));
    calendar_year("first_year", raw)
}

fn last_year(config: &dyn ConfigPort, current_year: i32) -> Result<i32, ProfitError> {
    let raw = config.get_int("calendar", "last_year", i64::from(current_year) + 1);
    calendar_year("last_year", raw)
}

/// Range-checks the raw value before narrowing it.
fn calendar_year(key: &str, raw: i64) -> Result<i32, ProfitError> {
    let invalid = || ProfitError::ConfigInvalid {
        section: "calendar".to_string(),
        key: key.to_string(),
        reason: format!("calendar years must lie between 1900 and 2200, got {raw}"),
    };
    if !YEAR_RANGE.contains(&raw) {
        return Err(invalid());
    }
    i32::try_from(raw).map_err(|_| invalid())
}

fn validate_provider(config: &dyn ConfigPort) -> Result<(), ProfitError> {
    match provider_name(config).as_str() {
        "yahoo" | "csv" => Ok(()),
        other => Err(ProfitError::ConfigInvalid {
            section: "data".to_string(),
            key: "provider".to_string(),
            reason: format!("unknown provider '{other}', expected yahoo or csv"),
        }),
    }
}

fn validate_timeout(config: &dyn ConfigPort) -> Result<(), ProfitError> {
    let value = config.get_int("data", "timeout_secs", DEFAULT_TIMEOUT_SECS);
    if value <= 0 {
        return Err(ProfitError::ConfigInvalid {
            section: "data".to_string(),
            key: "timeout_secs".to_string(),
            reason: "timeout_secs must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_years(config: &dyn ConfigPort, current_year: i32) -> Result<(), ProfitError> {
    let first = first_year(config)?;
    let last = last_year(config, current_year)?;
    if first > last {
        return Err(ProfitError::ConfigInvalid {
            section: "calendar".to_string(),
            key: "first_year".to_string(),
            reason: "first_year must not be after last_year".to_string(),
        });
    }
    Ok(())
}

fn parse_extra_holidays(config: &dyn ConfigPort) -> Result<Vec<NaiveDate>, ProfitError> {
    let Some(raw) = config.get_string("calendar", "extra_holidays") else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ProfitError::ConfigInvalid {
                section: "calendar".to_string(),
                key: "extra_holidays".to_string(),
                reason: format!("invalid date '{s}', expected YYYY-MM-DD"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapConfig(HashMap<(String, String), String>);

    impl MapConfig {
        fn new(entries: &[(&str, &str, &str)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(s, k, v)| ((s.to_string(), k.to_string()), v.to_string()))
                    .collect(),
            )
        }
    }

    impl ConfigPort for MapConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.0.get(&(section.to_string(), key.to_string())).cloned()
        }

        fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
    }

    #[test]
    fn defaults_when_empty() {
        let config = build_app_config(&MapConfig::new(&[]), 2026).unwrap();
        assert_eq!(config.listen, DEFAULT_LISTEN);
        assert_eq!(config.static_dir, PathBuf::from("static"));
        assert_eq!(config.tickers_path, PathBuf::from("static/tickers.json"));
        assert_eq!(config.first_year, 1990);
        assert_eq!(config.last_year, 2027);
        assert_eq!(
            config.provider,
            DataProvider::Yahoo {
                base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
                timeout_secs: 10,
            }
        );
        assert!(config.extra_holidays.is_empty());
    }

    #[test]
    fn csv_provider_with_dir() {
        let config = build_app_config(
            &MapConfig::new(&[("data", "provider", "CSV"), ("data", "csv_dir", "/tmp/prices")]),
            2026,
        )
        .unwrap();
        assert_eq!(
            config.provider,
            DataProvider::Csv {
                dir: PathBuf::from("/tmp/prices")
            }
        );
    }

    #[test]
    fn unknown_provider_is_invalid() {
        let err = validate_app_config(&MapConfig::new(&[("data", "provider", "bloomberg")]), 2026)
            .unwrap_err();
        assert!(matches!(err, ProfitError::ConfigInvalid { key, .. } if key == "provider"));
    }

    #[test]
    fn non_positive_timeout_is_invalid() {
        let err = validate_app_config(&MapConfig::new(&[("data", "timeout_secs", "0")]), 2026)
            .unwrap_err();
        assert!(matches!(err, ProfitError::ConfigInvalid { key, .. } if key == "timeout_secs"));
    }

    #[test]
    fn reversed_years_are_invalid() {
        let err = validate_app_config(
            &MapConfig::new(&[("calendar", "first_year", "2030"), ("calendar", "last_year", "2020")]),
            2026,
        )
        .unwrap_err();
        assert!(matches!(err, ProfitError::ConfigInvalid { section, .. } if section == "calendar"));
    }

    #[test]
    fn years_out_of_range_are_invalid() {
        let err = validate_app_config(&MapConfig::new(&[("calendar", "last_year", "1800")]), 2026)
            .unwrap_err();
        assert!(matches!(err, ProfitError::ConfigInvalid { key, .. } if key == "last_year"));
    }

    #[test]
    fn oversized_year_is_not_truncated_into_range() {
        // 4294969296 = 2^32 + 2000; a narrowing cast would read it as 2000.
        let err = build_app_config(
            &MapConfig::new(&[("calendar", "first_year", "4294969296")]),
            2026,
        )
        .unwrap_err();
        assert!(matches!(err, ProfitError::ConfigInvalid { key, .. } if key == "first_year"));
    }

    #[test]
    fn extra_holidays_are_parsed_into_calendar() {
        let config = build_app_config(
            &MapConfig::new(&[
                ("calendar", "first_year", "2025"),
                ("calendar", "last_year", "2025"),
                ("calendar", "extra_holidays", "2025-01-09, 2025-03-14"),
            ]),
            2026,
        )
        .unwrap();
        let calendar = config.calendar();
        assert!(calendar.is_holiday(NaiveDate::from_ymd_opt(2025, 1, 9).unwrap()));
        assert!(calendar.is_holiday(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()));
        assert!(calendar.is_holiday(NaiveDate::from_ymd_opt(2025, 7, 4).unwrap()));
    }

    #[test]
    fn bad_extra_holiday_is_invalid() {
        let err = validate_app_config(
            &MapConfig::new(&[("calendar", "extra_holidays", "2025-01-09, someday")]),
            2026,
        )
        .unwrap_err();
        assert!(err.to_string().contains("someday"));
    }
}
