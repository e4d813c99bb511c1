//! INI file configuration adapter.

use crate::domain::error::ProfitError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProfitError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| ProfitError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, ProfitError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| ProfitError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    /// Blank values (`key =`) read as absent so defaults apply.
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[web]
listen = 0.0.0.0:8080

[data]
provider = csv
csv_dir = /var/lib/prices
timeout_secs = 15

[calendar]
first_year = 2000
extra_holidays =
"#;

    #[test]
    fn reads_strings_and_ints() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("web", "listen"), Some("0.0.0.0:8080".to_string()));
        assert_eq!(adapter.get_string("data", "provider"), Some("csv".to_string()));
        assert_eq!(adapter.get_int("data", "timeout_secs", 10), 15);
        assert_eq!(adapter.get_int("calendar", "first_year", 1990), 2000);
    }

    #[test]
    fn blank_value_reads_as_missing() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("calendar", "extra_holidays"), None);
    }

    #[test]
    fn missing_keys_fall_back() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("tickers", "path"), None);
        assert_eq!(adapter.get_int("calendar", "last_year", 2027), 2027);
    }

    #[test]
    fn non_numeric_int_falls_back() {
        let adapter = FileConfigAdapter::from_string("[data]\ntimeout_secs = soon\n").unwrap();
        assert_eq!(adapter.get_int("data", "timeout_secs", 10), 10);
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[tickers]\npath = /srv/tickers.json\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("tickers", "path"),
            Some("/srv/tickers.json".to_string())
        );
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/profit.ini");
        assert!(matches!(result, Err(ProfitError::ConfigParse { file, .. }) if file.contains("profit.ini")));
    }
}
