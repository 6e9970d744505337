use crate::models::MatchRule;
use std::fs;
use std::num::IntErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Name of the configuration file looked up inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "parameters.conf";

/// Byte position of the `=` separator on every configuration line
const SEPARATOR_POSITION: usize = 7;

const PREFIX: usize = 0;
const EXTENSION: usize = 1;
const INTERVAL_MS: usize = 2;
const SEARCH_ROOT: usize = 3;
const DESTINATION_ROOT: usize = 4;

/// Janitor configuration - immutable once loaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    pub prefix: String,
    pub extension: String,
    pub interval_ms: u64,
    pub search_root: PathBuf,
    pub destination_root: PathBuf,
}

impl Configuration {
    pub fn new(
        prefix: impl Into<String>,
        extension: impl Into<String>,
        interval_ms: u64,
        search_root: impl Into<PathBuf>,
        destination_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into(),
            interval_ms,
            search_root: search_root.into(),
            destination_root: destination_root.into(),
        }
    }

    /// Load `parameters.conf` from the given directory.
    ///
    /// Never fails: a missing or unreadable file yields the all-empty
    /// configuration, which turns every scan cycle into a no-op.
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Self {
        let path = config_dir.as_ref().join(CONFIG_FILE_NAME);

        match fs::read(&path) {
            Ok(bytes) => {
                debug!("Loaded configuration file {:?}", path);
                Self::parse(&String::from_utf8_lossy(&bytes))
            }
            Err(e) => {
                warn!("Could not read configuration file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Parse the five positional `<7-char key>=<value>` lines.
    /// Pure function
    pub fn parse(text: &str) -> Self {
        let mut values: [&str; 5] = [""; 5];

        for (index, line) in text.lines().take(values.len()).enumerate() {
            values[index] = line_value(line);
        }

        Self {
            prefix: values[PREFIX].to_string(),
            extension: values[EXTENSION].to_string(),
            interval_ms: parse_interval(values[INTERVAL_MS]),
            search_root: PathBuf::from(values[SEARCH_ROOT]),
            destination_root: PathBuf::from(values[DESTINATION_ROOT]),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Active rules in evaluation order: prefix first, then extension
    pub fn active_rules(&self) -> Vec<MatchRule> {
        [
            MatchRule::Prefix(self.prefix.clone()),
            MatchRule::Extension(self.extension.clone()),
        ]
        .into_iter()
        .filter(MatchRule::is_active)
        .collect()
    }
}

/// Value of a single line: everything after the separator, or empty when the
/// separator is not where it belongs.
fn line_value(line: &str) -> &str {
    let line = line.strip_suffix('\r').unwrap_or(line);

    match line.as_bytes().get(SEPARATOR_POSITION) {
        Some(b'=') => line.get(SEPARATOR_POSITION + 1..).unwrap_or_default(),
        _ => "",
    }
}

/// Leading decimal digits after optional whitespace; no digits reads as 0 and
/// an out-of-range number saturates at `u64::MAX`.
fn parse_interval(value: &str) -> u64 {
    let value = value.trim_start();
    let digits_end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());

    match value[..digits_end].parse::<u64>() {
        Ok(interval) => interval,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
            warn!("Interval {:?} is out of range, using {} ms", value, u64::MAX);
            u64::MAX
        }
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
PREFIX_=abc
FILETYP=.txt
TIME_MS=1500
DIRSRCH=/data/in
DIRCOPY=/data/out/
";

    #[test]
    fn test_parse_full_file() {
        let config = Configuration::parse(SAMPLE);
        assert_eq!(config.prefix, "abc");
        assert_eq!(config.extension, ".txt");
        assert_eq!(config.interval_ms, 1500);
        assert_eq!(config.search_root, PathBuf::from("/data/in"));
        assert_eq!(config.destination_root, PathBuf::from("/data/out/"));
    }

    #[test]
    fn test_missing_separator_yields_empty_value() {
        let config = Configuration::parse("PREFIX: abc\nFILETYP=.log\n");
        assert_eq!(config.prefix, "");
        assert_eq!(config.extension, ".log");
    }

    #[test]
    fn test_short_lines_yield_empty_values() {
        let config = Configuration::parse("PREFIX\n\nTIME_MS=\n");
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn test_short_file_leaves_remaining_fields_empty() {
        let config = Configuration::parse("PREFIX_=abc\n");
        assert_eq!(config.prefix, "abc");
        assert_eq!(config.interval_ms, 0);
        assert_eq!(config.search_root, PathBuf::new());
    }

    #[test]
    fn test_crlf_lines_are_trimmed() {
        let config = Configuration::parse("PREFIX_=abc\r\nFILETYP=.csv\r\n");
        assert_eq!(config.prefix, "abc");
        assert_eq!(config.extension, ".csv");
    }

    #[test]
    fn test_bare_carriage_return_on_last_line() {
        let config = Configuration::parse("PREFIX_=abc\nFILETYP=.csv\r");
        assert_eq!(config.extension, ".csv");
    }

    #[test]
    fn test_extra_lines_are_ignored() {
        let text = format!("{SAMPLE}EXTRA__=ignored\n");
        assert_eq!(Configuration::parse(&text), Configuration::parse(SAMPLE));
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("250"), 250);
        assert_eq!(parse_interval("  42ms"), 42);
        assert_eq!(parse_interval("soon"), 0);
        assert_eq!(parse_interval(""), 0);
        assert_eq!(parse_interval("-5"), 0);
    }

    #[test]
    fn test_overflowing_interval_saturates() {
        assert_eq!(parse_interval("18446744073709551615"), u64::MAX);
        assert_eq!(parse_interval("99999999999999999999999"), u64::MAX);

        let config = Configuration::parse("PREFIX_=\nFILETYP=\nTIME_MS=123456789012345678901234\n");
        assert_eq!(config.interval_ms, u64::MAX);
    }

    #[test]
    fn test_active_rules_order_and_filtering() {
        let config = Configuration::new("abc", ".txt", 0, "/in", "/out");
        assert_eq!(
            config.active_rules(),
            vec![
                MatchRule::Prefix("abc".to_string()),
                MatchRule::Extension(".txt".to_string())
            ]
        );

        let config = Configuration::new("", ".txt", 0, "/in", "/out");
        assert_eq!(config.active_rules(), vec![MatchRule::Extension(".txt".to_string())]);

        assert!(Configuration::default().active_rules().is_empty());
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Configuration::load(dir.path()), Configuration::default());
    }

    #[test]
    fn test_load_reads_parameters_conf() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), SAMPLE).unwrap();
        assert_eq!(Configuration::load(dir.path()).prefix, "abc");
    }
}
