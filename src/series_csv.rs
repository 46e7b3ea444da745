//! CSV Series Loader
//!
//! Reads `timestamp,value` files into [`RawSeries`]. Extra columns are
//! ignored and a header row is detected by its unparseable timestamp.
//!
//! Accepted timestamp forms:
//! - epoch seconds, integer or fractional
//! - epoch milliseconds (values above 10¹⁰)
//! - RFC 3339 / ISO 8601 with offset (`2024-03-01T12:00:00+01:00`)
//! - naive ISO 8601, read as UTC (`2024-03-01 12:00:00`)
//!
//! # Usage
//!
//! ```ignore
//! use watervalue::series_csv::load_series;
//!
//! let production = load_series("data/saurdal_production.csv")?;
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::types::RawSeries;

/// Epoch values above this are taken to be milliseconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 10_000_000_000.0;

#[derive(Debug, Error)]
pub enum SeriesCsvError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("no data rows found")]
    Empty,
}

// ============================================================================
// CSV Quote-Aware Parsing
// ============================================================================

/// Split a CSV line on commas, honouring double quotes and `""` escapes.
fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

// ============================================================================
// Field Parsing
// ============================================================================

/// Parse a timestamp cell into epoch seconds.
pub fn parse_timestamp(s: &str) -> Result<f64, String> {
    let s = s.trim().trim_matches('"');
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Err("empty timestamp".to_string());
    }

    if let Ok(epoch) = s.parse::<f64>() {
        if !epoch.is_finite() {
            return Err(format!("non-finite timestamp '{s}'"));
        }
        return Ok(if epoch.abs() > EPOCH_MILLIS_THRESHOLD {
            epoch / 1_000.0
        } else {
            epoch
        });
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp() as f64);
    }
    // "2024-03-01 12:00:00+00:00" as written by pandas
    if let Ok(dt) = chrono::DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.timestamp() as f64);
    }

    for fmt in &[
        "%Y-%m-%dT%H:%M:%S%.fZ",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.and_utc().timestamp() as f64);
        }
    }

    Err(format!("cannot parse timestamp '{s}'"))
}

/// Parse a value cell; blank and `nan`/`null` cells are missing.
fn parse_value(s: &str) -> Option<Result<f64, String>> {
    let s = s.trim().trim_matches('"');
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null") {
        return None;
    }
    Some(
        s.parse::<f64>()
            .map_err(|_| format!("cannot parse value '{s}'")),
    )
}

// ============================================================================
// Loading
// ============================================================================

/// Load a series from a CSV file.
pub fn load_series(path: impl AsRef<Path>) -> Result<RawSeries, SeriesCsvError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| SeriesCsvError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        lines.push(line.map_err(|source| SeriesCsvError::Io {
            path: path.display().to_string(),
            source,
        })?);
    }
    let series = parse_series(lines.iter().map(String::as_str))?;
    debug!(path = %path.display(), samples = series.len(), "Series loaded");
    Ok(series)
}

/// Parse `timestamp,value` lines. Rows with a missing value are skipped.
pub fn parse_series<'a>(
    lines: impl IntoIterator<Item = &'a str>,
) -> Result<RawSeries, SeriesCsvError> {
    let mut series = RawSeries::default();
    let mut skipped = 0usize;
    let mut first_row = true;

    for (idx, line) in lines.into_iter().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields = csv_split(line);
        let is_first = std::mem::replace(&mut first_row, false);

        let timestamp = match parse_timestamp(&fields[0]) {
            Ok(ts) => ts,
            Err(_) if is_first => continue, // header
            Err(message) => {
                return Err(SeriesCsvError::Parse {
                    line: line_no,
                    message,
                })
            }
        };

        let Some(cell) = fields.get(1) else {
            return Err(SeriesCsvError::Parse {
                line: line_no,
                message: "expected 'timestamp,value'".to_string(),
            });
        };
        match parse_value(cell) {
            Some(Ok(value)) => {
                series.timestamps.push(timestamp);
                series.values.push(value);
            }
            Some(Err(message)) => {
                return Err(SeriesCsvError::Parse {
                    line: line_no,
                    message,
                })
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, "Rows without a value were skipped");
    }
    if series.is_empty() {
        return Err(SeriesCsvError::Empty);
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_csv_split_quoted() {
        assert_eq!(
            csv_split(r#""2024-01-01 00:00:00",12.5,"a ""quoted"", b""#),
            vec!["2024-01-01 00:00:00", "12.5", r#"a "quoted", b"#]
        );
    }

    #[test]
    fn test_parse_timestamp_forms() {
        assert_eq!(parse_timestamp("1699920000").unwrap(), 1_699_920_000.0);
        assert_eq!(parse_timestamp("1699920000000").unwrap(), 1_699_920_000.0);
        assert_eq!(parse_timestamp("1699920000.5").unwrap(), 1_699_920_000.5);
        assert_eq!(
            parse_timestamp("2023-11-14T00:00:00Z").unwrap(),
            1_699_920_000.0
        );
        assert_eq!(
            parse_timestamp("2023-11-14T01:00:00+01:00").unwrap(),
            1_699_920_000.0
        );
        assert_eq!(
            parse_timestamp("2023-11-14 00:00:00+00:00").unwrap(),
            1_699_920_000.0
        );
        assert_eq!(
            parse_timestamp("2023-11-14 00:04").unwrap(),
            1_699_920_240.0
        );
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn test_header_skipped_and_blank_values_dropped() {
        let lines = [
            "timestamp,production_mw",
            "2023-11-14T00:00:00Z,100.0",
            "2023-11-14T00:04:00Z,",
            "2023-11-14T00:08:00Z,120",
        ];
        let series = parse_series(lines).unwrap();
        assert_eq!(series.timestamps, vec![1_699_920_000.0, 1_699_920_480.0]);
        assert_eq!(series.values, vec![100.0, 120.0]);
    }

    #[test]
    fn test_bad_timestamp_after_header_is_error() {
        let lines = ["timestamp,value", "1699920000,1.0", "oops,2.0"];
        match parse_series(lines) {
            Err(SeriesCsvError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_value_column() {
        assert!(matches!(
            parse_series(["1699920000"]),
            Err(SeriesCsvError::Parse { .. })
        ));
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(
            parse_series(["timestamp,value"]),
            Err(SeriesCsvError::Empty)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timestamp,price").unwrap();
        writeln!(file, "1699920000,35.2").unwrap();
        writeln!(file, "1699923600,41.0").unwrap();
        let series = load_series(file.path()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.values[1], 41.0);
    }
}
