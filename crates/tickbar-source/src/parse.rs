//! Delimited tick file parsing.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use thiserror::Error;
use tickbar_types::{Side, SideSeries, Tick, TickbarError};
use tracing::debug;

use crate::SourceConfig;

/// Lines shorter than this are truncation noise and skipped silently.
const MIN_LINE_BYTES: usize = 10;

/// Errors that can occur while parsing a tick file.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The file has neither a `.gz` nor the configured plain extension.
    #[error("unrecognized tick file extension: {0:?}")]
    UnknownExtension(PathBuf),

    /// A row failed numeric coercion or violated a value range.
    #[error("{path:?} line {line}: {reason}")]
    Row {
        /// The offending file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What went wrong with the row.
        reason: String,
    },

    /// The file could not be read.
    #[error("failed to read {path:?}: {source}")]
    Io {
        /// The unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl From<ParseError> for TickbarError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Parses one tick file into a side series.
///
/// Two encodings are supported: gzip-compressed delimited text (no header)
/// and plain delimited text with a header row. Rows are fixed-order
/// `timestamp_ms, price, size`; all three fields must coerce to numeric.
/// A row that does not coerce fails the whole file so corrupt input
/// surfaces instead of silently producing wrong bars.
///
/// # Errors
///
/// Returns [`ParseError`] on an unrecognized extension, an unreadable file,
/// or a malformed row.
pub fn parse_file(path: &Path, side: Side, config: &SourceConfig) -> Result<SideSeries, ParseError> {
    let name = path.to_string_lossy();
    let io_err = |source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let (reader, has_header): (Box<dyn BufRead>, bool) = if name.ends_with(".gz") {
        (Box::new(BufReader::new(GzDecoder::new(file))), false)
    } else if name.ends_with(&config.extension) {
        (Box::new(BufReader::new(file)), true)
    } else {
        return Err(ParseError::UnknownExtension(path.to_path_buf()));
    };

    let mut series = SideSeries::new(side);
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(io_err)?;
        let number = index + 1;
        if has_header && number == 1 {
            continue;
        }
        if line.len() <= MIN_LINE_BYTES {
            continue;
        }
        let tick = parse_row(line.trim(), config.delimiter).map_err(|reason| ParseError::Row {
            path: path.to_path_buf(),
            line: number,
            reason,
        })?;
        series.ticks.push(tick);
    }

    debug!(file = %name, side = %side, ticks = series.len(), "parsed tick file");
    Ok(series)
}

/// Parses one `timestamp_ms, price, size` row.
fn parse_row(line: &str, delimiter: char) -> Result<Tick, String> {
    let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
    if fields.len() != 3 {
        return Err(format!("expected 3 fields, got {}", fields.len()));
    }

    let timestamp_ms = parse_timestamp(fields[0])?;
    let price = parse_number(fields[1], "price")?;
    let size = parse_number(fields[2], "size")?;

    if price <= 0.0 {
        return Err(format!("price must be positive, got {price}"));
    }
    if size < 0.0 {
        return Err(format!("size must be non-negative, got {size}"));
    }

    Ok(Tick::new(timestamp_ms, price, size))
}

/// Coerces a timestamp field to epoch milliseconds.
///
/// Integer values are taken as-is; float values are rounded (some exports
/// write `1621555200000.0`). The result must be representable as a UTC
/// instant.
fn parse_timestamp(field: &str) -> Result<i64, String> {
    let millis = match field.parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            let value: f64 = field
                .parse()
                .map_err(|_| format!("timestamp '{field}' is not numeric"))?;
            if !value.is_finite() {
                return Err(format!("timestamp '{field}' is not finite"));
            }
            value.round() as i64
        }
    };

    if millis < 0 || chrono_representable(millis).is_none() {
        return Err(format!("timestamp {millis} is out of range"));
    }
    Ok(millis)
}

fn chrono_representable(millis: i64) -> Option<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::from_timestamp_millis(millis)
}

/// Coerces a price or size field to a finite float.
fn parse_number(field: &str, column: &str) -> Result<f64, String> {
    let value: f64 = field
        .parse()
        .map_err(|_| format!("{column} '{field}' is not numeric"))?;
    if !value.is_finite() {
        return Err(format!("{column} '{field}' is not finite"));
    }
    Ok(value)
}
