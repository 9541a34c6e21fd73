//! Persisted bar series with idempotent append.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tickbar_resample::{Bar, Ohlc};
use tickbar_types::{BucketWidth, Result, Symbol, TickbarError};
use tracing::info;

/// Result of one append operation.
#[derive(Debug, Clone)]
pub struct AppendOutcome {
    /// The series file that was written.
    pub path: PathBuf,
    /// Whether the file was created by this append.
    pub created: bool,
    /// Rows actually added (new timestamps).
    pub added: usize,
    /// Total rows in the series after the append.
    pub total: usize,
}

/// Flat CSV store of bar series, one file per (symbol, bucket width).
#[derive(Debug, Clone)]
pub struct BarStore {
    root: PathBuf,
}

impl BarStore {
    /// Creates a store rooted at the given directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the store's root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the series file path for a (symbol, width) pair.
    #[must_use]
    pub fn path_for(&self, symbol: &Symbol, width: BucketWidth) -> PathBuf {
        self.root.join(format!("{}_{}.csv", symbol.code(), width))
    }

    /// Loads a persisted series, or `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or a row is malformed.
    pub fn load(&self, path: &Path) -> Result<Option<(String, Vec<Bar>)>> {
        if !path.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(path)?);
        let mut lines = reader.lines();
        let header = match lines.next() {
            Some(line) => line?,
            None => return Ok(Some((String::new(), Vec::new()))),
        };

        let columns = header.split(',').count();
        let mut bars = Vec::new();
        for (index, line) in lines.enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let bar = parse_bar_row(&line, columns).map_err(|reason| {
                TickbarError::Parse(format!("{path:?} line {}: {reason}", index + 2))
            })?;
            bars.push(bar);
        }
        Ok(Some((header, bars)))
    }

    /// Merges new bars into the persisted series for (symbol, width).
    ///
    /// With no existing file the bars are written as-is. Otherwise the
    /// existing series is loaded, its header is required to match the
    /// incoming schema exactly, and the merged result (existing rows win on
    /// timestamp conflicts) replaces the whole file. Re-appending the same
    /// bars is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TickbarError::SchemaMismatch`] when the persisted header
    /// differs from the incoming one, or an I/O/parse error.
    pub fn append(
        &self,
        symbol: &Symbol,
        width: BucketWidth,
        new_bars: &[Bar],
        with_spread: bool,
    ) -> Result<AppendOutcome> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.path_for(symbol, width);
        let incoming = bar_header(with_spread);

        let (merged, created, added) = match self.load(&path)? {
            None => (new_bars.to_vec(), true, new_bars.len()),
            Some((existing_header, existing)) => {
                if existing_header != incoming {
                    return Err(TickbarError::SchemaMismatch {
                        path,
                        existing: existing_header,
                        incoming: incoming.to_string(),
                    });
                }
                let before = existing.len();
                let merged = merge_series(existing, new_bars);
                let added = merged.len() - before;
                (merged, false, added)
            }
        };

        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        write_bars(&mut writer, &merged, with_spread)?;
        writer.flush()?;

        info!(
            path = %path.display(),
            added,
            total = merged.len(),
            "persisted bar series"
        );
        Ok(AppendOutcome {
            path,
            created,
            added,
            total: merged.len(),
        })
    }
}

/// Merges new bars into an existing series.
///
/// Old rows win on timestamp conflicts; the result is unique and ascending
/// by timestamp. Idempotent: merging the same bars twice changes nothing.
#[must_use]
pub fn merge_series(existing: Vec<Bar>, new_bars: &[Bar]) -> Vec<Bar> {
    let mut seen: HashSet<i64> = existing
        .iter()
        .map(|bar| bar.timestamp.timestamp_millis())
        .collect();

    let mut merged = existing;
    for bar in new_bars {
        if seen.insert(bar.timestamp.timestamp_millis()) {
            merged.push(*bar);
        }
    }
    merged.sort_by_key(|bar| bar.timestamp);
    merged
}

/// The CSV header for a bar series.
const fn bar_header(with_spread: bool) -> &'static str {
    if with_spread {
        "timestamp,open,high,low,close,volume,spread"
    } else {
        "timestamp,open,high,low,close,volume"
    }
}

/// Writes bars as CSV. Empty buckets leave their OHLC/spread cells blank.
///
/// Timestamps keep millisecond precision: tick-width bars carry sub-second
/// starts, and truncating them would break append idempotence on re-runs.
fn write_bars<W: Write>(writer: &mut W, bars: &[Bar], with_spread: bool) -> std::io::Result<()> {
    writeln!(writer, "{}", bar_header(with_spread))?;
    for bar in bars {
        let (open, high, low, close) = match bar.ohlc {
            Some(ohlc) => (
                ohlc.open.to_string(),
                ohlc.high.to_string(),
                ohlc.low.to_string(),
                ohlc.close.to_string(),
            ),
            None => Default::default(),
        };
        write!(
            writer,
            "{},{open},{high},{low},{close},{}",
            bar.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            bar.volume
        )?;
        if with_spread {
            let spread = bar.spread.map(|s| s.to_string()).unwrap_or_default();
            write!(writer, ",{spread}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Parses one persisted bar row.
fn parse_bar_row(line: &str, columns: usize) -> std::result::Result<Bar, String> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != columns {
        return Err(format!(
            "expected {columns} fields, got {}",
            fields.len()
        ));
    }

    let timestamp = DateTime::parse_from_rfc3339(fields[0])
        .map_err(|e| format!("bad timestamp '{}': {e}", fields[0]))?
        .with_timezone(&Utc);

    let prices = &fields[1..5];
    let ohlc = if prices.iter().all(|f| f.is_empty()) {
        None
    } else {
        let mut values = [0.0f64; 4];
        for (slot, field) in values.iter_mut().zip(prices) {
            *slot = field
                .parse()
                .map_err(|_| format!("bad price '{field}'"))?;
        }
        Some(Ohlc::new(values[0], values[1], values[2], values[3]))
    };

    let volume: u64 = fields[5]
        .parse()
        .map_err(|_| format!("bad volume '{}'", fields[5]))?;

    let spread = match fields.get(6) {
        None => None,
        Some(field) if field.is_empty() => None,
        Some(field) => Some(
            field
                .parse()
                .map_err(|_| format!("bad spread '{field}'"))?,
        ),
    };

    Ok(Bar::new(timestamp, ohlc, volume, spread))
}
