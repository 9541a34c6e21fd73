//! Bid/ask stream merging.

use chrono::{DateTime, Utc};
use std::io::Write;

use tickbar_types::{Result, Side, SideSeries, Tick, TickbarError};
use tracing::debug;

/// Options controlling the merge.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    /// Populate the per-row spread column as `|ask_price - bid_price|`.
    pub compute_spread: bool,
}

/// One row of the merged, forward-filled tick table.
///
/// Every field except `spread` is guaranteed present: rows that could not be
/// completed by forward-fill are dropped during the merge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedTick {
    /// Quote instant (UTC).
    pub timestamp: DateTime<Utc>,
    /// Most recent ask price at or before this instant.
    pub ask_price: f64,
    /// Notional volume at the ask.
    pub ask_size: f64,
    /// Most recent bid price at or before this instant.
    pub bid_price: f64,
    /// Notional volume at the bid.
    pub bid_size: f64,
    /// `|ask_price - bid_price|`, when requested at merge time.
    pub spread: Option<f64>,
}

impl MergedTick {
    /// Returns the mid price (average of ask and bid).
    #[must_use]
    pub fn mid(&self) -> f64 {
        (self.ask_price + self.bid_price) / 2.0
    }
}

/// Columns available when projecting the merged table to delimited output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergedColumn {
    /// `ask_price`
    AskPrice,
    /// `ask_size`
    AskSize,
    /// `bid_price`
    BidPrice,
    /// `bid_size`
    BidSize,
    /// `spread`
    Spread,
}

impl MergedColumn {
    /// Returns the column header name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AskPrice => "ask_price",
            Self::AskSize => "ask_size",
            Self::BidPrice => "bid_price",
            Self::BidSize => "bid_size",
            Self::Spread => "spread",
        }
    }

    /// The projection used by downstream integrity checks.
    #[must_use]
    pub const fn default_projection() -> &'static [Self] {
        &[Self::AskPrice, Self::BidPrice, Self::Spread]
    }

    /// All columns.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::AskPrice,
            Self::AskSize,
            Self::BidPrice,
            Self::BidSize,
            Self::Spread,
        ]
    }

    fn value(&self, row: &MergedTick) -> String {
        match self {
            Self::AskPrice => row.ask_price.to_string(),
            Self::AskSize => row.ask_size.to_string(),
            Self::BidPrice => row.bid_price.to_string(),
            Self::BidSize => row.bid_size.to_string(),
            Self::Spread => row.spread.map(|s| s.to_string()).unwrap_or_default(),
        }
    }
}

/// The merged tick table: unique ascending timestamps, complete rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    rows: Vec<MergedTick>,
    has_spread: bool,
}

impl MergedTable {
    /// Returns the merged rows in timestamp order.
    #[must_use]
    pub fn rows(&self) -> &[MergedTick] {
        &self.rows
    }

    /// Returns true if the spread column was computed.
    #[must_use]
    pub const fn has_spread(&self) -> bool {
        self.has_spread
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the table as delimited text restricted to the given columns.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_csv<W: Write>(&self, mut writer: W, columns: &[MergedColumn]) -> std::io::Result<()> {
        write!(writer, "timestamp")?;
        for column in columns {
            write!(writer, ",{}", column.as_str())?;
        }
        writeln!(writer)?;

        for row in &self.rows {
            write!(writer, "{}", row.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"))?;
            for column in columns {
                write!(writer, ",{}", column.value(row))?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}

/// Merges bid and ask series into one chronologically ordered table.
///
/// Per-file series are concatenated in the order given (ascending hour
/// chunks are the caller's responsibility; out-of-order input yields
/// undefined row order, it is not corrected here). Timestamps are
/// outer-joined; the side missing at a joined instant is forward-filled from
/// its most recent prior observation. Rows before both sides have been
/// observed are dropped, so every retained row is complete. Duplicate
/// timestamps within a side collapse to the last quote for that instant.
///
/// # Errors
///
/// Returns [`TickbarError::EmptyInput`] if either side has zero records
/// after concatenation.
pub fn merge(
    bids: &[SideSeries],
    asks: &[SideSeries],
    options: MergeOptions,
) -> Result<MergedTable> {
    let bid_ticks = concat(Side::Bid, bids)?;
    let ask_ticks = concat(Side::Ask, asks)?;

    let mut rows = Vec::with_capacity(bid_ticks.len().max(ask_ticks.len()));
    let mut last_ask: Option<(f64, f64)> = None;
    let mut last_bid: Option<(f64, f64)> = None;
    let mut dropped = 0usize;
    let (mut i, mut j) = (0usize, 0usize);

    while i < ask_ticks.len() || j < bid_ticks.len() {
        let next_ask = ask_ticks.get(i).map(|t| t.timestamp_ms);
        let next_bid = bid_ticks.get(j).map(|t| t.timestamp_ms);
        let instant_ms = match (next_ask, next_bid) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => break,
        };

        while i < ask_ticks.len() && ask_ticks[i].timestamp_ms == instant_ms {
            last_ask = Some((ask_ticks[i].price, ask_ticks[i].size));
            i += 1;
        }
        while j < bid_ticks.len() && bid_ticks[j].timestamp_ms == instant_ms {
            last_bid = Some((bid_ticks[j].price, bid_ticks[j].size));
            j += 1;
        }

        match (last_ask, last_bid) {
            (Some((ask_price, ask_size)), Some((bid_price, bid_size))) => {
                let spread = options.compute_spread.then(|| (ask_price - bid_price).abs());
                rows.push(MergedTick {
                    timestamp: DateTime::from_timestamp_millis(instant_ms)
                        .unwrap_or(DateTime::<Utc>::MIN_UTC),
                    ask_price,
                    ask_size,
                    bid_price,
                    bid_size,
                    spread,
                });
            }
            // Leading gap: one side has no prior observation yet.
            _ => dropped += 1,
        }
    }

    debug!(
        rows = rows.len(),
        dropped,
        "merged bid/ask streams"
    );
    Ok(MergedTable {
        rows,
        has_spread: options.compute_spread,
    })
}

/// Concatenates per-file series for one side, preserving order.
fn concat(side: Side, series: &[SideSeries]) -> Result<Vec<Tick>> {
    let mut ticks = Vec::with_capacity(series.iter().map(SideSeries::len).sum());
    for part in series {
        debug_assert_eq!(part.side, side);
        ticks.extend_from_slice(&part.ticks);
    }
    if ticks.is_empty() {
        return Err(TickbarError::EmptyInput(side));
    }
    Ok(ticks)
}
