//! Tick data representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Side of the book a tick file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Bid (buy) quotes.
    Bid,
    /// Ask (offer) quotes.
    Ask,
}

impl Side {
    /// Returns the substring that marks this side in source file names.
    #[must_use]
    pub const fn marker(&self) -> &'static str {
        match self {
            Self::Bid => "BID",
            Self::Ask => "ASK",
        }
    }

    /// Returns the opposite side.
    #[must_use]
    pub const fn other(&self) -> Self {
        match self {
            Self::Bid => Self::Ask,
            Self::Ask => Self::Bid,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bid => write!(f, "bid"),
            Self::Ask => write!(f, "ask"),
        }
    }
}

/// A single quote event as read from an hourly tick file.
///
/// The timestamp is kept as raw UTC epoch milliseconds, exactly as it
/// appears in the source file; [`Tick::instant`] interprets it as a
/// timezone-aware instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Event time as UTC epoch milliseconds.
    pub timestamp_ms: i64,
    /// Quoted price (> 0).
    pub price: f64,
    /// Notional volume available at the price (>= 0).
    pub size: f64,
}

impl Tick {
    /// Creates a new tick.
    #[must_use]
    pub const fn new(timestamp_ms: i64, price: f64, size: f64) -> Self {
        Self {
            timestamp_ms,
            price,
            size,
        }
    }

    /// Interprets the raw epoch index as a UTC instant.
    ///
    /// The parser rejects timestamps outside chrono's representable range,
    /// so this saturates rather than fails on hand-built ticks.
    #[must_use]
    pub fn instant(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp_ms).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// An ordered run of ticks for one side of one symbol.
///
/// Ticks are ascending by timestamp within each source file. Concatenating
/// several hour files preserves file order; suppliers must pass files in
/// ascending hour order or downstream row order is undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct SideSeries {
    /// Which side the ticks belong to.
    pub side: Side,
    /// The ticks, in source order.
    pub ticks: Vec<Tick>,
}

impl SideSeries {
    /// Creates an empty series for the given side.
    #[must_use]
    pub const fn new(side: Side) -> Self {
        Self {
            side,
            ticks: Vec::new(),
        }
    }

    /// Returns the number of ticks in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    /// Returns true if the series holds no ticks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_side_marker() {
        assert_eq!(Side::Bid.marker(), "BID");
        assert_eq!(Side::Ask.marker(), "ASK");
        assert_eq!(Side::Bid.other(), Side::Ask);
    }

    #[test]
    fn test_tick_instant() {
        let tick = Tick::new(1_640_995_200_000, 1.1370, 1_000_000.0);
        let expected = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(tick.instant(), expected);
    }

    #[test]
    fn test_tick_instant_millis() {
        let tick = Tick::new(1_640_995_200_123, 1.1370, 0.0);
        assert_eq!(tick.instant().timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_side_series() {
        let mut series = SideSeries::new(Side::Bid);
        assert!(series.is_empty());
        series.ticks.push(Tick::new(0, 1.0, 0.0));
        assert_eq!(series.len(), 1);
    }
}
