//! Resampled bar data structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLC values of the rounded mid price within one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlc {
    /// Mid price of the first tick in the bucket.
    pub open: f64,
    /// Highest mid price in the bucket.
    pub high: f64,
    /// Lowest mid price in the bucket.
    pub low: f64,
    /// Mid price of the last tick in the bucket.
    pub close: f64,
}

impl Ohlc {
    /// Creates OHLC values.
    #[must_use]
    pub const fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
        }
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns the body size (|close - open|).
    #[must_use]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Returns true if this is a bullish (green) bar.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Returns true if this is a bearish (red) bar.
    #[must_use]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// One resampled output row.
///
/// An empty bucket carries no OHLC or spread and a volume of zero; whether
/// such bars survive is decided by the missing-data policy applied after
/// resampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bucket start (UTC).
    pub timestamp: DateTime<Utc>,
    /// OHLC of the rounded mid price, absent for empty buckets.
    pub ohlc: Option<Ohlc>,
    /// Number of ticks in the bucket.
    pub volume: u64,
    /// Mean per-tick spread in the bucket, when spread was computed.
    pub spread: Option<f64>,
}

impl Bar {
    /// Creates a bar.
    #[must_use]
    pub const fn new(
        timestamp: DateTime<Utc>,
        ohlc: Option<Ohlc>,
        volume: u64,
        spread: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            ohlc,
            volume,
            spread,
        }
    }

    /// Creates an empty-bucket bar.
    #[must_use]
    pub const fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            ohlc: None,
            volume: 0,
            spread: None,
        }
    }

    /// Returns true if the bucket held no ticks.
    #[must_use]
    pub const fn is_gap(&self) -> bool {
        self.ohlc.is_none()
    }
}
