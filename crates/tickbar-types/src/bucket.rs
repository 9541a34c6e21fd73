//! Resampling bucket width definitions.

use chrono::{DateTime, Datelike, TimeDelta, TimeZone, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default anchor hour for calendar-based buckets (22:00 UTC trading-day open).
pub const DEFAULT_ANCHOR_HOUR: u32 = 22;

/// Width of a resampling bucket.
///
/// Sub-daily widths align to clock boundaries. Calendar widths (day,
/// business day, week) are anchored at a configurable hour of day rather
/// than midnight, matching the non-midnight trading-day convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BucketWidth {
    /// No bucketing (one bar per tick).
    Tick,
    /// 1-minute buckets.
    #[default]
    #[serde(rename = "m1")]
    Minute1,
    /// 5-minute buckets.
    #[serde(rename = "m5")]
    Minute5,
    /// 15-minute buckets.
    #[serde(rename = "m15")]
    Minute15,
    /// 30-minute buckets.
    #[serde(rename = "m30")]
    Minute30,
    /// 1-hour buckets.
    #[serde(rename = "h1")]
    Hour1,
    /// 4-hour buckets.
    #[serde(rename = "h4")]
    Hour4,
    /// Calendar-day buckets starting at the anchor hour.
    #[serde(rename = "d1")]
    Day,
    /// Business-day buckets; weekend starts fold back into Friday.
    #[serde(rename = "b1")]
    BusinessDay,
    /// Calendar-week buckets starting Sunday at the anchor hour.
    #[serde(rename = "w1")]
    Week,
}

impl BucketWidth {
    /// Returns the fixed duration in seconds for sub-daily widths.
    ///
    /// Anchored calendar widths and tick passthrough return `None`.
    #[must_use]
    pub const fn fixed_seconds(&self) -> Option<u64> {
        match self {
            Self::Minute1 => Some(60),
            Self::Minute5 => Some(300),
            Self::Minute15 => Some(900),
            Self::Minute30 => Some(1800),
            Self::Hour1 => Some(3600),
            Self::Hour4 => Some(14400),
            Self::Tick | Self::Day | Self::BusinessDay | Self::Week => None,
        }
    }

    /// Returns true if this width performs no bucketing.
    #[must_use]
    pub const fn is_tick(&self) -> bool {
        matches!(self, Self::Tick)
    }

    /// Returns true if bucket boundaries honor the anchor hour.
    #[must_use]
    pub const fn is_anchored(&self) -> bool {
        matches!(self, Self::Day | Self::BusinessDay | Self::Week)
    }

    /// Returns the width as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tick => "tick",
            Self::Minute1 => "m1",
            Self::Minute5 => "m5",
            Self::Minute15 => "m15",
            Self::Minute30 => "m30",
            Self::Hour1 => "h1",
            Self::Hour4 => "h4",
            Self::Day => "d1",
            Self::BusinessDay => "b1",
            Self::Week => "w1",
        }
    }

    /// Returns all widths that produce bars.
    #[must_use]
    pub const fn all_bar_widths() -> &'static [Self] {
        &[
            Self::Minute1,
            Self::Minute5,
            Self::Minute15,
            Self::Minute30,
            Self::Hour1,
            Self::Hour4,
            Self::Day,
            Self::BusinessDay,
            Self::Week,
        ]
    }

    /// Calculates the bucket start containing `timestamp`.
    ///
    /// Buckets are half-open `[start, advance(start))` intervals. Sub-daily
    /// widths truncate to the width boundary and ignore `anchor_hour`;
    /// calendar widths use the most recent anchor boundary at or before the
    /// timestamp. A business-day start falling on Saturday or Sunday rolls
    /// back to Friday's start, so weekend ticks fold into Friday's bucket.
    #[must_use]
    pub fn bucket_start(&self, timestamp: DateTime<Utc>, anchor_hour: u32) -> DateTime<Utc> {
        match self {
            Self::Tick => timestamp,
            Self::Minute1 => truncate_to_minutes(timestamp, 1),
            Self::Minute5 => truncate_to_minutes(timestamp, 5),
            Self::Minute15 => truncate_to_minutes(timestamp, 15),
            Self::Minute30 => truncate_to_minutes(timestamp, 30),
            Self::Hour1 => truncate_to_hours(timestamp, 1),
            Self::Hour4 => truncate_to_hours(timestamp, 4),
            Self::Day => anchored_day_start(timestamp, anchor_hour),
            Self::BusinessDay => {
                let mut start = anchored_day_start(timestamp, anchor_hour);
                while matches!(start.weekday(), Weekday::Sat | Weekday::Sun) {
                    start -= TimeDelta::days(1);
                }
                start
            }
            Self::Week => {
                let day_start = anchored_day_start(timestamp, anchor_hour);
                let back = i64::from(day_start.weekday().num_days_from_sunday());
                day_start - TimeDelta::days(back)
            }
        }
    }

    /// Steps from one bucket start to the next.
    #[must_use]
    pub fn advance(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Tick => start,
            Self::Day => start + TimeDelta::days(1),
            Self::Week => start + TimeDelta::days(7),
            Self::BusinessDay => {
                let mut next = start + TimeDelta::days(1);
                while matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
                    next += TimeDelta::days(1);
                }
                next
            }
            _ => {
                let seconds = self.fixed_seconds().unwrap_or(0);
                start + TimeDelta::seconds(seconds as i64)
            }
        }
    }
}

impl std::fmt::Display for BucketWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BucketWidth {
    type Err = BucketWidthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tick" => Ok(Self::Tick),
            "m1" | "1m" | "min" | "minute" | "minute1" => Ok(Self::Minute1),
            "m5" | "5m" | "minute5" => Ok(Self::Minute5),
            "m15" | "15m" | "minute15" => Ok(Self::Minute15),
            "m30" | "30m" | "minute30" => Ok(Self::Minute30),
            "h1" | "1h" | "hour" | "hour1" => Ok(Self::Hour1),
            "h4" | "4h" | "hour4" => Ok(Self::Hour4),
            "d" | "d1" | "1d" | "day" | "daily" | "24h" => Ok(Self::Day),
            "b" | "b1" | "business" => Ok(Self::BusinessDay),
            "w" | "w1" | "1w" | "week" | "weekly" => Ok(Self::Week),
            _ => Err(BucketWidthParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid bucket width string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketWidthParseError(String);

impl std::fmt::Display for BucketWidthParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid bucket width '{}', expected one of: tick, m1, m5, m15, m30, h1, h4, d1, b1, w1",
            self.0
        )
    }
}

impl std::error::Error for BucketWidthParseError {}

/// Truncates a timestamp to the start of a minute boundary.
fn truncate_to_minutes(dt: DateTime<Utc>, interval: u32) -> DateTime<Utc> {
    let minute = dt.minute() / interval * interval;
    Utc.with_ymd_and_hms(dt.year(), dt.month(), dt.day(), dt.hour(), minute, 0)
        .unwrap()
}

/// Truncates a timestamp to the start of an hour boundary.
fn truncate_to_hours(dt: DateTime<Utc>, interval: u32) -> DateTime<Utc> {
    let hour = dt.hour() / interval * interval;
    Utc.with_ymd_and_hms(dt.year(), dt.month(), dt.day(), hour, 0, 0)
        .unwrap()
}

/// Most recent `anchor_hour:00` UTC boundary at or before the timestamp.
fn anchored_day_start(dt: DateTime<Utc>, anchor_hour: u32) -> DateTime<Utc> {
    let shifted = dt - TimeDelta::hours(i64::from(anchor_hour));
    Utc.with_ymd_and_hms(shifted.year(), shifted.month(), shifted.day(), 0, 0, 0)
        .unwrap()
        + TimeDelta::hours(i64::from(anchor_hour))
}
