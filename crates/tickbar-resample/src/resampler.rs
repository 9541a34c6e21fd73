//! Tick table to OHLC bar resampling.

use chrono::{DateTime, Utc};
use std::str::FromStr;

use tickbar_types::BucketWidth;
use tracing::debug;

use crate::bar::{Bar, Ohlc};
use crate::merge::MergedTable;

/// How empty buckets in the resampled sequence are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Fill empty buckets from the previous bar, drop leading gaps.
    #[default]
    ForwardFillThenDrop,
    /// Drop every empty bucket.
    DropAll,
    /// Keep empty buckets as-is.
    Identity,
}

impl MissingPolicy {
    /// Applies the policy to a bar sequence.
    ///
    /// Forward-filling copies the previous bar's OHLC and spread into the
    /// gap; volume stays zero, so filled bars remain identifiable.
    #[must_use]
    pub fn apply(&self, bars: Vec<Bar>) -> Vec<Bar> {
        match self {
            Self::Identity => bars,
            Self::DropAll => bars.into_iter().filter(|bar| !bar.is_gap()).collect(),
            Self::ForwardFillThenDrop => {
                let mut filled = Vec::with_capacity(bars.len());
                let mut last: Option<(Ohlc, Option<f64>)> = None;
                for mut bar in bars {
                    match bar.ohlc {
                        Some(ohlc) => {
                            last = Some((ohlc, bar.spread));
                            filled.push(bar);
                        }
                        None => {
                            if let Some((ohlc, spread)) = last {
                                bar.ohlc = Some(ohlc);
                                bar.spread = spread;
                                filled.push(bar);
                            }
                            // Leading gap with nothing to fill from: dropped.
                        }
                    }
                }
                filled
            }
        }
    }

    /// Returns the policy as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ForwardFillThenDrop => "ffill",
            Self::DropAll => "drop",
            Self::Identity => "keep",
        }
    }
}

impl std::fmt::Display for MissingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MissingPolicy {
    type Err = MissingPolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ffill" | "forward-fill" => Ok(Self::ForwardFillThenDrop),
            "drop" | "dropna" => Ok(Self::DropAll),
            "keep" | "identity" | "none" => Ok(Self::Identity),
            _ => Err(MissingPolicyParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid missing-data policy string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPolicyParseError(String);

impl std::fmt::Display for MissingPolicyParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid missing-data policy '{}', expected one of: ffill, drop, keep",
            self.0
        )
    }
}

impl std::error::Error for MissingPolicyParseError {}

/// Configuration for one resampling pass.
#[derive(Debug, Clone, Copy)]
pub struct ResampleConfig {
    /// Bucket width.
    pub width: BucketWidth,
    /// Hour of day at which calendar buckets begin.
    pub anchor_hour: u32,
    /// Decimal digits for mid-price rounding (the symbol's quoted precision).
    /// Values above 15 are treated as 15.
    pub digits: u32,
    /// Empty-bucket handling applied to the final bar sequence.
    pub missing_policy: MissingPolicy,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            width: BucketWidth::default(),
            anchor_hour: tickbar_types::DEFAULT_ANCHOR_HOUR,
            digits: 5,
            missing_policy: MissingPolicy::default(),
        }
    }
}

impl ResampleConfig {
    /// Creates a config for the given width with default anchor and digits.
    #[must_use]
    pub fn new(width: BucketWidth) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }

    /// Sets the anchor hour for calendar buckets.
    #[must_use]
    pub const fn with_anchor_hour(mut self, anchor_hour: u32) -> Self {
        self.anchor_hour = anchor_hour;
        self
    }

    /// Sets the mid-price rounding precision.
    #[must_use]
    pub const fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }

    /// Sets the missing-data policy.
    #[must_use]
    pub const fn with_missing_policy(mut self, policy: MissingPolicy) -> Self {
        self.missing_policy = policy;
        self
    }
}

/// Resamples a merged tick table into OHLC bars.
///
/// Each row's mid price is rounded to the configured precision before
/// bucketing, so OHLC values derive from the rounded mid, never from raw
/// ask/bid. Buckets form a contiguous grid from the first to the last
/// non-empty bucket; interior buckets without ticks are emitted empty and
/// then transformed by the missing-data policy. The first bar keeps its
/// anchored bucket-start label even when the data begins mid-bucket.
///
/// `BucketWidth::Tick` performs no bucketing and yields one bar per row.
#[must_use]
pub fn resample(table: &MergedTable, config: &ResampleConfig) -> Vec<Bar> {
    if table.is_empty() {
        return Vec::new();
    }

    if config.width.is_tick() {
        let bars = table
            .rows()
            .iter()
            .map(|row| {
                let mid = round_dp(row.mid(), config.digits);
                Bar::new(
                    row.timestamp,
                    Some(Ohlc::new(mid, mid, mid, mid)),
                    1,
                    row.spread,
                )
            })
            .collect();
        return config.missing_policy.apply(bars);
    }

    let mut bars = Vec::new();
    let mut builder: Option<BarBuilder> = None;

    for row in table.rows() {
        let mid = round_dp(row.mid(), config.digits);
        let start = config.width.bucket_start(row.timestamp, config.anchor_hour);

        match builder.take() {
            Some(mut current) if current.timestamp == start => {
                current.update(mid, row.spread);
                builder = Some(current);
            }
            Some(finished) => {
                let mut next = config.width.advance(finished.timestamp);
                bars.push(finished.finish());
                while next < start {
                    bars.push(Bar::empty(next));
                    next = config.width.advance(next);
                }
                builder = Some(BarBuilder::new(start, mid, row.spread));
            }
            None => builder = Some(BarBuilder::new(start, mid, row.spread)),
        }
    }

    if let Some(last) = builder {
        bars.push(last.finish());
    }

    debug!(
        width = %config.width,
        bars = bars.len(),
        "resampled tick table"
    );
    config.missing_policy.apply(bars)
}

/// Precision beyond which the scaling factor overflows `f64` and rounding
/// would turn finite prices into NaN.
const MAX_ROUND_DIGITS: u32 = 15;

/// Rounds to `digits` decimal places, clamped to [`MAX_ROUND_DIGITS`].
fn round_dp(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits.min(MAX_ROUND_DIGITS) as i32);
    (value * factor).round() / factor
}

/// Accumulates one bucket's bar.
#[derive(Debug)]
struct BarBuilder {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
    spread_sum: f64,
    spread_count: u64,
}

impl BarBuilder {
    fn new(timestamp: DateTime<Utc>, mid: f64, spread: Option<f64>) -> Self {
        let mut builder = Self {
            timestamp,
            open: mid,
            high: mid,
            low: mid,
            close: mid,
            volume: 1,
            spread_sum: 0.0,
            spread_count: 0,
        };
        builder.add_spread(spread);
        builder
    }

    fn update(&mut self, mid: f64, spread: Option<f64>) {
        self.high = self.high.max(mid);
        self.low = self.low.min(mid);
        self.close = mid;
        self.volume += 1;
        self.add_spread(spread);
    }

    fn add_spread(&mut self, spread: Option<f64>) {
        if let Some(value) = spread {
            self.spread_sum += value;
            self.spread_count += 1;
        }
    }

    fn finish(self) -> Bar {
        let spread = (self.spread_count > 0).then(|| self.spread_sum / self.spread_count as f64);
        Bar::new(
            self.timestamp,
            Some(Ohlc::new(self.open, self.high, self.low, self.close)),
            self.volume,
            spread,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::{MergeOptions, merge};
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Timelike};
    use tickbar_types::{Side, SideSeries, Tick};

    fn side_series(side: Side, ticks: &[(i64, f64, f64)]) -> SideSeries {
        SideSeries {
            side,
            ticks: ticks.iter().map(|&(t, p, s)| Tick::new(t, p, s)).collect(),
        }
    }

    fn table_from(bid: &[(i64, f64, f64)], ask: &[(i64, f64, f64)]) -> MergedTable {
        merge(
            &[side_series(Side::Bid, bid)],
            &[side_series(Side::Ask, ask)],
            MergeOptions {
                compute_spread: true,
            },
        )
        .unwrap()
    }

    /// Milliseconds for 2024-01-15 (Monday) at the given time.
    fn ms(hour: u32, minute: u32, second: u32) -> i64 {
        Utc.with_ymd_and_hms(2024, 1, 15, hour, minute, second)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn test_single_hour_bucket() {
        // Both sides quoted at t=0 so no leading rows drop.
        let table = table_from(
            &[
                (ms(10, 0, 0), 1.2000, 1.0),
                (ms(10, 20, 0), 1.2001, 1.0),
                (ms(10, 40, 0), 1.2002, 1.0),
            ],
            &[(ms(10, 0, 0), 1.2004, 1.0), (ms(10, 30, 0), 1.2005, 1.0)],
        );
        let bars = resample(&table, &ResampleConfig::new(BucketWidth::Hour1));

        assert_eq!(bars.len(), 1);
        let bar = bars[0];
        assert_eq!(bar.timestamp.hour(), 10);
        assert_eq!(bar.volume, 4);
        let ohlc = bar.ohlc.unwrap();
        assert_relative_eq!(ohlc.open, 1.2002); // mid of first row
        assert_relative_eq!(ohlc.close, 1.20035); // mid of last row
        assert!(ohlc.high >= ohlc.low);
    }

    #[test]
    fn test_ohlc_bounds_invariant() {
        let table = table_from(
            &[
                (ms(9, 0, 0), 1.1000, 1.0),
                (ms(9, 1, 0), 1.1040, 1.0),
                (ms(9, 2, 0), 1.0990, 1.0),
                (ms(9, 3, 0), 1.1010, 1.0),
            ],
            &[(ms(9, 0, 0), 1.1004, 1.0)],
        );
        let bars = resample(&table, &ResampleConfig::new(BucketWidth::Minute1));

        for bar in bars.iter().filter(|b| !b.is_gap()) {
            let ohlc = bar.ohlc.unwrap();
            assert!(ohlc.high >= ohlc.low);
            assert!(ohlc.high >= ohlc.open.max(ohlc.close));
            assert!(ohlc.low <= ohlc.open.min(ohlc.close));
        }
    }

    #[test]
    fn test_mid_price_rounding() {
        // ask 1.20006, bid 1.20001 -> raw mid 1.200035, rounded to 5 digits.
        let table = table_from(&[(ms(10, 0, 0), 1.20001, 1.0)], &[(ms(10, 0, 0), 1.20006, 1.0)]);

        let bars = resample(&table, &ResampleConfig::new(BucketWidth::Minute1));
        assert_relative_eq!(bars[0].ohlc.unwrap().open, 1.20004, epsilon = 1e-12);

        let bars = resample(
            &table,
            &ResampleConfig::new(BucketWidth::Minute1).with_digits(3),
        );
        assert_relative_eq!(bars[0].ohlc.unwrap().open, 1.200, epsilon = 1e-12);
    }

    #[test]
    fn test_oversized_digits_keep_prices_finite() {
        let table = table_from(&[(ms(10, 0, 0), 1.20001, 1.0)], &[(ms(10, 0, 0), 1.20006, 1.0)]);

        let bars = resample(
            &table,
            &ResampleConfig::new(BucketWidth::Minute1).with_digits(u32::MAX),
        );
        let ohlc = bars[0].ohlc.unwrap();
        assert!(ohlc.open.is_finite());
        assert_relative_eq!(ohlc.open, 1.200035, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_buckets_kept_with_identity() {
        let table = table_from(
            &[(ms(10, 0, 0), 1.2000, 1.0), (ms(10, 2, 30), 1.2002, 1.0)],
            &[(ms(10, 0, 0), 1.2004, 1.0)],
        );
        let config = ResampleConfig::new(BucketWidth::Minute1)
            .with_missing_policy(MissingPolicy::Identity);
        let bars = resample(&table, &config);

        assert_eq!(bars.len(), 3);
        assert!(!bars[0].is_gap());
        assert!(bars[1].is_gap());
        assert_eq!(bars[1].volume, 0);
        assert!(!bars[2].is_gap());
    }

    #[test]
    fn test_forward_fill_copies_previous_bar() {
        let table = table_from(
            &[(ms(10, 0, 0), 1.2000, 1.0), (ms(10, 2, 30), 1.2002, 1.0)],
            &[(ms(10, 0, 0), 1.2004, 1.0)],
        );
        let bars = resample(&table, &ResampleConfig::new(BucketWidth::Minute1));

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[1].ohlc, bars[0].ohlc);
        assert_eq!(bars[1].spread, bars[0].spread);
        assert_eq!(bars[1].volume, 0); // filled bars stay identifiable
    }

    #[test]
    fn test_drop_all_removes_gaps() {
        let table = table_from(
            &[(ms(10, 0, 0), 1.2000, 1.0), (ms(10, 2, 30), 1.2002, 1.0)],
            &[(ms(10, 0, 0), 1.2004, 1.0)],
        );
        let config =
            ResampleConfig::new(BucketWidth::Minute1).with_missing_policy(MissingPolicy::DropAll);
        let bars = resample(&table, &config);

        assert_eq!(bars.len(), 2);
        assert!(bars.iter().all(|b| !b.is_gap()));
    }

    #[test]
    fn test_volume_conservation() {
        let table = table_from(
            &[
                (ms(10, 0, 0), 1.2000, 1.0),
                (ms(10, 0, 30), 1.2001, 1.0),
                (ms(10, 3, 0), 1.2002, 1.0),
                (ms(11, 15, 0), 1.2003, 1.0),
            ],
            &[(ms(10, 0, 0), 1.2004, 1.0), (ms(10, 5, 0), 1.2005, 1.0)],
        );
        let config = ResampleConfig::new(BucketWidth::Minute5)
            .with_missing_policy(MissingPolicy::Identity);
        let bars = resample(&table, &config);

        let total: u64 = bars.iter().map(|b| b.volume).sum();
        assert_eq!(total as usize, table.len());
    }

    #[test]
    fn test_spread_is_bucket_mean() {
        let table = table_from(
            &[(ms(10, 0, 0), 1.2000, 1.0), (ms(10, 0, 30), 1.2000, 1.0)],
            &[(ms(10, 0, 0), 1.2004, 1.0), (ms(10, 0, 30), 1.2006, 1.0)],
        );
        let bars = resample(&table, &ResampleConfig::new(BucketWidth::Minute1));

        assert_eq!(bars.len(), 1);
        assert_relative_eq!(bars[0].spread.unwrap(), 0.0005, epsilon = 1e-12);
    }

    #[test]
    fn test_anchored_day_first_partial_bucket() {
        // Data starts Monday 10:00, well inside the bucket that opened
        // Sunday 22:00: the first bar keeps the anchored start label.
        let table = table_from(
            &[(ms(10, 0, 0), 1.2000, 1.0), (ms(23, 0, 0), 1.2002, 1.0)],
            &[(ms(10, 0, 0), 1.2004, 1.0)],
        );
        let config = ResampleConfig::new(BucketWidth::Day)
            .with_missing_policy(MissingPolicy::Identity);
        let bars = resample(&table, &config);

        assert_eq!(bars.len(), 2);
        assert_eq!(
            bars[0].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 14, 22, 0, 0).unwrap()
        );
        assert_eq!(bars[0].volume, 2);
        assert_eq!(
            bars[1].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 15, 22, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_tick_passthrough() {
        let table = table_from(
            &[(ms(10, 0, 0), 1.2000, 1.0), (ms(10, 0, 1), 1.2001, 1.0)],
            &[(ms(10, 0, 0), 1.2004, 1.0)],
        );
        let bars = resample(&table, &ResampleConfig::new(BucketWidth::Tick));

        assert_eq!(bars.len(), 2);
        assert!(bars.iter().all(|b| b.volume == 1));
        let ohlc = bars[0].ohlc.unwrap();
        assert_relative_eq!(ohlc.open, ohlc.close);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "ffill".parse::<MissingPolicy>().unwrap(),
            MissingPolicy::ForwardFillThenDrop
        );
        assert_eq!("drop".parse::<MissingPolicy>().unwrap(), MissingPolicy::DropAll);
        assert_eq!("keep".parse::<MissingPolicy>().unwrap(), MissingPolicy::Identity);
        assert!("maybe".parse::<MissingPolicy>().is_err());
    }

    #[test]
    fn test_forward_fill_drops_leading_gaps() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 15, 10, 1, 0).unwrap();
        let bars = vec![
            Bar::empty(t0),
            Bar::new(t1, Some(Ohlc::new(1.0, 1.0, 1.0, 1.0)), 3, None),
        ];
        let filled = MissingPolicy::ForwardFillThenDrop.apply(bars);

        assert_eq!(filled.len(), 1);
        assert_eq!(filled[0].timestamp, t1);
    }
}
