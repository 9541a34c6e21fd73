//! Read-only integrity diagnostics over a merged tick table.

use chrono::Timelike;
use std::collections::HashMap;

use tickbar_types::{Result, TickbarError};

use crate::merge::MergedTable;

/// Distribution of consecutive-row time differences, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapStats {
    /// Number of gaps (rows - 1).
    pub count: usize,
    /// Smallest gap.
    pub min_ms: i64,
    /// Largest gap.
    pub max_ms: i64,
    /// Mean gap.
    pub mean_ms: f64,
    /// 25th percentile.
    pub p25_ms: i64,
    /// Median.
    pub median_ms: i64,
    /// 75th percentile.
    pub p75_ms: i64,
}

/// Descriptive statistics over a merged table.
///
/// Purely diagnostic: computing the report never mutates the table and a
/// failure to compute it must never block resampling. Callers downgrade
/// errors to warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrityReport {
    /// Number of rows examined.
    pub rows: usize,
    /// Gap distribution.
    pub gaps: GapStats,
    /// The single most frequent gap value (the expected tick cadence).
    pub modal_gap_ms: i64,
    /// How often the modal gap occurs.
    pub modal_count: usize,
    /// Mean spread per UTC hour of day, ascending by hour; hours without
    /// rows are absent.
    pub hourly_spread: Vec<(u32, f64)>,
}

impl IntegrityReport {
    /// Computes the report.
    ///
    /// # Errors
    ///
    /// Returns [`TickbarError::Artifact`] if the table has fewer than two
    /// rows or was merged without the spread column.
    pub fn from_table(table: &MergedTable) -> Result<Self> {
        if !table.has_spread() {
            return Err(TickbarError::Artifact(
                "integrity check requires the spread column".to_string(),
            ));
        }
        if table.len() < 2 {
            return Err(TickbarError::Artifact(format!(
                "integrity check needs at least 2 rows, got {}",
                table.len()
            )));
        }

        let rows = table.rows();
        let mut diffs: Vec<i64> = rows
            .windows(2)
            .map(|pair| pair[1].timestamp.timestamp_millis() - pair[0].timestamp.timestamp_millis())
            .collect();

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for &diff in &diffs {
            *counts.entry(diff).or_insert(0) += 1;
        }
        // Ties break toward the smaller gap so the result is deterministic.
        let (modal_gap_ms, modal_count) = counts
            .into_iter()
            .max_by_key(|&(gap, count)| (count, -gap))
            .unwrap_or((0, 0));

        let mean_ms = diffs.iter().sum::<i64>() as f64 / diffs.len() as f64;
        diffs.sort_unstable();
        let gaps = GapStats {
            count: diffs.len(),
            min_ms: diffs[0],
            max_ms: diffs[diffs.len() - 1],
            mean_ms,
            p25_ms: percentile(&diffs, 25.0),
            median_ms: percentile(&diffs, 50.0),
            p75_ms: percentile(&diffs, 75.0),
        };

        let mut sums = [0.0f64; 24];
        let mut tick_counts = [0usize; 24];
        for row in rows {
            if let Some(spread) = row.spread {
                let hour = row.timestamp.hour() as usize;
                sums[hour] += spread;
                tick_counts[hour] += 1;
            }
        }
        let hourly_spread = (0..24)
            .filter(|&hour| tick_counts[hour] > 0)
            .map(|hour| (hour as u32, sums[hour] / tick_counts[hour] as f64))
            .collect();

        Ok(Self {
            rows: rows.len(),
            gaps,
            modal_gap_ms,
            modal_count,
            hourly_spread,
        })
    }
}

/// Nearest-rank percentile over a sorted slice.
fn percentile(sorted: &[i64], pct: f64) -> i64 {
    let index = (pct / 100.0 * (sorted.len() - 1) as f64).round() as usize;
    sorted[index.min(sorted.len() - 1)]
}

impl std::fmt::Display for IntegrityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "tick gap distribution over {} rows (ms):", self.rows)?;
        writeln!(
            f,
            "  count {}  min {}  max {}  mean {:.1}",
            self.gaps.count, self.gaps.min_ms, self.gaps.max_ms, self.gaps.mean_ms
        )?;
        writeln!(
            f,
            "  p25 {}  median {}  p75 {}",
            self.gaps.p25_ms, self.gaps.median_ms, self.gaps.p75_ms
        )?;
        writeln!(
            f,
            "modal gap: {} ms ({} occurrences)",
            self.modal_gap_ms, self.modal_count
        )?;
        writeln!(f, "mean spread by hour (UTC):")?;
        for (hour, spread) in &self.hourly_spread {
            writeln!(f, "  {hour:02}  {spread:.6}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::{MergeOptions, merge};
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};
    use tickbar_types::{Side, SideSeries, Tick};

    fn table(spread: bool, bid_stamps: &[i64]) -> MergedTable {
        let ticks = |side: Side, stamps: &[i64], price: f64| SideSeries {
            side,
            ticks: stamps.iter().map(|&t| Tick::new(t, price, 1.0)).collect(),
        };
        merge(
            &[ticks(Side::Bid, bid_stamps, 1.2000)],
            &[ticks(Side::Ask, bid_stamps, 1.2004)],
            MergeOptions {
                compute_spread: spread,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_gap_stats() {
        // Gaps: 500, 500, 1500.
        let t = table(true, &[0, 500, 1000, 2500]);
        let report = IntegrityReport::from_table(&t).unwrap();

        assert_eq!(report.rows, 4);
        assert_eq!(report.gaps.count, 3);
        assert_eq!(report.gaps.min_ms, 500);
        assert_eq!(report.gaps.max_ms, 1500);
        assert_relative_eq!(report.gaps.mean_ms, 2500.0 / 3.0, epsilon = 1e-9);
        assert_eq!(report.gaps.median_ms, 500);
    }

    #[test]
    fn test_modal_gap() {
        let t = table(true, &[0, 500, 1000, 2500]);
        let report = IntegrityReport::from_table(&t).unwrap();
        assert_eq!(report.modal_gap_ms, 500);
        assert_eq!(report.modal_count, 2);
    }

    #[test]
    fn test_hourly_spread() {
        let hour = |h: i64| {
            Utc.with_ymd_and_hms(2024, 1, 15, h as u32, 0, 0)
                .unwrap()
                .timestamp_millis()
        };
        let t = table(true, &[hour(9), hour(9) + 1000, hour(14)]);
        let report = IntegrityReport::from_table(&t).unwrap();

        assert_eq!(report.hourly_spread.len(), 2);
        assert_eq!(report.hourly_spread[0].0, 9);
        assert_eq!(report.hourly_spread[1].0, 14);
        assert_relative_eq!(report.hourly_spread[0].1, 0.0004, epsilon = 1e-9);
    }

    #[test]
    fn test_requires_spread_column() {
        let t = table(false, &[0, 500]);
        assert!(matches!(
            IntegrityReport::from_table(&t),
            Err(TickbarError::Artifact(_))
        ));
    }

    #[test]
    fn test_requires_two_rows() {
        let t = table(true, &[0]);
        assert!(IntegrityReport::from_table(&t).is_err());
    }

    #[test]
    fn test_report_is_read_only() {
        let t = table(true, &[0, 500, 1000]);
        let before = t.clone();
        let _ = IntegrityReport::from_table(&t).unwrap();
        assert_eq!(t, before);
    }
}
