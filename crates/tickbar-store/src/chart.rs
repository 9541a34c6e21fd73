//! Advisory spread-by-hour chart.

use plotters::prelude::*;
use std::path::Path;

use tickbar_resample::IntegrityReport;
use tickbar_types::{Result, Symbol, TickbarError};
use tracing::debug;

/// Renders the mean-spread-by-hour profile as an SVG next to the store.
///
/// Purely a diagnostic side effect: the chart is never read back, and
/// callers downgrade any error here to a warning.
///
/// # Errors
///
/// Returns [`TickbarError::Artifact`] if there is no hourly data or the
/// backend fails.
pub fn render_spread_profile(symbol: &Symbol, report: &IntegrityReport, path: &Path) -> Result<()> {
    if report.hourly_spread.is_empty() {
        return Err(TickbarError::Artifact(
            "no hourly spread data to plot".to_string(),
        ));
    }

    let max_spread = report
        .hourly_spread
        .iter()
        .map(|&(_, spread)| spread)
        .fold(f64::MIN, f64::max);

    let area = SVGBackend::new(path, (800, 480)).into_drawing_area();
    area.fill(&WHITE).map_err(artifact)?;

    let mut chart = ChartBuilder::on(&area)
        .caption(
            format!("{symbol} average spread by hour (UTC)"),
            ("sans-serif", 20),
        )
        .margin(12)
        .x_label_area_size(32)
        .y_label_area_size(64)
        .build_cartesian_2d(0u32..24u32, 0f64..max_spread * 1.2)
        .map_err(artifact)?;

    chart
        .configure_mesh()
        .x_labels(24)
        .x_desc("hour (UTC)")
        .y_desc("mean spread")
        .draw()
        .map_err(artifact)?;

    chart
        .draw_series(LineSeries::new(
            report.hourly_spread.iter().copied(),
            &BLUE,
        ))
        .map_err(artifact)?;

    area.present().map_err(artifact)?;
    debug!(path = %path.display(), "rendered spread profile");
    Ok(())
}

fn artifact(err: impl std::fmt::Display) -> TickbarError {
    TickbarError::Artifact(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickbar_resample::{MergeOptions, merge};
    use tickbar_types::{Side, SideSeries, Tick};

    fn report() -> IntegrityReport {
        let series = |side: Side, price: f64| SideSeries {
            side,
            ticks: (0..5)
                .map(|i| Tick::new(i64::from(i) * 3_600_000, price, 1.0))
                .collect(),
        };
        let table = merge(
            &[series(Side::Bid, 1.2000)],
            &[series(Side::Ask, 1.2004)],
            MergeOptions {
                compute_spread: true,
            },
        )
        .unwrap();
        IntegrityReport::from_table(&table).unwrap()
    }

    #[test]
    fn test_render_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("EURUSD_spread_by_hour.svg");

        render_spread_profile(&Symbol::resolve("EURUSD"), &report(), &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("<svg"));
    }
}
