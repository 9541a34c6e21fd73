//! Bars command: build and persist one symbol's bar series.

use anyhow::{Context, Result};

use super::{PipelineArgs, run_unit};

pub(crate) fn bars(symbol: &str, options: &PipelineArgs) -> Result<()> {
    let summary = run_unit(symbol, options, true)
        .with_context(|| format!("Failed to build bars for {symbol}"))?;

    if let Some(report) = &summary.report {
        println!("{report}");
    }

    if let Some(outcome) = &summary.outcome {
        println!(
            "{}: {} merged rows -> {} bars added ({} total) in {}",
            summary.symbol,
            summary.rows,
            outcome.added,
            outcome.total,
            outcome.path.display()
        );
    }
    if let Some(path) = &summary.tick_path {
        println!(
            "{}: {} merged rows written to {}",
            summary.symbol,
            summary.rows,
            path.display()
        );
    }

    Ok(())
}
