//! Inspect command: integrity diagnostics without writing anything.

use anyhow::{Context, Result};

use super::{PipelineArgs, run_unit};

pub(crate) fn inspect(symbol: &str, options: &PipelineArgs) -> Result<()> {
    let mut options = options.clone();
    options.check = true;

    let summary = run_unit(symbol, &options, false)
        .with_context(|| format!("Failed to inspect {symbol}"))?;

    println!("{} ({} merged rows)", summary.symbol, summary.rows);
    match &summary.report {
        Some(report) => println!("{report}"),
        None => anyhow::bail!(
            "No integrity report for {symbol}; the table needs at least 2 rows and a spread column"
        ),
    }
    Ok(())
}
