//! Batch command: run the pipeline over many symbols, continuing past
//! failures.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use tickbar_lib::MAJORS;

use super::{PipelineArgs, run_unit};

pub(crate) fn batch(symbols: &[String], options: &PipelineArgs, quiet: bool) -> Result<()> {
    let codes: Vec<String> = if symbols.is_empty() {
        MAJORS.iter().map(ToString::to_string).collect()
    } else {
        symbols.to_vec()
    };

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(codes.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} symbols {msg}")
                .expect("Invalid progress template")
                .progress_chars("=>-"),
        );
        pb
    };

    let mut built = 0usize;
    let mut skipped = 0usize;
    let mut failed: Vec<(String, String)> = Vec::new();

    for code in &codes {
        progress.set_message(code.clone());
        match run_unit(code, options, true) {
            Ok(summary) => {
                built += 1;
                info!(symbol = %summary.symbol, rows = summary.rows, "unit complete");
            }
            Err(err) if err.is_benign() => {
                skipped += 1;
                debug!(symbol = %code, %err, "no matching input, skipped");
            }
            Err(err) => {
                warn!(symbol = %code, %err, "unit failed");
                failed.push((code.clone(), err.to_string()));
            }
        }
        progress.inc(1);
    }

    progress.finish_with_message(format!(
        "{built} built, {skipped} skipped, {} failed",
        failed.len()
    ));

    for (code, err) in &failed {
        eprintln!("{code}: {err}");
    }
    // Partial failures are reported above but don't fail the run.
    if run_failed(codes.len(), failed.len()) {
        anyhow::bail!("all {} symbols failed", failed.len());
    }
    Ok(())
}

/// A batch run only fails outright when every requested symbol failed.
/// Skipped symbols (no matching input) are not failures.
fn run_failed(requested: usize, failed: usize) -> bool {
    requested > 0 && failed == requested
}

#[cfg(test)]
mod tests {
    use super::run_failed;

    #[test]
    fn test_skips_do_not_fail_the_run() {
        // Two symbols skipped, one failed: exit clean.
        assert!(!run_failed(3, 1));
        // All skipped, none failed.
        assert!(!run_failed(3, 0));
    }

    #[test]
    fn test_all_failed_fails_the_run() {
        assert!(run_failed(3, 3));
        assert!(!run_failed(0, 0));
    }
}
