//! CLI command implementations.

pub(crate) mod bars;
pub(crate) mod batch;
pub(crate) mod inspect;

pub(crate) use bars::bars;
pub(crate) use batch::batch;
pub(crate) use inspect::inspect;

use clap::Args;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use tickbar_lib::prelude::*;
use tickbar_lib::AppendOutcome;

/// Options shared by every pipeline command.
#[derive(Args, Debug, Clone)]
pub(crate) struct PipelineArgs {
    /// Root directory of the tick archive (one subdirectory per symbol)
    #[arg(long, default_value = "ticks")]
    pub data_root: PathBuf,

    /// Output directory for bar series and diagnostics
    #[arg(long, default_value = "bars")]
    pub out_root: PathBuf,

    /// Only use input files whose name contains this date substring
    #[arg(long)]
    pub date: Option<String>,

    /// Only use input files whose name contains this hour substring
    #[arg(long)]
    pub hour: Option<String>,

    /// Bucket width: tick, m1, m5, m15, m30, h1, h4, d1, b1 or w1
    #[arg(long, short, default_value = "m1")]
    pub timeframe: BucketWidth,

    /// UTC hour at which daily and wider buckets begin
    #[arg(long, default_value_t = DEFAULT_ANCHOR_HOUR, value_parser = clap::value_parser!(u32).range(0..24))]
    pub anchor: u32,

    /// Override the symbol's decimal precision for mid-price rounding
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=15))]
    pub digits: Option<u32>,

    /// Omit the spread column from merged output and bar series
    #[arg(long)]
    pub no_spread: bool,

    /// Empty-bucket policy: ffill, drop or keep
    #[arg(long, default_value = "ffill")]
    pub policy: MissingPolicy,

    /// Run integrity diagnostics and render the spread profile
    #[arg(long)]
    pub check: bool,

    /// Plain tick file extension in the archive
    #[arg(long, default_value = ".csv")]
    pub extension: String,
}

/// What one pipeline unit produced.
pub(crate) struct UnitSummary {
    pub symbol: Symbol,
    pub rows: usize,
    pub report: Option<IntegrityReport>,
    /// Set when bars were appended to the store.
    pub outcome: Option<AppendOutcome>,
    /// Set when the merged tick table was written instead of bars.
    pub tick_path: Option<PathBuf>,
}

/// Runs the full pipeline for one symbol: locate, parse, merge, optionally
/// check, then resample and persist (unless `write` is false).
pub(crate) fn run_unit(
    code: &str,
    args: &PipelineArgs,
    write: bool,
) -> tickbar_lib::Result<UnitSummary> {
    let mut symbol = Symbol::resolve(code);
    if let Some(digits) = args.digits {
        symbol = symbol.with_digits(digits);
    }

    let config = SourceConfig::new(&args.data_root).with_extension(&args.extension);
    let locator = FileLocator::new(config);
    let files = locator.locate(&symbol, args.date.as_deref(), args.hour.as_deref())?;
    debug!(symbol = %symbol, files = files.total(), "located tick files");

    let bids = parse_side(&files.bid, Side::Bid, &locator)?;
    let asks = parse_side(&files.ask, Side::Ask, &locator)?;

    let table = merge(
        &bids,
        &asks,
        MergeOptions {
            compute_spread: !args.no_spread,
        },
    )?;

    // Diagnostics are advisory and never block the pipeline.
    let report = if args.check {
        match IntegrityReport::from_table(&table) {
            Ok(report) => Some(report),
            Err(err) => {
                warn!(symbol = %symbol, %err, "integrity report unavailable");
                None
            }
        }
    } else {
        None
    };

    if !write {
        return Ok(UnitSummary {
            symbol,
            rows: table.len(),
            report,
            outcome: None,
            tick_path: None,
        });
    }

    std::fs::create_dir_all(&args.out_root)?;

    if let Some(report) = &report {
        let chart = args
            .out_root
            .join(format!("{}_spread_by_hour.svg", symbol.code()));
        // The chart is advisory: a render failure never fails the unit.
        if let Err(err) = render_spread_profile(&symbol, report, &chart) {
            warn!(symbol = %symbol, %err, "spread profile not rendered");
        }
    }

    let (outcome, tick_path) = if args.timeframe.is_tick() {
        let path = args.out_root.join(format!("{}_tick.csv", symbol.code()));
        write_merged(&table, &path)?;
        (None, Some(path))
    } else {
        let config = ResampleConfig::new(args.timeframe)
            .with_anchor_hour(args.anchor)
            .with_digits(symbol.digits())
            .with_missing_policy(args.policy);
        let bars = resample(&table, &config);

        let store = BarStore::new(&args.out_root);
        let outcome = store.append(&symbol, args.timeframe, &bars, table.has_spread())?;
        (Some(outcome), None)
    };

    Ok(UnitSummary {
        symbol,
        rows: table.len(),
        report,
        outcome,
        tick_path,
    })
}

fn parse_side(
    paths: &[PathBuf],
    side: Side,
    locator: &FileLocator,
) -> tickbar_lib::Result<Vec<SideSeries>> {
    paths
        .iter()
        .map(|path| parse_file(path, side, locator.config()).map_err(Into::into))
        .collect()
}

fn write_merged(table: &tickbar_lib::MergedTable, path: &Path) -> tickbar_lib::Result<()> {
    let columns: &[MergedColumn] = if table.has_spread() {
        MergedColumn::default_projection()
    } else {
        &[MergedColumn::AskPrice, MergedColumn::BidPrice]
    };
    let file = File::create(path)?;
    table.write_csv(BufWriter::new(file), columns)?;
    Ok(())
}
