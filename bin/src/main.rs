//! tickbar CLI - builds OHLC bar series from raw bid/ask tick archives.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::PipelineArgs;

#[derive(Parser)]
#[command(name = "tickbar")]
#[command(about = "Builds OHLC bar series from raw bid/ask tick archives", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build bars for one symbol and append them to the store
    Bars {
        /// Symbol to process (e.g. eurusd)
        symbol: String,

        #[command(flatten)]
        options: PipelineArgs,
    },

    /// Build bars for many symbols, continuing past failed units
    Batch {
        /// Symbols to process. Defaults to the G8 majors.
        symbols: Vec<String>,

        #[command(flatten)]
        options: PipelineArgs,
    },

    /// Print the integrity report for a symbol without writing anything
    Inspect {
        /// Symbol to inspect (e.g. eurusd)
        symbol: String,

        #[command(flatten)]
        options: PipelineArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Bars { symbol, options } => commands::bars(&symbol, &options),
        Commands::Batch { symbols, options } => commands::batch(&symbols, &options, cli.quiet),
        Commands::Inspect { symbol, options } => commands::inspect(&symbol, &options),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .init();
}
