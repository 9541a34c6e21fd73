//! Builds OHLC bar series from raw bid/ask tick archives.
//!
//! This is a facade crate that re-exports functionality from the tickbar
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use tickbar_lib::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let symbol = Symbol::resolve("eurusd");
//!     let locator = FileLocator::new(SourceConfig::new("/data/ticks"));
//!     let files = locator.locate(&symbol, Some("2024-01-15"), None)?;
//!
//!     let bids: Vec<_> = files
//!         .bid
//!         .iter()
//!         .map(|p| parse_file(p, Side::Bid, locator.config()))
//!         .collect::<Result<_, _>>()?;
//!     let asks: Vec<_> = files
//!         .ask
//!         .iter()
//!         .map(|p| parse_file(p, Side::Ask, locator.config()))
//!         .collect::<Result<_, _>>()?;
//!
//!     let table = merge(&bids, &asks, MergeOptions { compute_spread: true })?;
//!     let bars = resample(&table, &ResampleConfig::new(BucketWidth::Minute1));
//!
//!     let store = BarStore::new("/data/bars");
//!     store.append(&symbol, BucketWidth::Minute1, &bars, true)?;
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use tickbar_types::*;

// Re-export file discovery and parsing
pub use tickbar_source::{FileLocator, ParseError, SourceConfig, SymbolFiles, parse_file};

// Re-export the resampling core
pub use tickbar_resample::{
    Bar, GapStats, IntegrityReport, MergeOptions, MergedColumn, MergedTable, MergedTick,
    MissingPolicy, Ohlc, ResampleConfig, merge, resample,
};

// Re-export persistence
pub use tickbar_store::{AppendOutcome, BarStore, merge_series, render_spread_profile};

/// Prelude module for convenient imports.
///
/// ```
/// use tickbar_lib::prelude::*;
/// ```
pub mod prelude {
    pub use tickbar_types::{
        BucketWidth, DEFAULT_ANCHOR_HOUR, Result, Side, SideSeries, Symbol, Tick, TickbarError,
    };

    pub use tickbar_source::{FileLocator, SourceConfig, SymbolFiles, parse_file};

    pub use tickbar_resample::{
        Bar, IntegrityReport, MergeOptions, MergedColumn, MergedTable, MissingPolicy, Ohlc,
        ResampleConfig, merge, resample,
    };

    pub use tickbar_store::{BarStore, merge_series, render_spread_profile};
}
