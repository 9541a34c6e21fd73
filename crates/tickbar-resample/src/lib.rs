//! Tick merging and OHLC resampling.
//!
//! The pipeline core:
//!
//! - [`merge`] - outer-joins bid and ask series into a forward-filled
//!   [`MergedTable`]
//! - [`IntegrityReport`] - read-only gap/spread diagnostics over a merged table
//! - [`resample`] - buckets a merged table into [`Bar`]s with a configurable
//!   anchor offset and [`MissingPolicy`]

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bar;
mod integrity;
mod merge;
mod resampler;

pub use bar::{Bar, Ohlc};
pub use integrity::{GapStats, IntegrityReport};
pub use merge::{MergeOptions, MergedColumn, MergedTable, MergedTick, merge};
pub use resampler::{MissingPolicy, MissingPolicyParseError, ResampleConfig, resample};
