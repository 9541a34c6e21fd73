//! Core types for the tickbar OHLC bar builder.
//!
//! This crate provides the fundamental data structures used throughout
//! tickbar:
//!
//! - [`Tick`] - A single one-sided quote event with epoch-millisecond timestamp
//! - [`Side`] / [`SideSeries`] - Bid or ask, and an ordered run of ticks for one side
//! - [`Symbol`] - Currency pair with its quoted decimal precision
//! - [`BucketWidth`] - Resampling bucket width, including anchored calendar widths
//! - [`TickbarError`] - Shared error taxonomy for the whole pipeline

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bucket;
mod error;
mod symbol;
mod tick;

pub use bucket::{BucketWidth, BucketWidthParseError, DEFAULT_ANCHOR_HOUR};
pub use error::{Result, TickbarError};
pub use symbol::{MAJORS, Symbol};
pub use tick::{Side, SideSeries, Tick};
