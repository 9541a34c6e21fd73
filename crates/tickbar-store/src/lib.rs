//! Persisted bar series and diagnostic artifacts.
//!
//! - [`BarStore`] - flat CSV store keyed by (symbol, bucket width), with
//!   idempotent old-wins append
//! - [`merge_series`] - the timestamp-deduplicating merge underlying append
//! - [`render_spread_profile`] - advisory spread-by-hour SVG chart

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod chart;
mod series;

pub use chart::render_spread_profile;
pub use series::{AppendOutcome, BarStore, merge_series};
