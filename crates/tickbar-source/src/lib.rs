//! Tick file discovery and parsing.
//!
//! This crate turns a local tick archive into typed series:
//!
//! - [`FileLocator`] - enumerates a symbol's bid/ask files with optional
//!   date/hour substring filters
//! - [`parse_file`] - parses one gzip or plain delimited tick file into a
//!   [`tickbar_types::SideSeries`]

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod locate;
mod parse;

pub use locate::{FileLocator, SourceConfig, SymbolFiles, locator_at};
pub use parse::{ParseError, parse_file};
