//! Error types shared across the pipeline.

use crate::Side;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tickbar operations.
pub type Result<T> = std::result::Result<T, TickbarError>;

/// Errors that can occur while building bar series from tick files.
#[derive(Error, Debug)]
pub enum TickbarError {
    /// No source files matched the requested symbol/date/hour filter.
    ///
    /// Benign: callers skip the unit and continue with the rest of a batch.
    #[error("no tick files found for {symbol} (date '{date}', hour '{hour}')")]
    NotFound {
        /// Symbol the lookup was for.
        symbol: String,
        /// Date substring filter, empty when unfiltered.
        date: String,
        /// Hour substring filter, empty when unfiltered.
        hour: String,
    },

    /// A source file has an unrecognized extension or a malformed row.
    ///
    /// Fatal for the unit: corrupt input must surface, never produce bars.
    #[error("parse error: {0}")]
    Parse(String),

    /// One side had zero usable records after parsing.
    #[error("no {0} records to merge")]
    EmptyInput(Side),

    /// Persisted series columns differ from the newly computed bars.
    #[error("schema mismatch in {path:?}: existing columns '{existing}' != incoming '{incoming}'")]
    SchemaMismatch {
        /// The persisted series file.
        path: PathBuf,
        /// Header found in the existing file.
        existing: String,
        /// Header of the bars being appended.
        incoming: String,
    },

    /// A diagnostic artifact could not be produced.
    ///
    /// Chart rendering failures are downgraded to warnings by callers.
    #[error("artifact error: {0}")]
    Artifact(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TickbarError {
    /// Returns true when the error means "nothing to do" rather than failure.
    #[must_use]
    pub const fn is_benign(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
