//! Tick file discovery.

use std::path::{Path, PathBuf};

use tickbar_types::{Result, Side, Symbol, TickbarError};
use tracing::debug;

/// Configuration for the local tick archive.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Root directory holding one subdirectory per symbol.
    pub root: PathBuf,
    /// File extension of plain (uncompressed) tick files.
    pub extension: String,
    /// Field delimiter within tick rows.
    pub delimiter: char,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            extension: ".csv".to_string(),
            delimiter: ',',
        }
    }
}

impl SourceConfig {
    /// Creates a config rooted at the given archive directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Overrides the plain-file extension (e.g. `.log.gz`).
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

/// A symbol's source files, partitioned by side.
///
/// Paths are sorted by file name, so zero-padded hour-chunked names come out
/// in ascending time order.
#[derive(Debug, Clone, Default)]
pub struct SymbolFiles {
    /// Bid-side files.
    pub bid: Vec<PathBuf>,
    /// Ask-side files.
    pub ask: Vec<PathBuf>,
}

impl SymbolFiles {
    /// Total number of files across both sides.
    #[must_use]
    pub fn total(&self) -> usize {
        self.bid.len() + self.ask.len()
    }

    /// Returns the file list for one side.
    #[must_use]
    pub fn side(&self, side: Side) -> &[PathBuf] {
        match side {
            Side::Bid => &self.bid,
            Side::Ask => &self.ask,
        }
    }
}

/// Enumerates a symbol's bid and ask tick files.
#[derive(Debug, Clone)]
pub struct FileLocator {
    config: SourceConfig,
}

impl FileLocator {
    /// Creates a locator over the given archive.
    #[must_use]
    pub const fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    /// Returns the locator's configuration.
    #[must_use]
    pub const fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Locates the symbol's files, optionally filtered by date and hour
    /// substrings.
    ///
    /// File names carry no structure beyond the side marker and the
    /// configured extension; filters are plain substring matches, exactly as
    /// the archive's naming scheme expects.
    ///
    /// # Errors
    ///
    /// Returns [`TickbarError::NotFound`] when nothing matches. Callers must
    /// treat that as a benign skip, not a failure.
    pub fn locate(
        &self,
        symbol: &Symbol,
        date: Option<&str>,
        hour: Option<&str>,
    ) -> Result<SymbolFiles> {
        let not_found = || TickbarError::NotFound {
            symbol: symbol.code().to_string(),
            date: date.unwrap_or_default().to_string(),
            hour: hour.unwrap_or_default().to_string(),
        };

        let dir = self.config.root.join(symbol.code());
        if !dir.is_dir() {
            return Err(not_found());
        }

        let mut names: Vec<String> = std::fs::read_dir(&dir)?
            .filter_map(std::result::Result::ok)
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(&self.config.extension))
            .filter(|name| date.is_none_or(|d| name.contains(d)))
            .filter(|name| hour.is_none_or(|h| name.contains(h)))
            .collect();

        if names.is_empty() {
            return Err(not_found());
        }
        names.sort();
        debug!(symbol = %symbol, files = names.len(), "matched tick files");

        let mut files = SymbolFiles::default();
        for name in names {
            let path = dir.join(&name);
            if name.contains(Side::Bid.marker()) {
                files.bid.push(path);
            } else if name.contains(Side::Ask.marker()) {
                files.ask.push(path);
            }
        }

        if files.total() == 0 {
            return Err(not_found());
        }
        Ok(files)
    }
}

/// Convenience constructor: locator rooted at `root` with defaults.
#[must_use]
pub fn locator_at(root: impl AsRef<Path>) -> FileLocator {
    FileLocator::new(SourceConfig::new(root.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn archive_with(files: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let symbol_dir = dir.path().join("EURUSD");
        fs::create_dir(&symbol_dir).unwrap();
        for name in files {
            fs::write(symbol_dir.join(name), "").unwrap();
        }
        dir
    }

    #[test]
    fn test_locate_partitions_sides() {
        let dir = archive_with(&[
            "EURUSD-BID-2021-05-21-03.csv",
            "EURUSD-ASK-2021-05-21-03.csv",
            "EURUSD-BID-2021-05-21-04.csv",
        ]);
        let locator = locator_at(dir.path());
        let files = locator.locate(&Symbol::resolve("EURUSD"), None, None).unwrap();

        assert_eq!(files.bid.len(), 2);
        assert_eq!(files.ask.len(), 1);
    }

    #[test]
    fn test_locate_sorted_ascending() {
        let dir = archive_with(&[
            "EURUSD-BID-2021-05-21-11.csv",
            "EURUSD-BID-2021-05-21-03.csv",
        ]);
        let locator = locator_at(dir.path());
        let files = locator.locate(&Symbol::resolve("EURUSD"), None, None).unwrap();

        let names: Vec<_> = files
            .bid
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "EURUSD-BID-2021-05-21-03.csv",
                "EURUSD-BID-2021-05-21-11.csv"
            ]
        );
    }

    #[test]
    fn test_locate_date_and_hour_filters() {
        let dir = archive_with(&[
            "EURUSD-BID-2021-05-21-03.csv",
            "EURUSD-BID-2021-05-22-03.csv",
            "EURUSD-ASK-2021-05-22-04.csv",
        ]);
        let locator = locator_at(dir.path());

        let files = locator
            .locate(&Symbol::resolve("EURUSD"), Some("2021-05-22"), None)
            .unwrap();
        assert_eq!(files.total(), 2);

        let files = locator
            .locate(&Symbol::resolve("EURUSD"), Some("2021-05-22"), Some("-04"))
            .unwrap();
        assert_eq!(files.total(), 1);
        assert_eq!(files.ask.len(), 1);
    }

    #[test]
    fn test_locate_not_found_is_benign() {
        let dir = archive_with(&["EURUSD-BID-2021-05-21-03.csv"]);
        let locator = locator_at(dir.path());

        let err = locator
            .locate(&Symbol::resolve("GBPUSD"), None, None)
            .unwrap_err();
        assert!(err.is_benign());

        let err = locator
            .locate(&Symbol::resolve("EURUSD"), Some("1999"), None)
            .unwrap_err();
        assert!(err.is_benign());
    }

    #[test]
    fn test_locate_ignores_other_extensions() {
        let dir = archive_with(&["EURUSD-BID-2021-05-21-03.txt"]);
        let locator = locator_at(dir.path());
        assert!(
            locator
                .locate(&Symbol::resolve("EURUSD"), None, None)
                .is_err()
        );
    }
}
