//! Symbol metadata.

use serde::{Deserialize, Serialize};

/// A currency-pair symbol with its quoted decimal precision.
///
/// The precision feeds mid-price rounding during resampling: most pairs
/// quote 5 decimal digits, JPY-quoted pairs quote 3.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    code: String,
    digits: u32,
}

/// The G8 major pairs processed by default.
pub const MAJORS: &[&str] = &[
    "EURUSD", "GBPUSD", "USDJPY", "USDCHF", "AUDUSD", "USDCAD", "NZDUSD",
];

impl Symbol {
    /// Creates a symbol with an explicit decimal precision.
    #[must_use]
    pub fn new(code: impl Into<String>, digits: u32) -> Self {
        Self {
            code: code.into().to_uppercase(),
            digits,
        }
    }

    /// Resolves a symbol code, inferring precision from the quote currency.
    #[must_use]
    pub fn resolve(code: &str) -> Self {
        let code = code.to_uppercase();
        let digits = if code.ends_with("JPY") { 3 } else { 5 };
        Self { code, digits }
    }

    /// Returns the upper-case pair code (e.g. `EURUSD`).
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the quoted decimal precision.
    #[must_use]
    pub const fn digits(&self) -> u32 {
        self.digits
    }

    /// Overrides the decimal precision.
    #[must_use]
    pub const fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_default_digits() {
        let symbol = Symbol::resolve("audusd");
        assert_eq!(symbol.code(), "AUDUSD");
        assert_eq!(symbol.digits(), 5);
    }

    #[test]
    fn test_resolve_jpy_digits() {
        assert_eq!(Symbol::resolve("usdjpy").digits(), 3);
        assert_eq!(Symbol::resolve("EURJPY").digits(), 3);
    }

    #[test]
    fn test_with_digits() {
        let symbol = Symbol::resolve("xauusd").with_digits(2);
        assert_eq!(symbol.digits(), 2);
    }

    #[test]
    fn test_majors() {
        assert!(MAJORS.contains(&"EURUSD"));
        assert_eq!(MAJORS.len(), 7);
    }
}
