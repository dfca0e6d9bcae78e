use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 12;

/// Uppercased ticker symbol shared by the quote lookup and the gateway contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Trim, uppercase, and validate a ticker typed by the operator.
    ///
    /// Share-class separators (`.`, `-`, and a single inner space as in `BRK B`)
    /// are kept; anything else outside ASCII alphanumerics is rejected.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = normalize(input);
        if normalized.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let len = normalized.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        let mut chars = normalized.chars().enumerate().peekable();
        if let Some((_, first)) = chars.peek() {
            if !first.is_ascii_alphabetic() {
                return Err(ValidationError::SymbolInvalidStart { ch: *first });
            }
        }

        let mut previous_separator = false;
        for (index, ch) in chars {
            let separator = matches!(ch, '.' | '-' | ' ');
            if !(ch.is_ascii_alphanumeric() || separator) || (separator && previous_separator) {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
            previous_separator = separator;
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Uppercase a raw ticker without validating it.
pub fn normalize(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Symbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_lowercase_ticker() {
        assert_eq!(normalize("aapl"), "AAPL");
        let parsed = Symbol::parse(" aapl ").expect("symbol should parse");
        assert_eq!(parsed.as_str(), "AAPL");
    }

    #[test]
    fn keeps_share_class_separators() {
        assert_eq!(Symbol::parse("brk.b").expect("valid").as_str(), "BRK.B");
        assert_eq!(Symbol::parse("BRK B").expect("valid").as_str(), "BRK B");
    }

    #[test]
    fn rejects_invalid_start() {
        let err = Symbol::parse("1AAPL").expect_err("must fail");
        assert!(matches!(err, ValidationError::SymbolInvalidStart { ch: '1' }));
    }

    #[test]
    fn rejects_doubled_separators_and_symbols() {
        assert!(matches!(
            Symbol::parse("BRK..B"),
            Err(ValidationError::SymbolInvalidChar { ch: '.', index: 4 })
        ));
        assert!(matches!(
            Symbol::parse("AAPL$"),
            Err(ValidationError::SymbolInvalidChar { ch: '$', .. })
        ));
    }

    #[test]
    fn rejects_blank_input() {
        assert_eq!(Symbol::parse("   "), Err(ValidationError::EmptySymbol));
    }
}
