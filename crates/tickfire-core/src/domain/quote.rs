use serde::Serialize;

use crate::error::{validate_non_negative, validate_optional_non_negative};
use crate::{Symbol, UtcDateTime, ValidationError};

/// Latest price snapshot for one symbol.
///
/// A `price` of zero is representable: providers report it for unknown
/// symbols, and callers decide what it means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: f64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub previous_close: Option<f64>,
    pub as_of: Option<UtcDateTime>,
}

impl Quote {
    pub fn new(symbol: Symbol, price: f64) -> Result<Self, ValidationError> {
        validate_non_negative("price", price)?;
        Ok(Self {
            symbol,
            price,
            open: None,
            high: None,
            low: None,
            previous_close: None,
            as_of: None,
        })
    }

    pub fn with_session(
        mut self,
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
        previous_close: Option<f64>,
    ) -> Result<Self, ValidationError> {
        validate_optional_non_negative("open", open)?;
        validate_optional_non_negative("high", high)?;
        validate_optional_non_negative("low", low)?;
        validate_optional_non_negative("previous_close", previous_close)?;
        self.open = open;
        self.high = high;
        self.low = low;
        self.previous_close = previous_close;
        Ok(self)
    }

    pub fn with_as_of(mut self, as_of: UtcDateTime) -> Self {
        self.as_of = Some(as_of);
        self
    }

    pub fn is_priced(&self) -> bool {
        self.price > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_price_is_representable_but_unpriced() {
        let quote = Quote::new(Symbol::parse("ZZZZ").expect("valid"), 0.0).expect("zero is allowed");
        assert!(!quote.is_priced());
    }

    #[test]
    fn rejects_negative_and_non_finite_prices() {
        let symbol = Symbol::parse("AAPL").expect("valid");
        assert!(matches!(
            Quote::new(symbol.clone(), -1.0),
            Err(ValidationError::NegativeValue { field: "price" })
        ));
        assert!(matches!(
            Quote::new(symbol, f64::NAN),
            Err(ValidationError::NonFiniteValue { field: "price" })
        ));
    }
}
