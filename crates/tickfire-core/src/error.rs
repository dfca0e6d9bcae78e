use thiserror::Error;

/// Validation errors raised while parsing operator input into domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("currency must be a 3-letter ISO code: '{value}'")]
    InvalidCurrency { value: String },
    #[error("exchange must be a non-empty alphanumeric routing code: '{value}'")]
    InvalidExchange { value: String },

    #[error("unknown security type '{value}', expected one of STK, OPT, FUT, CASH, IND, CFD, BOND, FUND, CRYPTO")]
    UnknownSecurityType { value: String },
    #[error("unknown order type '{value}', expected one of MKT, LMT, MOC, LOC")]
    UnknownOrderType { value: String },
    #[error("unknown order action '{value}', expected BUY or SELL")]
    UnknownAction { value: String },

    #[error("order type {order_type} requires a limit price")]
    MissingLimitPrice { order_type: &'static str },
    #[error("order type {order_type} does not take a limit price")]
    UnexpectedLimitPrice { order_type: &'static str },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("field '{field}' must be positive")]
    NonPositiveValue { field: &'static str },

    #[error("unix timestamp {value} is out of range")]
    InvalidTimestamp { value: i64 },
}

pub(crate) fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

pub(crate) fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_non_negative(field, value)?;
    }
    Ok(())
}
