use thiserror::Error;
use tickfire_core::{GatewayError, SourceError, Symbol, WorkflowError};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickfire_core::ValidationError),

    #[error("quote invalid: bad API key or unknown symbol '{symbol}'")]
    InvalidQuote { symbol: Symbol },

    #[error("quote lookup failed: {0}")]
    Quote(SourceError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::InvalidQuote { .. } => 3,
            Self::Quote(_) => 3,
            Self::Gateway(_) => 4,
            Self::Serialization(_) => 10,
            Self::Io(_) => 10,
        }
    }
}

impl From<WorkflowError> for CliError {
    fn from(error: WorkflowError) -> Self {
        match error {
            WorkflowError::InvalidQuote { symbol } => Self::InvalidQuote { symbol },
            WorkflowError::Source(error) => Self::Quote(error),
            WorkflowError::Gateway(error) => Self::Gateway(error),
        }
    }
}
