//! Quote provider contract.
//!
//! The workflow only needs one thing from a market-data service: the latest
//! price for a symbol. Adapters implement [`QuoteSource`]; errors are
//! classified by [`SourceErrorKind`] so the CLI can map them to exit codes.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{Quote, Symbol};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Credentials were rejected by the provider.
    Unauthorized,
    /// The provider throttled the request.
    RateLimited,
    /// Network failure, timeout, or an unexpected upstream status.
    Unavailable,
    /// The provider answered with something we could not interpret.
    Internal,
}

/// Structured quote lookup failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unauthorized,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unauthorized => "source.unauthorized",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Single-symbol quote lookup.
///
/// Implementations must be `Send + Sync`; the workflow holds them behind a
/// shared reference while the gateway listener runs on another task.
pub trait QuoteSource: Send + Sync {
    /// Short provider name used in logs and the order ticket.
    fn name(&self) -> &'static str;

    /// Fetch the latest quote for `symbol`.
    ///
    /// A provider that does not know the symbol may still succeed with a
    /// zero price; callers must check [`Quote::is_priced`].
    fn quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, SourceError>> + Send + 'a>>;
}
