use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::http_client::{HttpAuth, HttpClient, HttpRequest, ReqwestHttpClient};
use crate::quote_source::{QuoteSource, SourceError};
use crate::{Quote, Symbol, UtcDateTime, ValidationError};

const FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";
const FINNHUB_TOKEN_HEADER: &str = "X-Finnhub-Token";

/// Finnhub `/quote` adapter.
#[derive(Clone)]
pub struct FinnhubAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
    timeout_ms: u64,
}

impl FinnhubAdapter {
    /// Adapter using the production reqwest transport.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), api_key)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            base_url: String::from(FINNHUB_BASE_URL),
            timeout_ms: 5_000,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn quote_request(&self, symbol: &Symbol) -> HttpRequest {
        let auth = HttpAuth::Header {
            name: String::from(FINNHUB_TOKEN_HEADER),
            value: self.api_key.clone(),
        };
        HttpRequest::get(format!("{}/quote", self.base_url))
            .with_query("symbol", symbol.as_str())
            .with_auth(&auth)
            .with_timeout_ms(self.timeout_ms)
    }

    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, SourceError> {
        let response = self
            .http_client
            .execute(self.quote_request(symbol))
            .await
            .map_err(|error| {
                if error.timed_out() {
                    SourceError::unavailable(format!(
                        "finnhub request timed out after {}ms",
                        self.timeout_ms
                    ))
                } else {
                    SourceError::unavailable(format!(
                        "finnhub transport error: {}",
                        error.message()
                    ))
                }
            })?;

        match response.status {
            401 | 403 => {
                return Err(SourceError::unauthorized(format!(
                    "finnhub rejected the API key (status {})",
                    response.status
                )))
            }
            429 => {
                return Err(SourceError::rate_limited(
                    "finnhub API limit reached (status 429)",
                ))
            }
            _ if !response.is_success() => {
                return Err(SourceError::unavailable(format!(
                    "finnhub returned status {}",
                    response.status
                )))
            }
            _ => {}
        }

        let payload: FinnhubQuotePayload = serde_json::from_str(&response.body).map_err(|e| {
            SourceError::internal(format!("failed to parse finnhub quote response: {e}"))
        })?;

        if let Some(message) = payload.error {
            return Err(SourceError::unauthorized(format!("finnhub error: {message}")));
        }

        normalize_quote(symbol.clone(), payload).map_err(validation_to_error)
    }
}

impl Debug for FinnhubAdapter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinnhubAdapter")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl QuoteSource for FinnhubAdapter {
    fn name(&self) -> &'static str {
        "finnhub"
    }

    fn quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_quote(symbol))
    }
}

/// Finnhub quote body: `c` current, `o`/`h`/`l` session, `pc` previous close,
/// `t` epoch seconds. Unknown symbols come back with every field zeroed.
#[derive(Debug, Deserialize)]
struct FinnhubQuotePayload {
    #[serde(default)]
    c: Option<f64>,
    #[serde(default)]
    o: Option<f64>,
    #[serde(default)]
    h: Option<f64>,
    #[serde(default)]
    l: Option<f64>,
    #[serde(default)]
    pc: Option<f64>,
    #[serde(default)]
    t: Option<i64>,
    #[serde(default)]
    error: Option<String>,
}

fn normalize_quote(symbol: Symbol, payload: FinnhubQuotePayload) -> Result<Quote, ValidationError> {
    let quote = Quote::new(symbol, payload.c.unwrap_or(0.0))?.with_session(
        non_zero(payload.o),
        non_zero(payload.h),
        non_zero(payload.l),
        non_zero(payload.pc),
    )?;

    match payload.t.filter(|seconds| *seconds > 0) {
        Some(seconds) => Ok(quote.with_as_of(UtcDateTime::from_unix_seconds(seconds)?)),
        None => Ok(quote),
    }
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|value| *value != 0.0)
}

fn validation_to_error(error: ValidationError) -> SourceError {
    SourceError::internal(format!("finnhub quote failed validation: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_symbol_and_token_header() {
        let adapter = FinnhubAdapter::new("key-123").with_base_url("https://example.test/api/v1/");
        let request = adapter.quote_request(&Symbol::parse("aapl").expect("valid"));

        assert_eq!(
            request.full_url(),
            "https://example.test/api/v1/quote?symbol=AAPL"
        );
        assert_eq!(
            request.headers.get("x-finnhub-token").map(String::as_str),
            Some("key-123")
        );
    }

    #[test]
    fn zeroed_payload_normalizes_to_unpriced_quote() {
        let payload: FinnhubQuotePayload = serde_json::from_str(
            r#"{"c":0,"d":null,"dp":null,"h":0,"l":0,"o":0,"pc":0,"t":0}"#,
        )
        .expect("payload parses");
        let quote = normalize_quote(Symbol::parse("NOPE").expect("valid"), payload)
            .expect("zero quote is valid");

        assert!(!quote.is_priced());
        assert_eq!(quote.open, None);
        assert_eq!(quote.as_of, None);
    }

    #[test]
    fn debug_output_hides_api_key() {
        let adapter = FinnhubAdapter::new("super-secret");
        assert!(!format!("{adapter:?}").contains("super-secret"));
    }
}
