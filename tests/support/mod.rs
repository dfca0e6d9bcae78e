//! Shared fakes for behavior tests: an in-process TWS server, a recording
//! HTTP transport, and scripted quote source / gateway doubles.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tickfire_core::gateway::wire::{frame_fields, read_frame, split_fields};
use tickfire_core::{
    Contract, GatewayConfig, GatewayError, GatewayEvent, HttpClient, HttpError, HttpRequest,
    HttpResponse, Order, OrderGateway, OrderId, Quote, QuoteSource, SourceError, Symbol,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

// =============================================================================
// Fake TWS server
// =============================================================================

/// What the fake server says and when.
#[derive(Debug, Clone)]
pub struct TwsScript {
    pub server_version: i32,
    /// Sent right after START_API; `None` simulates a gateway that never becomes ready.
    pub next_valid_id: Option<i64>,
    /// Frames sent back after each PLACE_ORDER; `{id}` is replaced by the order id.
    pub on_place_order: Vec<Vec<String>>,
}

impl TwsScript {
    pub fn ready_at(next_valid_id: i64) -> Self {
        Self {
            server_version: 151,
            next_valid_id: Some(next_valid_id),
            on_place_order: Vec::new(),
        }
    }

    pub fn never_ready() -> Self {
        Self {
            server_version: 151,
            next_valid_id: None,
            on_place_order: Vec::new(),
        }
    }

    pub fn with_server_version(mut self, server_version: i32) -> Self {
        self.server_version = server_version;
        self
    }

    pub fn reply_to_place_order(mut self, fields: &[&str]) -> Self {
        self.on_place_order
            .push(fields.iter().map(|field| (*field).to_owned()).collect());
        self
    }
}

/// What the fake server observed from the client.
#[derive(Debug, Default, Clone)]
pub struct TwsTranscript {
    pub preamble: Vec<u8>,
    pub version_range: String,
    /// Every framed message after the handshake, split into fields.
    pub messages: Vec<Vec<String>>,
}

impl TwsTranscript {
    pub fn messages_with_id(&self, message_id: &str) -> Vec<&Vec<String>> {
        self.messages
            .iter()
            .filter(|fields| fields.first().map(String::as_str) == Some(message_id))
            .collect()
    }
}

/// Single-connection TWS stand-in bound to an ephemeral local port.
pub struct FakeTws {
    address: SocketAddr,
    task: JoinHandle<TwsTranscript>,
}

impl FakeTws {
    pub async fn start(script: TwsScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake tws");
        let address = listener.local_addr().expect("local address");
        let task = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept client");
            serve(stream, script).await
        });
        Self { address, task }
    }

    pub fn config(&self) -> GatewayConfig {
        GatewayConfig {
            host: self.address.ip().to_string(),
            port: self.address.port(),
            client_id: 7,
            connect_timeout: Duration::from_secs(2),
            ready_timeout: Duration::from_millis(500),
        }
    }

    /// Wait for the client to hang up and return what it sent.
    pub async fn transcript(self) -> TwsTranscript {
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("client should close the connection")
            .expect("fake tws task")
    }
}

async fn serve(mut stream: TcpStream, script: TwsScript) -> TwsTranscript {
    let mut transcript = TwsTranscript::default();

    let mut preamble = [0_u8; 4];
    stream.read_exact(&mut preamble).await.expect("preamble");
    transcript.preamble = preamble.to_vec();

    let range = read_frame(&mut stream)
        .await
        .expect("version frame")
        .expect("version frame present");
    transcript.version_range = String::from_utf8_lossy(&range).into_owned();

    let handshake = frame_fields([
        script.server_version.to_string(),
        String::from("20261018 09:30:00 EST"),
    ]);
    if stream.write_all(&handshake).await.is_err() {
        return transcript;
    }

    let mut greeted = false;
    loop {
        let payload = match read_frame(&mut stream).await {
            Ok(Some(payload)) => payload,
            Ok(None) | Err(_) => break,
        };
        let fields = split_fields(&payload);
        let message_id = fields.first().cloned().unwrap_or_default();
        let order_id = fields.get(1).cloned().unwrap_or_default();
        transcript.messages.push(fields);

        let mut replies = Vec::new();
        if message_id == "71" && !greeted {
            greeted = true;
            replies.push(frame_fields(["15", "1", "DU1234567"]));
            if let Some(next_valid_id) = script.next_valid_id {
                replies.push(frame_fields([
                    String::from("9"),
                    String::from("1"),
                    next_valid_id.to_string(),
                ]));
            }
        } else if message_id == "3" {
            for template in &script.on_place_order {
                replies.push(frame_fields(
                    template.iter().map(|field| field.replace("{id}", &order_id)),
                ));
            }
        }

        for reply in replies {
            if stream.write_all(&reply).await.is_err() {
                return transcript;
            }
        }
    }

    transcript
}

/// Poll `probe` until it holds or `limit` elapses.
pub async fn eventually<F>(limit: Duration, mut probe: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if probe() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    probe()
}

pub fn count_events(events: &[GatewayEvent], predicate: impl Fn(&GatewayEvent) -> bool) -> usize {
    events.iter().filter(|event| predicate(event)).count()
}

// =============================================================================
// HTTP transport double
// =============================================================================

/// Returns a canned response and records every request.
pub struct RecordingHttpClient {
    response: Result<HttpResponse, HttpError>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingHttpClient {
    pub fn responding(response: HttpResponse) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(response),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: HttpError) -> Arc<Self> {
        Arc::new(Self {
            response: Err(error),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl HttpClient for RecordingHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests.lock().expect("requests lock").push(request);
        let response = self.response.clone();
        Box::pin(async move { response })
    }
}

// =============================================================================
// Quote source double
// =============================================================================

/// Answers every lookup with the same price or error.
pub struct StaticQuoteSource {
    outcome: Result<f64, SourceError>,
    lookups: Mutex<Vec<Symbol>>,
}

impl StaticQuoteSource {
    pub fn priced(price: f64) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(price),
            lookups: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: SourceError) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(error),
            lookups: Mutex::new(Vec::new()),
        })
    }

    pub fn lookups(&self) -> Vec<Symbol> {
        self.lookups.lock().expect("lookups lock").clone()
    }
}

impl QuoteSource for StaticQuoteSource {
    fn name(&self) -> &'static str {
        "static"
    }

    fn quote<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, SourceError>> + Send + 'a>> {
        self.lookups
            .lock()
            .expect("lookups lock")
            .push(symbol.clone());
        let outcome = self.outcome.clone();
        Box::pin(async move {
            let price = outcome?;
            Ok(Quote::new(symbol.clone(), price).expect("test prices are valid"))
        })
    }
}

// =============================================================================
// Gateway double
// =============================================================================

/// Records submissions and disconnects instead of talking to TWS.
#[derive(Debug, Default)]
pub struct RecordingGateway {
    pub next_order_id: i64,
    pub placed: Vec<(OrderId, Contract, Order)>,
    pub disconnects: usize,
    pub reject_orders: bool,
}

impl RecordingGateway {
    pub fn starting_at(next_order_id: i64) -> Self {
        Self {
            next_order_id,
            ..Self::default()
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject_orders: true,
            ..Self::default()
        }
    }
}

impl OrderGateway for RecordingGateway {
    fn place_order<'a>(
        &'a mut self,
        contract: &'a Contract,
        order: &'a Order,
    ) -> Pin<Box<dyn Future<Output = Result<OrderId, GatewayError>> + Send + 'a>> {
        Box::pin(async move {
            if self.reject_orders {
                return Err(GatewayError::Disconnected);
            }
            let order_id = OrderId::new(self.next_order_id);
            self.next_order_id += 1;
            self.placed.push((order_id, contract.clone(), order.clone()));
            Ok(order_id)
        })
    }

    fn disconnect<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<(), GatewayError>> + Send + 'a>> {
        Box::pin(async move {
            self.disconnects += 1;
            Ok(())
        })
    }
}
