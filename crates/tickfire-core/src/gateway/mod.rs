//! # Brokerage Gateway
//!
//! Client for the TWS / IB Gateway socket API, limited to what a one-shot
//! order needs: handshake, readiness, order submission, and event callbacks.
//!
//! ```text
//! connect ──▶ API\0 + v100..151 ──▶ server version ──▶ START_API
//!                                                        │
//!          listener task ◀── nextValidId ◀───────────────┘
//!                │  (first id handed off over a oneshot)
//!                ▼
//!          GatewayEvents callbacks (status, open order, execution, notices)
//! ```
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`wire`] | Framing and field codecs |
//! | [`messages`] | Message ids, decoders, and encoders |
//! | [`events`] | Callback trait and logging handlers |

mod client;
pub mod events;
pub mod messages;
pub mod wire;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

pub use client::{GatewayConfig, GatewaySession, REQUIRED_SERVER_VERSION};
pub use events::{EventJournal, GatewayEvents, LoggingEvents};
pub use messages::{
    ExecutionReport, GatewayEvent, GatewayNotice, OpenOrderSummary, OrderStatusUpdate,
};
pub use wire::WireError;

use crate::{Contract, Order, OrderId};

/// Gateway connection and protocol failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to connect to gateway at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out connecting to gateway at {address}")]
    ConnectTimeout { address: String },

    #[error("gateway handshake failed: {0}")]
    Handshake(String),

    #[error("gateway server version {actual} is older than the required {required}")]
    UnsupportedServerVersion { actual: i32, required: i32 },

    #[error("gateway not ready: no valid order id received within {timeout_ms} ms")]
    NotReady { timeout_ms: u64 },

    #[error("gateway listener stopped before the connection became ready")]
    ListenerClosed,

    #[error("gateway session is already disconnected")]
    Disconnected,

    #[error(transparent)]
    Wire(#[from] WireError),
}

impl From<std::io::Error> for GatewayError {
    fn from(error: std::io::Error) -> Self {
        Self::Wire(WireError::Io(error))
    }
}

/// Order submission seam used by the workflow.
pub trait OrderGateway: Send {
    /// Submit `order` for `contract` under the next order id.
    fn place_order<'a>(
        &'a mut self,
        contract: &'a Contract,
        order: &'a Order,
    ) -> Pin<Box<dyn Future<Output = Result<OrderId, GatewayError>> + Send + 'a>>;

    /// Release the connection. Must be safe to call more than once.
    fn disconnect<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<(), GatewayError>> + Send + 'a>>;
}
