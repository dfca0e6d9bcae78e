use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::events::{dispatch, GatewayEvents};
use super::messages::{
    decode_event, encode_place_order, encode_start_api, GatewayEvent, ServerHandshake,
};
use super::wire::{handshake_bytes, read_frame, split_fields, MAX_CLIENT_VERSION};
use super::{GatewayError, OrderGateway};
use crate::{Contract, Order, OrderId, OrderIdSequence};

/// Message layouts are written for this version, so older servers are refused.
pub const REQUIRED_SERVER_VERSION: i32 = MAX_CLIENT_VERSION;

/// Where and how to reach the trading terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub client_id: i32,
    pub connect_timeout: Duration,
    /// Bound on the wait for the first valid order id after the handshake.
    pub ready_timeout: Duration,
}

impl GatewayConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 7496,
            client_id: 1,
            connect_timeout: Duration::from_secs(5),
            ready_timeout: Duration::from_secs(5),
        }
    }
}

/// Live connection to TWS / IB Gateway.
///
/// The connection is released on every path: [`GatewaySession::disconnect`]
/// closes it explicitly, and dropping the session aborts the listener task,
/// which closes the socket.
#[derive(Debug)]
pub struct GatewaySession {
    writer: Option<OwnedWriteHalf>,
    listener: Option<JoinHandle<()>>,
    order_ids: OrderIdSequence,
    server_version: i32,
}

impl GatewaySession {
    /// Connect, negotiate, and wait until the gateway reports its first valid
    /// order id.
    pub async fn connect(
        config: &GatewayConfig,
        handler: Arc<dyn GatewayEvents>,
    ) -> Result<Self, GatewayError> {
        let address = config.address();
        info!(%address, client_id = config.client_id, "connecting to gateway");

        let mut stream = timeout(config.connect_timeout, TcpStream::connect(&address))
            .await
            .map_err(|_| GatewayError::ConnectTimeout {
                address: address.clone(),
            })?
            .map_err(|source| GatewayError::Connect {
                address: address.clone(),
                source,
            })?;
        stream.set_nodelay(true)?;

        let handshake = negotiate(&mut stream, config).await?;
        info!(
            server_version = handshake.server_version,
            connection_time = %handshake.connection_time,
            "gateway handshake complete"
        );

        let (reader, writer) = stream.into_split();
        let (ready_tx, ready_rx) = oneshot::channel();
        let listener = tokio::spawn(listen(reader, handler, ready_tx));

        let first_order_id = match timeout(config.ready_timeout, ready_rx).await {
            Ok(Ok(order_id)) => order_id,
            Ok(Err(_)) => {
                listener.abort();
                return Err(GatewayError::ListenerClosed);
            }
            Err(_) => {
                listener.abort();
                return Err(GatewayError::NotReady {
                    timeout_ms: duration_ms(config.ready_timeout),
                });
            }
        };

        Ok(Self {
            writer: Some(writer),
            listener: Some(listener),
            order_ids: OrderIdSequence::starting_at(first_order_id),
            server_version: handshake.server_version,
        })
    }

    pub const fn server_version(&self) -> i32 {
        self.server_version
    }

    /// Id the next submission will use.
    pub fn next_order_id(&self) -> OrderId {
        self.order_ids.peek()
    }

    pub fn is_connected(&self) -> bool {
        self.writer.is_some()
    }

    /// Submit one order under a fresh order id.
    pub async fn place_order(
        &mut self,
        contract: &Contract,
        order: &Order,
    ) -> Result<OrderId, GatewayError> {
        let writer = self.writer.as_mut().ok_or(GatewayError::Disconnected)?;
        let order_id = self.order_ids.next_id();

        writer
            .write_all(&encode_place_order(order_id, contract, order))
            .await?;
        writer.flush().await?;

        info!(
            %order_id,
            symbol = %contract.symbol,
            action = %order.action,
            order_type = %order.order_type,
            quantity = order.quantity,
            "order submitted to gateway"
        );
        Ok(order_id)
    }

    /// Close the connection and stop the listener. Calling it twice is a no-op.
    pub async fn disconnect(&mut self) -> Result<(), GatewayError> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };

        let shutdown = writer.shutdown().await;
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        info!("disconnected from gateway");
        shutdown.map_err(GatewayError::from)
    }
}

impl Drop for GatewaySession {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
            if self.writer.is_some() {
                debug!("gateway session dropped without disconnect; connection released");
            }
        }
    }
}

impl OrderGateway for GatewaySession {
    fn place_order<'a>(
        &'a mut self,
        contract: &'a Contract,
        order: &'a Order,
    ) -> Pin<Box<dyn Future<Output = Result<OrderId, GatewayError>> + Send + 'a>> {
        Box::pin(GatewaySession::place_order(self, contract, order))
    }

    fn disconnect<'a>(
        &'a mut self,
    ) -> Pin<Box<dyn Future<Output = Result<(), GatewayError>> + Send + 'a>> {
        Box::pin(GatewaySession::disconnect(self))
    }
}

async fn negotiate(
    stream: &mut TcpStream,
    config: &GatewayConfig,
) -> Result<ServerHandshake, GatewayError> {
    stream.write_all(&handshake_bytes()).await?;

    let reply = timeout(config.ready_timeout, read_frame(&mut *stream))
        .await
        .map_err(|_| GatewayError::Handshake(String::from("timed out waiting for server version")))??
        .ok_or_else(|| {
            GatewayError::Handshake(String::from(
                "connection closed before the server version was received",
            ))
        })?;

    let handshake = ServerHandshake::decode(&split_fields(&reply))?;
    if handshake.server_version < REQUIRED_SERVER_VERSION {
        return Err(GatewayError::UnsupportedServerVersion {
            actual: handshake.server_version,
            required: REQUIRED_SERVER_VERSION,
        });
    }

    stream
        .write_all(&encode_start_api(config.client_id))
        .await?;
    Ok(handshake)
}

/// Service the inbound stream until the gateway closes it or the task is aborted.
///
/// The first `nextValidId` is handed to the connecting task through `ready`.
async fn listen(
    mut reader: OwnedReadHalf,
    handler: Arc<dyn GatewayEvents>,
    ready: oneshot::Sender<OrderId>,
) {
    let mut ready = Some(ready);

    loop {
        let payload = match read_frame(&mut reader).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("gateway closed the connection");
                break;
            }
            Err(error) => {
                warn!(%error, "gateway listener stopped");
                break;
            }
        };

        let event = match decode_event(&split_fields(&payload)) {
            Ok(event) => event,
            Err(error) => {
                warn!(%error, "failed to decode gateway message");
                continue;
            }
        };

        if let GatewayEvent::NextValidId { order_id } = &event {
            if let Some(sender) = ready.take() {
                let _ = sender.send(*order_id);
            }
        }
        dispatch(handler.as_ref(), &event);
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_local_tws() {
        let config = GatewayConfig::default();
        assert_eq!(config.address(), "127.0.0.1:7496");
        assert_eq!(config.client_id, 1);
    }
}
