use std::sync::Mutex;

use tracing::{debug, info, warn};

use super::messages::{
    ExecutionReport, GatewayEvent, GatewayNotice, OpenOrderSummary, OrderStatusUpdate,
};
use crate::OrderId;

/// Callbacks invoked by the session's listener task, one per event type.
///
/// Every method has a no-op default so handlers only implement what they
/// observe. Calls arrive on the listener task, never concurrently with each
/// other.
pub trait GatewayEvents: Send + Sync {
    fn on_ready(&self, next_order_id: OrderId) {
        let _ = next_order_id;
    }

    fn on_order_status(&self, status: &OrderStatusUpdate) {
        let _ = status;
    }

    fn on_open_order(&self, order: &OpenOrderSummary) {
        let _ = order;
    }

    fn on_execution(&self, execution: &ExecutionReport) {
        let _ = execution;
    }

    fn on_notice(&self, notice: &GatewayNotice) {
        let _ = notice;
    }

    fn on_managed_accounts(&self, accounts: &[String]) {
        let _ = accounts;
    }
}

/// Route a decoded event to the matching callback.
pub fn dispatch(handler: &dyn GatewayEvents, event: &GatewayEvent) {
    match event {
        GatewayEvent::NextValidId { order_id } => handler.on_ready(*order_id),
        GatewayEvent::OrderStatus(status) => handler.on_order_status(status),
        GatewayEvent::OpenOrder(order) => handler.on_open_order(order),
        GatewayEvent::Execution(execution) => handler.on_execution(execution),
        GatewayEvent::Notice(notice) => handler.on_notice(notice),
        GatewayEvent::ManagedAccounts { accounts } => handler.on_managed_accounts(accounts),
        GatewayEvent::Unhandled { message_id } => {
            debug!(message_id, "ignoring unhandled gateway message");
        }
    }
}

/// Logs every callback for operator visibility.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEvents;

impl GatewayEvents for LoggingEvents {
    fn on_ready(&self, next_order_id: OrderId) {
        info!(%next_order_id, "gateway ready; next valid order id received");
    }

    fn on_order_status(&self, status: &OrderStatusUpdate) {
        info!(
            order_id = %status.order_id,
            status = %status.status,
            filled = status.filled,
            remaining = status.remaining,
            last_fill_price = status.last_fill_price,
            "order status"
        );
    }

    fn on_open_order(&self, order: &OpenOrderSummary) {
        info!(
            order_id = %order.order_id,
            symbol = %order.symbol,
            security_type = %order.security_type,
            exchange = %order.exchange,
            action = %order.action,
            order_type = %order.order_type,
            quantity = order.quantity,
            "open order"
        );
    }

    fn on_execution(&self, execution: &ExecutionReport) {
        info!(
            req_id = execution.req_id,
            order_id = %execution.order_id,
            symbol = %execution.symbol,
            security_type = %execution.security_type,
            currency = %execution.currency,
            exec_id = %execution.exec_id,
            shares = execution.shares,
            price = execution.price,
            last_liquidity = execution.last_liquidity,
            "order executed"
        );
    }

    fn on_notice(&self, notice: &GatewayNotice) {
        if notice.is_informational() {
            info!(id = notice.id, code = notice.code, text = %notice.message, "gateway notice");
        } else {
            warn!(id = notice.id, code = notice.code, text = %notice.message, "gateway error");
        }
    }

    fn on_managed_accounts(&self, accounts: &[String]) {
        debug!(count = accounts.len(), "managed accounts received");
    }
}

/// Logs like [`LoggingEvents`] and keeps every event for the run report.
#[derive(Debug, Default)]
pub struct EventJournal {
    events: Mutex<Vec<GatewayEvent>>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events recorded so far, in arrival order.
    pub fn snapshot(&self) -> Vec<GatewayEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn record(&self, event: GatewayEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

impl GatewayEvents for EventJournal {
    fn on_ready(&self, next_order_id: OrderId) {
        LoggingEvents.on_ready(next_order_id);
        self.record(GatewayEvent::NextValidId {
            order_id: next_order_id,
        });
    }

    fn on_order_status(&self, status: &OrderStatusUpdate) {
        LoggingEvents.on_order_status(status);
        self.record(GatewayEvent::OrderStatus(status.clone()));
    }

    fn on_open_order(&self, order: &OpenOrderSummary) {
        LoggingEvents.on_open_order(order);
        self.record(GatewayEvent::OpenOrder(order.clone()));
    }

    fn on_execution(&self, execution: &ExecutionReport) {
        LoggingEvents.on_execution(execution);
        self.record(GatewayEvent::Execution(execution.clone()));
    }

    fn on_notice(&self, notice: &GatewayNotice) {
        LoggingEvents.on_notice(notice);
        self.record(GatewayEvent::Notice(notice.clone()));
    }

    fn on_managed_accounts(&self, accounts: &[String]) {
        LoggingEvents.on_managed_accounts(accounts);
    }
}
