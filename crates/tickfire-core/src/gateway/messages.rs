//! TWS message layouts for the negotiated protocol version.
//!
//! Only the messages this client exchanges are modelled. Layouts follow
//! server version [`super::wire::MAX_CLIENT_VERSION`], where `orderStatus`, `openOrder`
//! and `execDetails` no longer carry a per-message version field.

use serde::Serialize;

use super::wire::{FieldReader, FieldWriter, WireError};
use crate::{Contract, Order, OrderId};

/// Inbound message ids.
pub mod incoming {
    pub const ORDER_STATUS: i32 = 3;
    pub const ERR_MSG: i32 = 4;
    pub const OPEN_ORDER: i32 = 5;
    pub const NEXT_VALID_ID: i32 = 9;
    pub const EXECUTION_DATA: i32 = 11;
    pub const MANAGED_ACCTS: i32 = 15;
}

/// Outbound message ids.
pub mod outgoing {
    pub const PLACE_ORDER: i32 = 3;
    pub const START_API: i32 = 71;
}

const START_API_VERSION: i64 = 2;

/// Server reply to the version negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHandshake {
    pub server_version: i32,
    pub connection_time: String,
}

impl ServerHandshake {
    pub fn decode(fields: &[String]) -> Result<Self, WireError> {
        let mut reader = FieldReader::new(fields);
        Ok(Self {
            server_version: reader.next_i32()?,
            connection_time: reader.next_string()?,
        })
    }
}

/// Order progress reported by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStatusUpdate {
    pub order_id: OrderId,
    pub status: String,
    pub filled: f64,
    pub remaining: f64,
    pub avg_fill_price: f64,
    pub perm_id: i64,
    pub parent_id: i64,
    pub last_fill_price: f64,
    pub client_id: i32,
    pub why_held: String,
    pub mkt_cap_price: f64,
}

/// Leading fields of an `openOrder` message; the order-state tail is not decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenOrderSummary {
    pub order_id: OrderId,
    pub symbol: String,
    pub security_type: String,
    pub exchange: String,
    pub currency: String,
    pub action: String,
    pub quantity: f64,
    pub order_type: String,
}

/// Fill reported by `execDetails`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionReport {
    pub req_id: i32,
    pub order_id: OrderId,
    pub symbol: String,
    pub security_type: String,
    pub currency: String,
    pub exec_id: String,
    pub time: String,
    pub account: String,
    pub side: String,
    pub shares: f64,
    pub price: f64,
    pub perm_id: i64,
    pub cum_qty: f64,
    pub avg_price: f64,
    pub last_liquidity: i32,
}

/// Error or informational notice; `id` is -1 when not tied to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayNotice {
    pub id: i64,
    pub code: i32,
    pub message: String,
}

impl GatewayNotice {
    /// Farm connectivity and similar status codes that do not indicate a failure.
    pub fn is_informational(&self) -> bool {
        matches!(self.code, 2100..=2169) || self.code == 1102
    }
}

/// Decoded inbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GatewayEvent {
    NextValidId { order_id: OrderId },
    OrderStatus(OrderStatusUpdate),
    OpenOrder(OpenOrderSummary),
    Execution(ExecutionReport),
    Notice(GatewayNotice),
    ManagedAccounts { accounts: Vec<String> },
    Unhandled { message_id: i32 },
}

/// Decode one inbound message from its fields (message id first).
pub fn decode_event(fields: &[String]) -> Result<GatewayEvent, WireError> {
    let mut reader = FieldReader::new(fields);
    let message_id = reader.next_i32()?;

    let event = match message_id {
        incoming::NEXT_VALID_ID => {
            reader.skip(1)?;
            GatewayEvent::NextValidId {
                order_id: OrderId::new(reader.next_i64()?),
            }
        }
        incoming::ORDER_STATUS => GatewayEvent::OrderStatus(OrderStatusUpdate {
            order_id: OrderId::new(reader.next_i64()?),
            status: reader.next_string()?,
            filled: reader.next_f64()?,
            remaining: reader.next_f64()?,
            avg_fill_price: reader.next_f64()?,
            perm_id: reader.next_i64()?,
            parent_id: reader.next_i64()?,
            last_fill_price: reader.next_f64()?,
            client_id: reader.next_i32()?,
            why_held: reader.next_string()?,
            mkt_cap_price: reader.next_f64()?,
        }),
        incoming::OPEN_ORDER => {
            let order_id = OrderId::new(reader.next_i64()?);
            // conId
            reader.skip(1)?;
            let symbol = reader.next_string()?;
            let security_type = reader.next_string()?;
            // lastTradeDateOrContractMonth, strike, right, multiplier
            reader.skip(4)?;
            let exchange = reader.next_string()?;
            let currency = reader.next_string()?;
            // localSymbol, tradingClass
            reader.skip(2)?;
            GatewayEvent::OpenOrder(OpenOrderSummary {
                order_id,
                symbol,
                security_type,
                exchange,
                currency,
                action: reader.next_string()?,
                quantity: reader.next_f64()?,
                order_type: reader.next_string()?,
            })
        }
        incoming::EXECUTION_DATA => {
            let req_id = reader.next_i32()?;
            let order_id = OrderId::new(reader.next_i64()?);
            // conId
            reader.skip(1)?;
            let symbol = reader.next_string()?;
            let security_type = reader.next_string()?;
            // lastTradeDateOrContractMonth, strike, right, multiplier, exchange
            reader.skip(5)?;
            let currency = reader.next_string()?;
            // localSymbol, tradingClass
            reader.skip(2)?;
            let exec_id = reader.next_string()?;
            let time = reader.next_string()?;
            let account = reader.next_string()?;
            // execution exchange
            reader.skip(1)?;
            let side = reader.next_string()?;
            let shares = reader.next_f64()?;
            let price = reader.next_f64()?;
            let perm_id = reader.next_i64()?;
            // clientId, liquidation
            reader.skip(2)?;
            let cum_qty = reader.next_f64()?;
            let avg_price = reader.next_f64()?;
            // orderRef, evRule, evMultiplier, modelCode
            reader.skip(4)?;
            GatewayEvent::Execution(ExecutionReport {
                req_id,
                order_id,
                symbol,
                security_type,
                currency,
                exec_id,
                time,
                account,
                side,
                shares,
                price,
                perm_id,
                cum_qty,
                avg_price,
                last_liquidity: reader.next_i32()?,
            })
        }
        incoming::ERR_MSG => {
            reader.skip(1)?;
            GatewayEvent::Notice(GatewayNotice {
                id: reader.next_i64()?,
                code: reader.next_i32()?,
                message: reader.next_string()?,
            })
        }
        incoming::MANAGED_ACCTS => {
            reader.skip(1)?;
            let accounts = reader
                .next_str()?
                .split(',')
                .map(str::trim)
                .filter(|account| !account.is_empty())
                .map(str::to_owned)
                .collect();
            GatewayEvent::ManagedAccounts { accounts }
        }
        other => GatewayEvent::Unhandled { message_id: other },
    };

    Ok(event)
}

/// `START_API` frame announcing the client id.
pub fn encode_start_api(client_id: i32) -> Vec<u8> {
    let mut writer = FieldWriter::new();
    writer
        .push_int(i64::from(outgoing::START_API))
        .push_int(START_API_VERSION)
        .push_int(i64::from(client_id))
        // optional capabilities
        .push_str("");
    writer.into_frame()
}

/// `PLACE_ORDER` frame for a plain, non-combo order.
///
/// Every optional order attribute the gateway expects at this protocol
/// version is sent unset.
pub fn encode_place_order(order_id: OrderId, contract: &Contract, order: &Order) -> Vec<u8> {
    let mut w = FieldWriter::new();
    w.push_int(i64::from(outgoing::PLACE_ORDER))
        .push_int(order_id.value());

    // contract
    w.push_int(0) // conId
        .push_str(contract.symbol.as_str())
        .push_str(contract.security_type.as_str())
        .push_str("") // lastTradeDateOrContractMonth
        .push_f64(0.0) // strike
        .push_str("") // right
        .push_str("") // multiplier
        .push_str(contract.exchange.as_str())
        .push_str("") // primaryExchange
        .push_str(contract.currency.as_str())
        .push_empty(2) // localSymbol, tradingClass
        .push_empty(2); // secIdType, secId

    // main order fields
    w.push_str(order.action.as_str())
        .push_str(&order.quantity.to_string())
        .push_str(order.order_type.as_str())
        .push_opt_f64(order.limit_price)
        .push_opt_f64(None); // auxPrice

    // extended order fields
    w.push_empty(4) // tif, ocaGroup, account, openClose
        .push_int(0) // origin: customer
        .push_str("") // orderRef
        .push_bool(true) // transmit
        .push_int(0) // parentId
        .push_bool(false) // blockOrder
        .push_bool(false) // sweepToFill
        .push_int(0) // displaySize
        .push_int(0) // triggerMethod
        .push_bool(false) // outsideRth
        .push_bool(false) // hidden
        .push_str("") // deprecated sharesAllocation
        .push_f64(0.0) // discretionaryAmt
        .push_empty(2) // goodAfterTime, goodTillDate
        .push_empty(4) // faGroup, faMethod, faPercentage, faProfile
        .push_str("") // modelCode
        .push_int(0) // shortSaleSlot
        .push_str("") // designatedLocation
        .push_int(-1) // exemptCode
        .push_int(0) // ocaType
        .push_empty(2) // rule80A, settlingFirm
        .push_bool(false) // allOrNone
        .push_empty(2) // minQty, percentOffset
        .push_bool(false) // eTradeOnly
        .push_bool(false) // firmQuoteOnly
        .push_str("") // nbboPriceCap
        .push_int(0) // auctionStrategy
        .push_empty(5) // startingPrice, stockRefPrice, delta, stockRangeLower, stockRangeUpper
        .push_bool(false) // overridePercentageConstraints
        .push_empty(4) // volatility, volatilityType, deltaNeutralOrderType, deltaNeutralAuxPrice
        .push_bool(false) // continuousUpdate
        .push_str("") // referencePriceType
        .push_empty(2) // trailStopPrice, trailingPercent
        .push_empty(3) // scaleInitLevelSize, scaleSubsLevelSize, scalePriceIncrement
        .push_empty(3) // scaleTable, activeStartTime, activeStopTime
        .push_str("") // hedgeType
        .push_bool(false) // optOutSmartRouting
        .push_empty(2) // clearingAccount, clearingIntent
        .push_bool(false) // notHeld
        .push_bool(false) // deltaNeutralContract present
        .push_str("") // algoStrategy
        .push_str("") // algoId
        .push_bool(false) // whatIf
        .push_str("") // orderMiscOptions
        .push_bool(false) // solicited
        .push_bool(false) // randomizeSize
        .push_bool(false) // randomizePrice
        .push_int(0) // conditions count
        .push_str("") // adjustedOrderType
        .push_empty(5) // triggerPrice, lmtPriceOffset, adjustedStopPrice, adjustedStopLimitPrice, adjustedTrailingAmount
        .push_int(0) // adjustableTrailingUnit
        .push_str("") // extOperator
        .push_empty(2) // softDollarTier name, value
        .push_str("") // cashQty
        .push_empty(2) // mifid2DecisionMaker, mifid2DecisionAlgo
        .push_empty(2) // mifid2ExecutionTrader, mifid2ExecutionAlgo
        .push_bool(false) // dontUseAutoPriceForHedge
        .push_bool(false) // isOmsContainer
        .push_bool(false) // discretionaryUpToLimitPrice
        .push_str(""); // usePriceMgmtAlgo

    w.into_frame()
}
