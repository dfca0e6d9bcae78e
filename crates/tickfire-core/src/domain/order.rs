use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::validate_non_negative;
use crate::ValidationError;

/// Gateway order types supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum OrderType {
    Market,
    Limit,
    MarketOnClose,
    LimitOnClose,
}

impl OrderType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Market => "MKT",
            Self::Limit => "LMT",
            Self::MarketOnClose => "MOC",
            Self::LimitOnClose => "LOC",
        }
    }

    pub const fn requires_limit_price(self) -> bool {
        matches!(self, Self::Limit | Self::LimitOnClose)
    }
}

impl Display for OrderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MKT" => Ok(Self::Market),
            "LMT" => Ok(Self::Limit),
            "MOC" => Ok(Self::MarketOnClose),
            "LOC" => Ok(Self::LimitOnClose),
            _ => Err(ValidationError::UnknownOrderType {
                value: value.to_owned(),
            }),
        }
    }
}

impl From<OrderType> for String {
    fn from(value: OrderType) -> Self {
        value.as_str().to_owned()
    }
}

impl TryFrom<String> for OrderType {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum OrderAction {
    Buy,
    Sell,
}

impl OrderAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl Display for OrderAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderAction {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            _ => Err(ValidationError::UnknownAction {
                value: value.to_owned(),
            }),
        }
    }
}

impl From<OrderAction> for String {
    fn from(value: OrderAction) -> Self {
        value.as_str().to_owned()
    }
}

impl TryFrom<String> for OrderAction {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Trade instruction handed to the gateway once per run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub order_type: OrderType,
    pub action: OrderAction,
    pub quantity: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<f64>,
}

/// Assemble a priceless order (market-style types).
pub fn build_order(order_type: OrderType, quantity: u64, action: OrderAction) -> Order {
    Order {
        order_type,
        action,
        quantity,
        limit_price: None,
    }
}

/// Validated order shape collected from the command line before the share
/// count is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTemplate {
    order_type: OrderType,
    action: OrderAction,
    limit_price: Option<f64>,
}

impl OrderTemplate {
    pub fn new(
        order_type: OrderType,
        action: OrderAction,
        limit_price: Option<f64>,
    ) -> Result<Self, ValidationError> {
        match (order_type.requires_limit_price(), limit_price) {
            (true, None) => {
                return Err(ValidationError::MissingLimitPrice {
                    order_type: order_type.as_str(),
                })
            }
            (false, Some(_)) => {
                return Err(ValidationError::UnexpectedLimitPrice {
                    order_type: order_type.as_str(),
                })
            }
            (true, Some(price)) => {
                validate_non_negative("limit_price", price)?;
                if price == 0.0 {
                    return Err(ValidationError::NonPositiveValue {
                        field: "limit_price",
                    });
                }
            }
            (false, None) => {}
        }

        Ok(Self {
            order_type,
            action,
            limit_price,
        })
    }

    pub fn market(action: OrderAction) -> Self {
        Self {
            order_type: OrderType::Market,
            action,
            limit_price: None,
        }
    }

    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub const fn action(&self) -> OrderAction {
        self.action
    }

    pub const fn limit_price(&self) -> Option<f64> {
        self.limit_price
    }

    pub fn build(&self, quantity: u64) -> Order {
        Order {
            limit_price: self.limit_price,
            ..build_order(self.order_type, quantity, self.action)
        }
    }
}

/// Gateway-issued order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i64 {
        self.0
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out order ids starting from the gateway's first valid id.
///
/// Each id is returned exactly once.
#[derive(Debug)]
pub struct OrderIdSequence {
    next: AtomicI64,
}

impl OrderIdSequence {
    pub fn starting_at(first: OrderId) -> Self {
        Self {
            next: AtomicI64::new(first.value()),
        }
    }

    pub fn next_id(&self) -> OrderId {
        OrderId(self.next.fetch_add(1, Ordering::SeqCst))
    }

    pub fn peek(&self) -> OrderId {
        OrderId(self.next.load(Ordering::SeqCst))
    }
}
