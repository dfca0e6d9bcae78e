//! # Domain Models
//!
//! Strongly-typed values that flow from the command line to the gateway.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Uppercased ticker |
//! | [`Quote`] | Latest price snapshot |
//! | [`Contract`] | Instrument description (symbol, type, venue, currency) |
//! | [`Order`] | Trade instruction (type, action, quantity) |
//! | [`OrderId`] | Gateway-issued order identifier |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Parsing validates operator input; assembling a [`Contract`] or an
//! [`Order`] from already-parsed parts cannot fail.

mod contract;
mod order;
mod quote;
mod symbol;
mod timestamp;

pub use contract::{build_contract, Contract, Currency, Exchange, SecurityType};
pub use order::{build_order, Order, OrderAction, OrderId, OrderIdSequence, OrderTemplate, OrderType};
pub use quote::Quote;
pub use symbol::{normalize, Symbol};
pub use timestamp::UtcDateTime;
