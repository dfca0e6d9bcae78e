//! # Tickfire Core
//!
//! Building blocks for placing one cash-sized order through TWS / IB Gateway.
//!
//! ## Overview
//!
//! - **Domain models** for symbols, quotes, contracts, and orders
//! - **Order sizing** from a cash budget and a quoted price
//! - **Quote source trait** with a Finnhub adapter
//! - **Gateway client** speaking the TWS socket protocol
//! - **Workflow** tying quote, sizing, and submission together
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Quote provider adapters (Finnhub) |
//! | [`domain`] | Domain models (Symbol, Quote, Contract, Order) |
//! | [`error`] | Validation errors |
//! | [`gateway`] | TWS socket client and event callbacks |
//! | [`http_client`] | HTTP client abstraction |
//! | [`quote_source`] | Quote source trait and errors |
//! | [`sizing`] | Cash-to-shares conversion |
//! | [`workflow`] | One-shot order workflow |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickfire_core::{
//!     FinnhubAdapter, GatewayConfig, GatewaySession, LoggingEvents, OrderAction, OrderTemplate,
//!     OrderWorkflow, Symbol, WorkflowRequest,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session =
//!         GatewaySession::connect(&GatewayConfig::default(), Arc::new(LoggingEvents)).await?;
//!
//!     let workflow = OrderWorkflow::new(Arc::new(FinnhubAdapter::new("api-key")));
//!     let request = WorkflowRequest::stock(
//!         Symbol::parse("aapl")?,
//!         1_000,
//!         OrderTemplate::market(OrderAction::Buy),
//!     );
//!     let report = workflow.run(&mut session, &request).await?;
//!     println!("{:?}", report.outcome);
//!     Ok(())
//! }
//! ```
//!
//! ## Security
//!
//! - API keys are redacted from `Debug` output and never logged
//! - Operator input is validated into typed values before anything is sent

pub mod adapters;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod http_client;
pub mod quote_source;
pub mod sizing;
pub mod workflow;

// Adapter implementations
pub use adapters::FinnhubAdapter;

// Domain models
pub use domain::{
    build_contract, build_order, normalize, Contract, Currency, Exchange, Order, OrderAction,
    OrderId, OrderIdSequence, OrderTemplate, OrderType, Quote, SecurityType, Symbol, UtcDateTime,
};

// Error types
pub use error::ValidationError;

// Gateway client
pub use gateway::{
    EventJournal, GatewayConfig, GatewayError, GatewayEvent, GatewayEvents, GatewayNotice,
    GatewaySession, LoggingEvents, OrderGateway,
};

// HTTP client types
pub use http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Quote source trait and errors
pub use quote_source::{QuoteSource, SourceError, SourceErrorKind};

// Sizing
pub use sizing::{compute_share_count, estimated_notional, ShareCount, INVALID_PRICE_SENTINEL};

// Workflow
pub use workflow::{
    Decision, OrderPlan, OrderWorkflow, Outcome, WorkflowError, WorkflowReport, WorkflowRequest,
};
