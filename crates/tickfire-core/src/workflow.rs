//! # Order Workflow
//!
//! One run: quote, size, build, submit, settle, disconnect.
//!
//! ```text
//! QuoteSource ──▶ price > 0? ──▶ compute_share_count ──▶ decision
//!                    │ no                                  │
//!                    ▼                                     ├─ Submit ──▶ OrderGateway::place_order ──▶ settle
//!              InvalidQuote                                └─ Skip (insufficient funds)
//!
//! OrderGateway::disconnect runs on every path once a gateway is involved.
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::gateway::{GatewayError, OrderGateway};
use crate::quote_source::{QuoteSource, SourceError};
use crate::sizing::{compute_share_count, estimated_notional, ShareCount};
use crate::{
    build_contract, Contract, Currency, Exchange, Order, OrderId, OrderTemplate, Quote,
    SecurityType, Symbol,
};

/// Settle window used when the caller does not choose one.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(500);

/// Workflow-level failure.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("quote invalid: bad API key or unknown symbol '{symbol}'")]
    InvalidQuote { symbol: Symbol },

    #[error("quote lookup failed: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Everything one run needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct WorkflowRequest {
    pub symbol: Symbol,
    pub cash_amount: u64,
    pub template: OrderTemplate,
    pub security_type: SecurityType,
    pub exchange: Exchange,
    pub currency: Currency,
    /// Skip submission when the budget buys zero shares.
    pub skip_zero_quantity: bool,
    /// Wait after submission so gateway callbacks can arrive before disconnect.
    pub settle: Duration,
}

impl WorkflowRequest {
    /// Market order on SMART in USD with the default settle window.
    pub fn stock(symbol: Symbol, cash_amount: u64, template: OrderTemplate) -> Self {
        Self {
            symbol,
            cash_amount,
            template,
            security_type: SecurityType::Stock,
            exchange: Exchange::smart(),
            currency: Currency::usd(),
            skip_zero_quantity: false,
            settle: DEFAULT_SETTLE,
        }
    }

    fn contract(&self) -> Contract {
        build_contract(
            self.symbol.clone(),
            self.security_type,
            self.exchange.clone(),
            self.currency.clone(),
        )
    }
}

/// Whether a sized order goes to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Submit,
    InsufficientFunds,
}

/// Priced and sized order, before anything reaches the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPlan {
    pub quote: Quote,
    pub share_count: ShareCount,
    pub contract: Contract,
    /// Present only when the decision is [`Decision::Submit`].
    pub order: Option<Order>,
    pub decision: Decision,
    pub estimated_notional: f64,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Submitted { order_id: OrderId },
    InsufficientFunds,
    DryRun,
}

/// Plan plus the outcome of acting on it.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowReport {
    pub plan: OrderPlan,
    pub outcome: Outcome,
}

/// Drives one order from quote to gateway.
#[derive(Clone)]
pub struct OrderWorkflow {
    quotes: Arc<dyn QuoteSource>,
}

impl OrderWorkflow {
    pub fn new(quotes: Arc<dyn QuoteSource>) -> Self {
        Self { quotes }
    }

    /// Quote, size, and build the order without touching a gateway.
    pub async fn plan(&self, request: &WorkflowRequest) -> Result<OrderPlan, WorkflowError> {
        info!(
            symbol = %request.symbol,
            source = self.quotes.name(),
            "requesting quote"
        );
        let quote = self.quotes.quote(&request.symbol).await?;
        if !quote.is_priced() {
            warn!(symbol = %request.symbol, price = quote.price, "quote has no usable price");
            return Err(WorkflowError::InvalidQuote {
                symbol: request.symbol.clone(),
            });
        }
        info!(symbol = %request.symbol, price = quote.price, "quote received");

        let share_count = compute_share_count(request.cash_amount, quote.price);
        let contract = request.contract();

        let decision = match share_count {
            ShareCount::InvalidPrice => Decision::InsufficientFunds,
            ShareCount::Affordable(0) if request.skip_zero_quantity => Decision::InsufficientFunds,
            ShareCount::Affordable(_) => Decision::Submit,
        };

        if decision == Decision::Submit && share_count.is_zero() {
            warn!(
                symbol = %request.symbol,
                cash_amount = request.cash_amount,
                price = quote.price,
                "budget buys zero shares; submitting a zero-quantity order"
            );
        }

        let shares = share_count.shares().unwrap_or(0);
        let estimated_notional = estimated_notional(shares, quote.price);
        let order = match decision {
            Decision::Submit => {
                let order = request.template.build(shares);
                info!(
                    "going to {} {} stock of {} at total price of {} using {}",
                    order.action, shares, contract.symbol, estimated_notional, order.order_type
                );
                Some(order)
            }
            Decision::InsufficientFunds => {
                warn!(
                    symbol = %request.symbol,
                    cash_amount = request.cash_amount,
                    price = quote.price,
                    shares = share_count.as_i64(),
                    "not enough cash for one share"
                );
                None
            }
        };

        Ok(OrderPlan {
            quote,
            share_count,
            contract,
            order,
            decision,
            estimated_notional,
        })
    }

    /// Plan the order and, when affordable, submit it through `gateway`.
    ///
    /// The gateway is disconnected on every path, including quote failures.
    pub async fn run<G>(
        &self,
        gateway: &mut G,
        request: &WorkflowRequest,
    ) -> Result<WorkflowReport, WorkflowError>
    where
        G: OrderGateway + ?Sized,
    {
        let result = self.submit(gateway, request).await;
        let disconnected = gateway.disconnect().await;

        match (result, disconnected) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(report), Err(error)) => {
                warn!(%error, "gateway disconnect failed after the run completed");
                Ok(report)
            }
            (Err(error), Ok(())) => Err(error),
            (Err(error), Err(disconnect_error)) => {
                warn!(error = %disconnect_error, "gateway disconnect failed after an earlier error");
                Err(error)
            }
        }
    }

    async fn submit<G>(
        &self,
        gateway: &mut G,
        request: &WorkflowRequest,
    ) -> Result<WorkflowReport, WorkflowError>
    where
        G: OrderGateway + ?Sized,
    {
        let plan = self.plan(request).await?;
        let Some(order) = plan.order.as_ref() else {
            return Ok(WorkflowReport {
                plan,
                outcome: Outcome::InsufficientFunds,
            });
        };

        let order_id = gateway.place_order(&plan.contract, order).await?;
        if !request.settle.is_zero() {
            tokio::time::sleep(request.settle).await;
        }

        Ok(WorkflowReport {
            plan,
            outcome: Outcome::Submitted { order_id },
        })
    }

    /// Plan only; the report always carries [`Outcome::DryRun`].
    pub async fn dry_run(&self, request: &WorkflowRequest) -> Result<WorkflowReport, WorkflowError> {
        let plan = self.plan(request).await?;
        Ok(WorkflowReport {
            plan,
            outcome: Outcome::DryRun,
        })
    }
}

impl std::fmt::Debug for OrderWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderWorkflow")
            .field("quotes", &self.quotes.name())
            .finish()
    }
}
