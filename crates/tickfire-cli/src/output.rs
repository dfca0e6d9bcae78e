use std::fmt::{Display, Formatter};
use std::io::Write;

use serde::Serialize;
use tickfire_core::{
    Contract, GatewayEvent, Order, Outcome, ShareCount, Symbol, UtcDateTime, WorkflowReport,
};
use uuid::Uuid;

use crate::error::CliError;

/// Run identifier (UUID v4) correlating log lines with the printed ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RunId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// JSON summary printed after every completed run.
///
/// Field order is fixed to keep the output stable.
#[derive(Debug, Clone, Serialize)]
pub struct OrderTicket {
    pub run_id: RunId,
    pub generated_at: UtcDateTime,
    pub symbol: Symbol,
    pub quote_source: &'static str,
    pub quote_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_as_of: Option<UtcDateTime>,
    pub cash_amount: u64,
    pub shares: ShareCount,
    pub estimated_notional: f64,
    pub contract: Contract,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub events: Vec<GatewayEvent>,
}

impl OrderTicket {
    pub fn new(
        run_id: RunId,
        quote_source: &'static str,
        cash_amount: u64,
        report: WorkflowReport,
        events: Vec<GatewayEvent>,
    ) -> Self {
        let plan = report.plan;
        Self {
            run_id,
            generated_at: UtcDateTime::now(),
            symbol: plan.quote.symbol.clone(),
            quote_source,
            quote_price: plan.quote.price,
            quote_as_of: plan.quote.as_of,
            cash_amount,
            shares: plan.share_count,
            estimated_notional: plan.estimated_notional,
            contract: plan.contract,
            order: plan.order,
            outcome: report.outcome,
            events,
        }
    }
}

/// Print the ticket to stdout as one JSON document.
pub fn render(ticket: &OrderTicket, pretty: bool) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    render_to(&mut handle, ticket, pretty)
}

pub fn render_to<W: Write>(
    writer: &mut W,
    ticket: &OrderTicket,
    pretty: bool,
) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, ticket)?;
    } else {
        serde_json::to_writer(&mut *writer, ticket)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickfire_core::{
        build_contract, Currency, Decision, Exchange, OrderAction, OrderId, OrderPlan,
        OrderTemplate, Quote, SecurityType,
    };

    fn report(outcome: Outcome) -> WorkflowReport {
        let symbol = Symbol::parse("AAPL").expect("valid");
        let order = OrderTemplate::market(OrderAction::Buy).build(4);
        WorkflowReport {
            plan: OrderPlan {
                quote: Quote::new(symbol.clone(), 250.0).expect("valid quote"),
                share_count: ShareCount::Affordable(4),
                contract: build_contract(
                    symbol,
                    SecurityType::Stock,
                    Exchange::smart(),
                    Currency::usd(),
                ),
                order: Some(order),
                decision: Decision::Submit,
                estimated_notional: 1_000.0,
            },
            outcome,
        }
    }

    #[test]
    fn submitted_ticket_carries_order_id_and_outcome() {
        let ticket = OrderTicket::new(
            RunId::new_v4(),
            "finnhub",
            1_000,
            report(Outcome::Submitted {
                order_id: OrderId::new(17),
            }),
            Vec::new(),
        );
        let value = serde_json::to_value(&ticket).expect("serializable");

        assert_eq!(value["outcome"], "submitted");
        assert_eq!(value["order_id"], 17);
        assert_eq!(value["shares"], 4);
        assert_eq!(value["symbol"], "AAPL");
        assert_eq!(value["order"]["action"], "BUY");
        assert_eq!(value["order"]["order_type"], "MKT");
        assert_eq!(value["contract"]["exchange"], "SMART");
        assert!(value.get("quote_as_of").is_none());
    }

    #[test]
    fn dry_run_ticket_has_no_order_id() {
        let ticket = OrderTicket::new(
            RunId::new_v4(),
            "finnhub",
            1_000,
            report(Outcome::DryRun),
            Vec::new(),
        );
        let value = serde_json::to_value(&ticket).expect("serializable");
        assert_eq!(value["outcome"], "dry_run");
        assert!(value.get("order_id").is_none());
    }

    fn ticket() -> OrderTicket {
        OrderTicket::new(
            RunId::new_v4(),
            "finnhub",
            1_000,
            report(Outcome::DryRun),
            Vec::new(),
        )
    }

    #[test]
    fn compact_rendering_is_one_line() {
        let mut buffer = Vec::new();
        render_to(&mut buffer, &ticket(), false).expect("rendered");

        let text = String::from_utf8(buffer).expect("utf-8");
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["outcome"], "dry_run");
    }

    #[test]
    fn pretty_rendering_spans_lines() {
        let mut buffer = Vec::new();
        render_to(&mut buffer, &ticket(), true).expect("rendered");

        let text = String::from_utf8(buffer).expect("utf-8");
        assert!(text.lines().count() > 1);
        assert!(text.ends_with("}\n"));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn stdout_failures_are_io_errors() {
        let error = render_to(&mut ClosedPipe, &ticket(), false).expect_err("pipe is closed");
        assert!(matches!(
            error,
            CliError::Io(ref source) if source.kind() == std::io::ErrorKind::BrokenPipe
        ));
        assert_eq!(error.exit_code(), 10);
    }
}
