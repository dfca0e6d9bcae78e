use std::sync::Arc;
use std::time::Duration;

use tickfire_core::{
    Currency, EventJournal, Exchange, FinnhubAdapter, GatewayConfig, GatewaySession, OrderAction,
    OrderTemplate, OrderType, OrderWorkflow, QuoteSource, SecurityType, Symbol, WorkflowRequest,
};
use tracing::info;

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::{OrderTicket, RunId};

/// Parse operator input into a workflow request. Nothing is contacted yet.
pub fn build_request(cli: &Cli) -> Result<WorkflowRequest, CliError> {
    let order_type: OrderType = cli.order.parse()?;
    let action: OrderAction = cli.action.parse()?;
    let template = OrderTemplate::new(order_type, action, cli.limit_price)?;

    Ok(WorkflowRequest {
        symbol: Symbol::parse(&cli.stock)?,
        cash_amount: cli.cash_quantity,
        template,
        security_type: cli.security_type.parse::<SecurityType>()?,
        exchange: Exchange::parse(&cli.exchange)?,
        currency: Currency::parse(&cli.currency)?,
        skip_zero_quantity: cli.skip_zero_quantity,
        settle: Duration::from_millis(cli.settle_ms),
    })
}

pub fn gateway_config(cli: &Cli) -> GatewayConfig {
    GatewayConfig {
        host: cli.host.clone(),
        port: cli.port,
        client_id: cli.client_id,
        ready_timeout: Duration::from_millis(cli.ready_timeout_ms),
        ..GatewayConfig::default()
    }
}

pub async fn run(cli: &Cli) -> Result<OrderTicket, CliError> {
    let request = build_request(cli)?;
    let run_id = RunId::new_v4();

    let adapter = FinnhubAdapter::new(cli.api_key.clone()).with_timeout_ms(cli.quote_timeout_ms);
    let quote_source = adapter.name();
    let workflow = OrderWorkflow::new(Arc::new(adapter));

    info!(
        %run_id,
        symbol = %request.symbol,
        cash_amount = request.cash_amount,
        order_type = %request.template.order_type(),
        action = %request.template.action(),
        dry_run = cli.dry_run,
        "starting order run"
    );

    if cli.dry_run {
        let report = workflow.dry_run(&request).await?;
        return Ok(OrderTicket::new(
            run_id,
            quote_source,
            request.cash_amount,
            report,
            Vec::new(),
        ));
    }

    let journal = Arc::new(EventJournal::new());
    let mut session = GatewaySession::connect(&gateway_config(cli), journal.clone()).await?;
    let report = workflow.run(&mut session, &request).await?;

    Ok(OrderTicket::new(
        run_id,
        quote_source,
        request.cash_amount,
        report,
        journal.snapshot(),
    ))
}
