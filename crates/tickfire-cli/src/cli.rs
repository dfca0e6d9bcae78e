//! CLI argument definitions for tickfire.
//!
//! One invocation places at most one order: the cash budget is converted to
//! whole shares at the latest Finnhub price and submitted to TWS / IB Gateway.
//!
//! # Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--stock` | required | Ticker symbol |
//! | `--cash-quantity` | required | Cash budget in whole currency units |
//! | `--api-key` | `$FINNHUB_API_KEY` | Finnhub API key |
//! | `--order` | `MKT` | Order type (MKT, LMT, MOC, LOC) |
//! | `--action` | `BUY` | BUY or SELL |
//! | `--host` / `--port` | `127.0.0.1:7496` | Gateway address |
//! | `--skip-zero-quantity` | `false` | Do not submit when the budget buys zero shares |
//! | `--dry-run` | `false` | Quote and size without connecting |
//!
//! # Examples
//!
//! ```bash
//! # Spend up to 1000 on AAPL at market
//! tickfire --stock aapl --cash-quantity 1000 --api-key "$KEY"
//!
//! # Limit order against a paper-trading gateway
//! tickfire --stock msft --cash-quantity 5000 --order LMT --limit-price 410.5 --port 7497
//!
//! # See what would be sent
//! tickfire --stock nvda --cash-quantity 2500 --dry-run --pretty
//! ```

use clap::Parser;

/// Place one cash-sized order through TWS / IB Gateway.
#[derive(Debug, Parser)]
#[command(
    name = "tickfire",
    author,
    version,
    about = "Place one cash-sized order through TWS / IB Gateway",
    long_about = "Looks up the latest price for a symbol on Finnhub, converts a cash budget \
into whole shares, and submits a single order to a running TWS or IB Gateway instance."
)]
pub struct Cli {
    /// Ticker symbol to trade (case-insensitive).
    #[arg(long)]
    pub stock: String,

    /// Cash budget; the order size is floor(cash / price).
    #[arg(long, alias = "cash-quintity")]
    pub cash_quantity: u64,

    /// Finnhub API key.
    #[arg(long, env = "FINNHUB_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Order type: MKT, LMT, MOC, or LOC.
    #[arg(long, default_value = "MKT")]
    pub order: String,

    /// Order action: BUY or SELL.
    #[arg(long, default_value = "BUY")]
    pub action: String,

    /// Limit price, required for LMT and LOC orders.
    #[arg(long)]
    pub limit_price: Option<f64>,

    /// Security type of the contract.
    #[arg(long, default_value = "STK")]
    pub security_type: String,

    /// Routing exchange of the contract.
    #[arg(long, default_value = "SMART")]
    pub exchange: String,

    /// Contract currency (ISO code).
    #[arg(long, default_value = "USD")]
    pub currency: String,

    /// Gateway host.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Gateway port (7496 live TWS, 7497 paper TWS).
    #[arg(long, default_value_t = 7496)]
    pub port: u16,

    /// API client id presented to the gateway.
    #[arg(long, default_value_t = 1)]
    pub client_id: i32,

    /// How long to wait for the gateway's first valid order id.
    #[arg(long, default_value_t = 5_000)]
    pub ready_timeout_ms: u64,

    /// How long to collect order callbacks after submission.
    #[arg(long, default_value_t = 500)]
    pub settle_ms: u64,

    /// Quote request timeout in milliseconds.
    #[arg(long, default_value_t = 5_000)]
    pub quote_timeout_ms: u64,

    /// Skip submission when the budget buys zero shares.
    #[arg(long, default_value_t = false)]
    pub skip_zero_quantity: bool,

    /// Quote and size the order, print the ticket, and skip the gateway.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Pretty-print the JSON ticket.
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_tws_market_buy() {
        let cli = Cli::try_parse_from([
            "tickfire",
            "--stock",
            "aapl",
            "--cash-quantity",
            "1000",
            "--api-key",
            "k",
        ])
        .expect("valid arguments");

        assert_eq!(cli.order, "MKT");
        assert_eq!(cli.action, "BUY");
        assert_eq!(cli.host, "127.0.0.1");
        assert_eq!(cli.port, 7496);
        assert_eq!(cli.client_id, 1);
        assert_eq!(cli.settle_ms, 500);
        assert!(!cli.dry_run);
        assert!(!cli.skip_zero_quantity);
    }

    #[test]
    fn accepts_misspelled_cash_flag() {
        let cli = Cli::try_parse_from([
            "tickfire",
            "--stock",
            "aapl",
            "--cash-quintity",
            "250",
            "--api-key",
            "k",
        ])
        .expect("alias accepted");
        assert_eq!(cli.cash_quantity, 250);
    }

    #[test]
    fn missing_stock_is_a_usage_error() {
        let error = Cli::try_parse_from(["tickfire", "--cash-quantity", "1", "--api-key", "k"])
            .expect_err("stock is required");
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn negative_cash_is_rejected() {
        assert!(Cli::try_parse_from([
            "tickfire",
            "--stock",
            "aapl",
            "--cash-quantity",
            "-5",
            "--api-key",
            "k",
        ])
        .is_err());
    }
}
