//! fxdesk CLI
//!
//! Thin transport over the recommendation engine: every subcommand maps to
//! one service call and prints the result as JSON on stdout.
//!
//! # Usage
//! ```sh
//! MODE=mock cargo run -- generate --instruments EUR_USD --risk-level low
//! cargo run -- accept 0f8fad5b-d9cb-469f-a165-70867728950e
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use fxdesk::application::system::Application;
use fxdesk::config::Config;
use fxdesk::domain::recommendation::{RecommendationRequest, RiskLevel};
use fxdesk::domain::trading::types::Direction;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Forex recommendation lifecycle and execution engine", long_about = None)]
struct Cli {
    /// Print the Prometheus counters after the command
    #[arg(long, global = true)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Gather context, draft, price and store a recommendation
    Generate {
        /// Comma-separated instruments, first one is traded
        #[arg(short, long, value_delimiter = ',', required = true)]
        instruments: Vec<String>,

        /// low, medium or high
        #[arg(long)]
        risk_level: Option<RiskLevel>,

        /// Fraction of equity to risk, e.g. 0.01
        #[arg(long)]
        risk_fraction: Option<Decimal>,

        /// intraday, short, medium, long, swing...
        #[arg(long, default_value = "")]
        time_horizon: String,

        /// Explicit unit count
        #[arg(short, long)]
        units: Option<Decimal>,

        /// Explicit stop distance in pips
        #[arg(long)]
        stop_loss_pips: Option<Decimal>,

        /// Free-form notes for the model
        #[arg(long)]
        context: Option<String>,
    },
    /// List recommendations of both forms, newest first
    List {
        #[arg(short, long, default_value = "200")]
        limit: i64,
    },
    /// Execute a pending recommendation
    Accept { id: String },
    /// Soft-delete a recommendation
    Delete { id: String },
    /// Place a market order directly
    Order {
        #[arg(short, long)]
        instrument: String,

        /// BUY or SELL
        #[arg(short, long)]
        direction: Direction,

        #[arg(short, long)]
        units: Decimal,

        #[arg(long)]
        stop_loss: Option<Decimal>,

        #[arg(long)]
        take_profit: Option<Decimal>,
    },
    /// List trades, newest first
    Trades {
        #[arg(short, long, default_value = "200")]
        limit: i64,
    },
    /// Soft-delete a trade
    DeleteTrade { id: String },
    /// Check the configured store
    Health,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays machine-readable
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    info!(
        "fxdesk {} starting (Mode={:?}, store={})",
        env!("CARGO_PKG_VERSION"),
        config.mode,
        config.persistence.database_url
    );
    let app = Application::build(config).await?;
    let service = &app.service;

    match cli.command {
        Commands::Generate {
            instruments,
            risk_level,
            risk_fraction,
            time_horizon,
            units,
            stop_loss_pips,
            context,
        } => {
            let request = RecommendationRequest {
                instruments,
                risk_level,
                risk_fraction,
                time_horizon,
                units,
                stop_loss_pips,
                context,
            };
            print_json(&service.generate(request).await?)?;
        }
        Commands::List { limit } => print_json(&service.list(limit).await?)?,
        Commands::Accept { id } => print_json(&service.accept(&id).await?)?,
        Commands::Delete { id } => {
            let entity = service.delete(&id).await?;
            print_json(&json!({ "deleted": id, "entity": entity }))?;
        }
        Commands::Order {
            instrument,
            direction,
            units,
            stop_loss,
            take_profit,
        } => {
            let trade = service
                .place_order(&instrument, direction, units, stop_loss, take_profit)
                .await?;
            print_json(&trade)?;
        }
        Commands::Trades { limit } => print_json(&service.list_trades(limit).await?)?,
        Commands::DeleteTrade { id } => {
            service.delete_trade(&id).await?;
            print_json(&json!({ "deleted": id, "entity": "trades" }))?;
        }
        Commands::Health => {
            app.persistence.health().await?;
            print_json(&json!({ "status": "ok" }))?;
        }
    }

    if cli.print_metrics {
        eprintln!("{}", service.metrics().render());
    }

    Ok(())
}
