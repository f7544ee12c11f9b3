//! Polyarb - Main Entry Point
//!
//! Wires the REST market-data provider, the arbitrage strategy, and the
//! submission controller into a fixed-interval scan loop.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use polyarb::common::traits::{GasBalance, NoExposure, RiskManager, RiskVerdict};
use polyarb::common::types::Opportunity;
use polyarb::config::load_config;
use polyarb::engine::TradingEngine;
use polyarb::exchange::ClobRestClient;
use polyarb::execution::OrderSubmissionController;
use polyarb::strategy::IntraMarketArbStrategy;

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "polyarb.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Scan and log opportunities without submitting orders
    #[arg(long)]
    dry_run: bool,

    /// Override the configured delay between scan cycles, in milliseconds
    #[arg(long)]
    scan_interval_ms: Option<u64>,

    /// Run a single scan cycle and exit
    #[arg(long)]
    once: bool,
}

/// Permissive risk manager used until a real one is wired in
///
/// Allows everything and reports gas as available; the engine still drives
/// the full lifecycle hook sequence through it.
struct PassThroughRisk;

#[async_trait]
impl RiskManager for PassThroughRisk {
    fn can_execute(&self, _opportunity: &Opportunity) -> RiskVerdict {
        RiskVerdict::allow()
    }

    async fn ensure_gas_balance(&self) -> polyarb::Result<GasBalance> {
        Ok(GasBalance {
            ok: true,
            balance: f64::MAX,
        })
    }

    fn on_trade_submitted(&self, _opportunity: &Opportunity) {}
    fn on_trade_success(&self, _opportunity: &Opportunity) {}
    fn on_trade_failure(&self, _opportunity: &Opportunity) {}
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    dotenvy::dotenv().ok();
    let config = load_config(Some(&args.config))?;
    let dry_run = args.dry_run || config.settings.dry_run;

    info!(config = %args.config, dry_run, "starting polyarb");

    let client = ClobRestClient::new(&config.exchange)?;
    let strategy = IntraMarketArbStrategy::new(config.arb.clone(), Box::new(NoExposure));
    let controller = OrderSubmissionController::new(config.submission.clone());

    let mut engine = TradingEngine::new(
        Box::new(client.clone()),
        Box::new(client),
        Box::new(PassThroughRisk),
        strategy,
        controller,
        dry_run,
    );

    let scan_interval_ms = args.scan_interval_ms.unwrap_or(config.settings.scan_interval_ms);
    let mut ticker = tokio::time::interval(std::time::Duration::from_millis(scan_interval_ms));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match engine.run_cycle(Utc::now()).await {
                    Ok(summary) => {
                        if summary.opportunities > 0 {
                            info!(?summary, "scan cycle finished");
                        }
                    }
                    Err(e) => error!(error = %e, "scan cycle failed"),
                }
                if args.once {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("received shutdown signal, cleaning up...");
                break;
            }
        }
    }

    Ok(())
}
