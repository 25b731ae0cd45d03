//! # Gasless Relayer
//!
//! Entry point for the `gasless-relayer` binary. Parses CLI arguments,
//! initializes logging and metrics, and serves the relay HTTP API backed by
//! the in-memory execution backend.
//!
//! The binary supports three subcommands:
//!
//! - `run`     — start the relay endpoint
//! - `domain`  — print the signing-domain JSON for signing clients
//! - `version` — print build version information

mod api;
mod chain;
mod cli;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use std::str::FromStr;
use std::sync::Arc;
use tokio::signal;

use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use gasless_forwarder::{config, Forwarder, SigningDomain};

use chain::InMemoryChain;
use cli::{Commands, RelayerCli};
use logging::LogFormat;
use metrics::RelayerMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = RelayerCli::parse();

    match cli.command {
        Commands::Run(args) => run_relayer(args).await,
        Commands::Domain(args) => print_domain(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the relay endpoint: API server and metrics endpoint.
async fn run_relayer(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        "gasless_relayer=info,gasless_forwarder=info,tower_http=debug",
        LogFormat::from_str_lossy(&args.log_format),
    );

    let verifying_contract = Address::from_str(&args.forwarder_address)
        .with_context(|| format!("invalid forwarder address: {}", args.forwarder_address))?;

    let domain = SigningDomain::for_deployment(args.chain_id, verifying_contract);
    tracing::info!(
        port = args.port,
        metrics_port = args.metrics_port,
        chain = %config::chain_name(args.chain_id),
        domain = %domain,
        "starting gasless-relayer"
    );

    // --- Relayer identity ---
    // The key never reaches the forwarding core. It only matters at the
    // submission boundary, where the relayer pays for execution.
    let signer = match &args.relayer_key {
        Some(key) => key
            .parse::<PrivateKeySigner>()
            .context("invalid relayer private key")?,
        None => {
            let signer = PrivateKeySigner::random();
            tracing::warn!(
                "no relayer key configured, generated an ephemeral one for this session"
            );
            signer
        }
    };
    tracing::info!(relayer = %signer.address(), "relayer identity loaded");

    // --- Core state ---
    let forwarder = Arc::new(Forwarder::new(domain));
    let execution_backend = Arc::new(InMemoryChain::new());
    let relayer_metrics = Arc::new(RelayerMetrics::new());

    let app_state = api::AppState {
        version: env!("CARGO_PKG_VERSION").to_string(),
        forwarder,
        chain: execution_backend,
        metrics: Arc::clone(&relayer_metrics),
        started_at: chrono::Utc::now(),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind relay listener on {}", api_addr))?;
    tracing::info!("relay API listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&relayer_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("relay API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("gasless-relayer stopped");
    Ok(())
}

/// Prints the deployment's signing-domain JSON to stdout.
///
/// Signing clients paste this straight into the `domain` field of their
/// typed-data signing request.
fn print_domain(args: cli::DomainArgs) -> Result<()> {
    let verifying_contract = Address::from_str(&args.forwarder_address)
        .with_context(|| format!("invalid forwarder address: {}", args.forwarder_address))?;

    let domain = SigningDomain::for_deployment(args.chain_id, verifying_contract);
    println!("{}", serde_json::to_string_pretty(&domain)?);
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("gasless-relayer {}", env!("CARGO_PKG_VERSION"));
    println!(
        "domain          {} v{}",
        config::FORWARDER_NAME,
        config::FORWARDER_VERSION
    );
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
