//! # CLI Interface
//!
//! Command-line argument structure for `gasless-relayer`, via `clap` derive.
//! Three subcommands: `run`, `domain`, and `version`.

use clap::{Parser, Subcommand};

use gasless_forwarder::config::{DEFAULT_CHAIN_ID, DEFAULT_METRICS_PORT, DEFAULT_RELAY_PORT};

/// Gasless forwarder relay endpoint.
///
/// Accepts signed forward requests over HTTP, verifies nothing itself, and
/// hands each (request, signature) pair to the forwarding executor — paying
/// the execution cost so the authorizing sender doesn't have to.
#[derive(Parser, Debug)]
#[command(
    name = "gasless-relayer",
    about = "Gasless forwarder relay endpoint",
    version,
    propagate_version = true
)]
pub struct RelayerCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the relayer binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the relay endpoint.
    Run(RunArgs),
    /// Print the deployment's signing-domain JSON for signing clients.
    Domain(DomainArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Port for the relay HTTP API.
    #[arg(long, env = "RELAYER_PORT", default_value_t = DEFAULT_RELAY_PORT)]
    pub port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "RELAYER_METRICS_PORT", default_value_t = DEFAULT_METRICS_PORT)]
    pub metrics_port: u16,

    /// EIP-155 chain ID of the deployment this relayer serves.
    #[arg(long, env = "RELAYER_CHAIN_ID", default_value_t = DEFAULT_CHAIN_ID)]
    pub chain_id: u64,

    /// Address of the deployed forwarding contract (the EIP-712
    /// verifyingContract).
    #[arg(long, env = "FORWARDER_ADDRESS")]
    pub forwarder_address: String,

    /// Hex-encoded secp256k1 private key the relayer submits with. Owned by
    /// the relayer alone; the forwarding core never sees it.
    ///
    /// If omitted, an ephemeral key is generated at startup — fine for the
    /// in-memory dev backend, useless against a real network.
    /// **Never pass this flag in production** — use the environment variable
    /// or a secrets manager.
    #[arg(long, env = "RELAYER_PRIVATE_KEY")]
    pub relayer_key: Option<String>,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "RELAYER_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

/// Arguments for the `domain` subcommand.
#[derive(Parser, Debug)]
pub struct DomainArgs {
    /// EIP-155 chain ID of the deployment.
    #[arg(long, env = "RELAYER_CHAIN_ID", default_value_t = DEFAULT_CHAIN_ID)]
    pub chain_id: u64,

    /// Address of the deployed forwarding contract.
    #[arg(long, env = "FORWARDER_ADDRESS")]
    pub forwarder_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        RelayerCli::command().debug_assert();
    }
}
