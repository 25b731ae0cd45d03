//! # Protocol Configuration & Constants
//!
//! Every magic number in the forwarder lives here. The domain name and
//! version are consensus-critical: they are mixed into every signing hash,
//! so changing them after deployment silently invalidates every signature
//! ever produced for the old values. Choose once, keep forever.

// ---------------------------------------------------------------------------
// Signing Domain Identity
// ---------------------------------------------------------------------------

/// The EIP-712 domain `name`. Signing clients must use this exact string —
/// it is hashed into the domain separator, byte for byte.
pub const FORWARDER_NAME: &str = "GaslessForwarder";

/// The EIP-712 domain `version`. Bump this only on a breaking change to the
/// request type, and accept that every outstanding signed request dies with
/// the bump.
pub const FORWARDER_VERSION: &str = "1";

// ---------------------------------------------------------------------------
// Chain Identifiers
// ---------------------------------------------------------------------------

/// Hardhat/Anvil local development chain. Reset on every restart, no promises.
pub const CHAIN_ID_LOCALNET: u64 = 31337;

/// Sepolia testnet — where deployments go to be rehearsed.
pub const CHAIN_ID_SEPOLIA: u64 = 11_155_111;

/// Ethereum mainnet. Mistakes here cost real money.
pub const CHAIN_ID_MAINNET: u64 = 1;

/// Default chain ID when none is configured. Local development is the safe
/// default: a localnet-scoped signature is unusable anywhere that matters.
pub const DEFAULT_CHAIN_ID: u64 = CHAIN_ID_LOCALNET;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// secp256k1 ECDSA with public-key recovery. The signer identity is an
/// Ethereum address derived from the recovered public key, so the request
/// never needs to carry the key itself.
pub const SIGNATURE_SCHEME: &str = "secp256k1-recoverable";

/// Recoverable signature length in bytes: 32 (r) + 32 (s) + 1 (v).
/// If yours isn't 65 bytes, it isn't a signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// EIP-712 digest length. Keccak-256 output, always 32 bytes.
pub const DIGEST_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Request Limits
// ---------------------------------------------------------------------------

/// Maximum inner-call payload size in bytes. 128 KiB comfortably holds any
/// token transfer or contract call while keeping hashing cost bounded for
/// untrusted submissions.
pub const MAX_CALL_DATA_BYTES: usize = 128 * 1024;

// ---------------------------------------------------------------------------
// Relayer Defaults
// ---------------------------------------------------------------------------

/// Default relay endpoint port. Matches the port the reference relay
/// backend listened on, so existing signing clients need no reconfiguration.
pub const DEFAULT_RELAY_PORT: u16 = 3000;

/// Default Prometheus metrics port.
pub const DEFAULT_METRICS_PORT: u16 = 3001;

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Returns a friendly name for a chain ID, mainly for logging.
/// Unknown chains get the raw number because we don't guess.
pub fn chain_name(chain_id: u64) -> String {
    match chain_id {
        CHAIN_ID_MAINNET => "mainnet".to_string(),
        CHAIN_ID_SEPOLIA => "sepolia".to_string(),
        CHAIN_ID_LOCALNET => "localnet".to_string(),
        other => format!("chain({})", other),
    }
}
