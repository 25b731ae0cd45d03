//! # REST API
//!
//! Builds the axum router that exposes the relayer's HTTP interface.
//! All endpoints share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                | Description                              |
//! |--------|---------------------|------------------------------------------|
//! | GET    | `/health`           | Liveness probe                           |
//! | GET    | `/status`           | Relayer status summary                   |
//! | POST   | `/relay`            | Submit a signed forward request          |
//! | GET    | `/nonce/:address`   | Expected next nonce for a sender         |
//! | GET    | `/domain`           | Signing-domain parameters for clients    |
//! | GET    | `/records`          | Successfully forwarded requests          |

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use alloy_primitives::Address;
use gasless_forwarder::{
    config, ForwardError, ForwardRequestPayload, ForwardedRecord, Forwarder,
};

use crate::chain::InMemoryChain;
use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone — everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The relayer's reported version string.
    pub version: String,
    /// Verification core: signing domain, nonce ledger, executor.
    pub forwarder: Arc<Forwarder>,
    /// Execution backend the forwarder dispatches verified calls to.
    pub chain: Arc<InMemoryChain>,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
    /// Startup timestamp, for uptime reporting.
    pub started_at: chrono::DateTime<chrono::Utc>,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
///
/// The returned router is ready to be served on the configured relay port.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/relay", post(relay_handler))
        .route("/nonce/:address", get(nonce_handler))
        .route("/domain", get(domain_handler))
        .route("/records", get(records_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request / Response Types
// ---------------------------------------------------------------------------

/// Body of `POST /relay`: a forward request plus its detached signature.
#[derive(Debug, Deserialize)]
pub struct RelayBody {
    /// The typed forward request, exactly as the sender signed it.
    pub request: ForwardRequestPayload,
    /// 0x-prefixed hex encoding of the 65-byte r || s || v signature.
    pub signature: String,
}

/// Response payload for `POST /relay`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RelayResponse {
    /// Whether the forwarded inner call succeeded.
    pub success: bool,
    /// Failure classification when `success` is false.
    #[serde(rename = "errorKind", skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    /// Human-readable detail for rejected requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 0x-prefixed hex of whatever the inner call returned.
    #[serde(rename = "returnData", skip_serializing_if = "Option::is_none")]
    pub return_data: Option<String>,
    /// The nonce this request consumed (decimal string).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

/// Response payload for `GET /nonce/:address`.
#[derive(Debug, Serialize, Deserialize)]
pub struct NonceResponse {
    /// The queried sender address.
    pub address: String,
    /// The nonce the sender's next request must carry.
    pub nonce: u64,
}

/// Response payload for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Relayer software version.
    pub version: String,
    /// Human-readable chain name for the configured chain ID.
    pub chain: String,
    /// EIP-155 chain ID this relayer serves.
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    /// Address of the forwarding contract requests are verified against.
    #[serde(rename = "verifyingContract")]
    pub verifying_contract: String,
    /// Number of requests forwarded since startup.
    #[serde(rename = "forwardedCount")]
    pub forwarded_count: usize,
    /// Seconds since the relayer started.
    #[serde(rename = "uptimeSeconds")]
    pub uptime_seconds: i64,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

/// Generic error body returned by REST endpoints on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health` — returns 200 if the relayer is alive.
///
/// This is the liveness probe for orchestrators (k8s, systemd, etc.).
/// It intentionally does not exercise the forwarding path — that
/// belongs in `/status`.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `GET /status` — returns a relayer status summary.
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let domain = state.forwarder.domain();
    let resp = StatusResponse {
        version: state.version.clone(),
        chain: config::chain_name(domain.chain_id),
        chain_id: domain.chain_id,
        verifying_contract: format!("{:?}", domain.verifying_contract),
        forwarded_count: state.forwarder.record_count(),
        uptime_seconds: (chrono::Utc::now() - state.started_at).num_seconds(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    Json(resp)
}

/// `POST /relay` — verifies and executes a signed forward request.
///
/// Rejections (malformed request, bad signature, wrong nonce) return 400
/// with an `errorKind` naming the failure class; none of them consume the
/// sender's nonce. A request that passes verification but whose inner call
/// fails returns 200 with `success: false` — the nonce *was* consumed, and
/// resubmitting the same signature will be rejected as a replay.
async fn relay_handler(
    State(state): State<AppState>,
    Json(body): Json<RelayBody>,
) -> impl IntoResponse {
    let timer = std::time::Instant::now();
    state.metrics.relay_requests_total.inc();

    let result = relay_inner(&state, &body);
    state
        .metrics
        .relay_latency_seconds
        .observe(timer.elapsed().as_secs_f64());

    match result {
        Ok(outcome) => {
            state.metrics.relay_accepted_total.inc();
            if outcome.success {
                Json(RelayResponse {
                    success: true,
                    error_kind: None,
                    error: None,
                    return_data: Some(format!("0x{}", hex::encode(&outcome.return_data))),
                    nonce: Some(outcome.nonce.to_string()),
                })
                .into_response()
            } else {
                state.metrics.inner_call_failures_total.inc();
                Json(RelayResponse {
                    success: false,
                    error_kind: Some("InnerCallFailed".into()),
                    error: None,
                    return_data: Some(format!("0x{}", hex::encode(&outcome.return_data))),
                    nonce: Some(outcome.nonce.to_string()),
                })
                .into_response()
            }
        }
        Err(err) => {
            let (kind, label) = match &err {
                ForwardError::Malformed(_) => ("Malformed", "malformed"),
                ForwardError::InvalidSignature { .. } => ("InvalidSignature", "invalid_signature"),
                ForwardError::InvalidNonce { .. } => ("InvalidNonce", "invalid_nonce"),
            };
            state
                .metrics
                .relay_rejected_total
                .with_label_values(&[label])
                .inc();
            tracing::debug!(kind, error = %err, "relay request rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(RelayResponse {
                    success: false,
                    error_kind: Some(kind.into()),
                    error: Some(err.to_string()),
                    return_data: None,
                    nonce: None,
                }),
            )
                .into_response()
        }
    }
}

/// Decodes the wire payload and runs the forwarding pipeline.
fn relay_inner(
    state: &AppState,
    body: &RelayBody,
) -> Result<gasless_forwarder::ForwardOutcome, ForwardError> {
    let request = body.request.parse()?;
    let signature = gasless_forwarder::request::decode_signature(&body.signature)?;
    state
        .forwarder
        .forward(state.chain.as_ref(), &request, &signature)
}

/// `GET /nonce/:address` — the nonce the sender's next request must carry.
///
/// Addresses that have never forwarded anything report nonce 0.
async fn nonce_handler(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    match Address::from_str(&address) {
        Ok(sender) => Json(NonceResponse {
            address: format!("{:?}", sender),
            nonce: state.forwarder.nonce_of(sender),
        })
        .into_response(),
        Err(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("invalid address: {}", address),
            }),
        )
            .into_response(),
    }
}

/// `GET /domain` — the signing-domain parameters clients must bind their
/// signatures to. Serves the same JSON shape wallets expect for the
/// `domain` field of typed-data signing.
async fn domain_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.forwarder.domain().clone())
}

/// `GET /records` — every request this relayer has forwarded, in order.
async fn records_handler(State(state): State<AppState>) -> impl IntoResponse {
    let records: Vec<ForwardedRecord> = state.forwarder.records();
    Json(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
