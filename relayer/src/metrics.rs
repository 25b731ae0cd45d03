//! # Prometheus Metrics
//!
//! Exposes operational metrics for the relayer. Scraped by Prometheus at the
//! `/metrics` HTTP endpoint on the configured metrics port.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so they
//! do not collide with any default global registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the relayer.
///
/// Clone-friendly (wraps `Arc` internally via prometheus handles) so it can
/// be shared across request handlers.
#[derive(Clone)]
pub struct RelayerMetrics {
    /// Prometheus registry that owns all metrics below.
    registry: Registry,
    /// Total number of relay requests received, valid or not.
    pub relay_requests_total: IntCounter,
    /// Total number of relay requests that passed verification and were
    /// executed (inner call may still have failed).
    pub relay_accepted_total: IntCounter,
    /// Relay requests rejected before execution, labeled by rejection reason
    /// (`malformed`, `invalid_signature`, `invalid_nonce`).
    pub relay_rejected_total: IntCounterVec,
    /// Accepted requests whose inner call failed. The nonce was still
    /// consumed for these.
    pub inner_call_failures_total: IntCounter,
    /// Histogram of end-to-end relay handling latency in seconds.
    pub relay_latency_seconds: Histogram,
}

impl RelayerMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("relayer".into()), None)
            .expect("failed to create prometheus registry");

        let relay_requests_total = IntCounter::new(
            "relay_requests_total",
            "Total number of relay requests received",
        )
        .expect("metric creation");
        registry
            .register(Box::new(relay_requests_total.clone()))
            .expect("metric registration");

        let relay_accepted_total = IntCounter::new(
            "relay_accepted_total",
            "Total number of relay requests that passed verification and were executed",
        )
        .expect("metric creation");
        registry
            .register(Box::new(relay_accepted_total.clone()))
            .expect("metric registration");

        let relay_rejected_total = IntCounterVec::new(
            Opts::new(
                "relay_rejected_total",
                "Relay requests rejected before execution, by reason",
            ),
            &["reason"],
        )
        .expect("metric creation");
        registry
            .register(Box::new(relay_rejected_total.clone()))
            .expect("metric registration");

        let inner_call_failures_total = IntCounter::new(
            "inner_call_failures_total",
            "Accepted relay requests whose inner call failed",
        )
        .expect("metric creation");
        registry
            .register(Box::new(inner_call_failures_total.clone()))
            .expect("metric registration");

        let relay_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "relay_latency_seconds",
                "End-to-end relay request handling latency in seconds",
            )
            .buckets(vec![
                0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
        )
        .expect("metric creation");
        registry
            .register(Box::new(relay_latency_seconds.clone()))
            .expect("metric registration");

        Self {
            registry,
            relay_requests_total,
            relay_accepted_total,
            relay_rejected_total,
            inner_call_failures_total,
            relay_latency_seconds,
        }
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer).expect("prometheus output is valid utf-8"))
    }
}

impl Default for RelayerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared metrics state passed to axum handlers via state.
pub type SharedMetrics = Arc<RelayerMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
///
/// Returns HTTP 500 if encoding fails (should never happen in practice).
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
