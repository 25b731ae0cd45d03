//! # Forwarding Executor
//!
//! Orchestrates one forward call as a single logical unit of work:
//! reject malformed input, verify the signature, consume the nonce, execute
//! the inner call, record the outcome. Each step is a precondition for the
//! next, and no other operation can observe an intermediate state as a
//! final outcome.
//!
//! The one subtlety worth reading twice: an inner-call failure does **not**
//! roll back the nonce. The sender's intent was authorized and consumed;
//! only the payload failed. Rolling the nonce back would let a failing
//! request be replayed forever at the relayer's expense. The failure is
//! reported in the [`ForwardOutcome`], never swallowed.

use alloy_primitives::{Address, Bytes, U256};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::SigningDomain;
use crate::nonce::NonceLedger;
use crate::request::{ForwardRequest, MalformedRequest};
use crate::signature::verify_signer;

// ---------------------------------------------------------------------------
// Execution-environment seam
// ---------------------------------------------------------------------------

/// Result of one inner call as reported by the execution environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallOutcome {
    /// Whether the call completed without reverting or exhausting its gas.
    pub success: bool,
    /// Data returned by the call on success, or revert data on failure.
    pub return_data: Bytes,
}

impl CallOutcome {
    /// A successful call with the given return data.
    pub fn success(return_data: impl Into<Bytes>) -> Self {
        Self {
            success: true,
            return_data: return_data.into(),
        }
    }

    /// A failed call (revert or out-of-gas) with the given revert data.
    pub fn failure(return_data: impl Into<Bytes>) -> Self {
        Self {
            success: false,
            return_data: return_data.into(),
        }
    }
}

/// The execution environment the executor forwards into: an opaque,
/// possibly-failing, bounded-cost outbound call.
///
/// The executor never retries a call and never interprets the payload; it
/// only observes success/failure and the returned bytes. Implemented for
/// plain closures so tests can stub targets inline.
pub trait CallTarget {
    /// Invokes `to` with `value` attached, bounded by `gas`, passing `data`.
    fn call(&self, to: Address, value: U256, gas: u64, data: &[u8]) -> CallOutcome;
}

impl<F> CallTarget for F
where
    F: Fn(Address, U256, u64, &[u8]) -> CallOutcome + Send + Sync,
{
    fn call(&self, to: Address, value: U256, gas: u64, data: &[u8]) -> CallOutcome {
        self(to, value, gas, data)
    }
}

// ---------------------------------------------------------------------------
// Outcomes, records, errors
// ---------------------------------------------------------------------------

/// What the single `forward` operation reports back to the relay layer.
///
/// `success: false` means the *inner call* failed (reverted or ran out of
/// gas) while the forwarding itself — signature, nonce — succeeded and the
/// nonce was consumed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwardOutcome {
    /// Inner-call success flag.
    pub success: bool,
    /// Inner-call return or revert data.
    pub return_data: Bytes,
    /// The nonce this request consumed.
    pub nonce: U256,
}

/// The observable record appended for every executed forward call,
/// successful inner call or not. This is the append-only log the
/// execution environment contract asks for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardedRecord {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub gas: u64,
    pub nonce: U256,
    pub data: Bytes,
    /// Whether the inner call succeeded.
    pub success: bool,
    /// Inner-call return or revert data.
    pub return_data: Bytes,
    /// Unix timestamp in milliseconds at execution time.
    pub timestamp_ms: u64,
}

/// Why a forward call was rejected before its inner call could run.
///
/// None of these are retryable with the same (request, signature) pair:
/// resubmitting it will deterministically fail again. The fix is always a
/// freshly signed request.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ForwardError {
    /// The request failed structural validation. Checked strictly before
    /// signature and nonce, with no state mutation.
    #[error("malformed request: {0}")]
    Malformed(#[from] MalformedRequest),

    /// The signature is malformed, or recovers to an address other than the
    /// claimed sender. The two cases are deliberately indistinguishable at
    /// this level.
    #[error("invalid signature for sender {from}")]
    InvalidSignature { from: Address },

    /// The request's nonce does not equal the sender's current stored
    /// value — stale, already consumed, or skipped ahead. Only the exact
    /// next value is accepted; there is no window or gap tolerance.
    #[error("invalid nonce for sender {from}: expected {expected}, got {got}")]
    InvalidNonce {
        from: Address,
        expected: u64,
        got: U256,
    },
}

// ---------------------------------------------------------------------------
// Forwarder
// ---------------------------------------------------------------------------

/// One deployed forwarding endpoint: a fixed signing domain, a nonce ledger,
/// and an append-only record log.
///
/// Shared freely across threads; the ledger serializes per sender and the
/// record log takes a short write lock per executed call.
pub struct Forwarder {
    domain: SigningDomain,
    nonces: NonceLedger,
    records: RwLock<Vec<ForwardedRecord>>,
}

impl Forwarder {
    /// Creates a forwarder for the given deployment domain, with an empty
    /// ledger and log.
    pub fn new(domain: SigningDomain) -> Self {
        Self {
            domain,
            nonces: NonceLedger::new(),
            records: RwLock::new(Vec::new()),
        }
    }

    /// The deployment's signing domain, published verbatim to signing
    /// clients.
    pub fn domain(&self) -> &SigningDomain {
        &self.domain
    }

    /// The sender's current nonce — the value its next request must carry.
    /// The `getNonce` every signing client calls before building a request.
    pub fn nonce_of(&self, sender: Address) -> u64 {
        self.nonces.current(sender)
    }

    /// Executes one forward call. The steps, each a precondition for the
    /// next:
    ///
    /// 1. Structural validation — a gas budget wider than `u64` is
    ///    [`ForwardError::Malformed`], before anything else runs.
    /// 2. Canonical digest under this deployment's domain.
    /// 3. Signer recovery and comparison against `request.from` —
    ///    [`ForwardError::InvalidSignature`] on malformed bytes or a
    ///    wrong signer alike.
    /// 4. Atomic nonce consumption — [`ForwardError::InvalidNonce`] if
    ///    `request.nonce` is not the sender's exact next value; nothing is
    ///    mutated on failure.
    /// 5. The inner call, with the request's value/gas/data budget.
    /// 6. A [`ForwardedRecord`] is appended and a tracing event emitted —
    ///    for failed inner calls too.
    ///
    /// An inner-call failure returns `Ok` with `success: false`; the nonce
    /// stays consumed.
    pub fn forward<T: CallTarget + ?Sized>(
        &self,
        target: &T,
        request: &ForwardRequest,
        signature: &[u8],
    ) -> Result<ForwardOutcome, ForwardError> {
        // 1. Malformed input is rejected before any verification or state
        // mutation.
        let gas_limit = request.gas_limit()?;

        // 2–3. Pure verification: canonical digest, recovery, comparison.
        let digest = request.signing_hash(&self.domain);
        verify_signer(digest, signature, request.from).map_err(|e| {
            tracing::debug!(from = %request.from, reason = %e, "signature rejected");
            ForwardError::InvalidSignature { from: request.from }
        })?;

        // 4. The only state transition that gates execution. A mismatch
        // reports the counter observed under the ledger's lock, so the
        // error is accurate even under concurrent submissions.
        if let Err(expected) = self.nonces.consume_if_matches(request.from, request.nonce) {
            tracing::debug!(
                from = %request.from,
                expected,
                got = %request.nonce,
                "nonce rejected"
            );
            return Err(ForwardError::InvalidNonce {
                from: request.from,
                expected,
                got: request.nonce,
            });
        }

        // 5. The inner call. From here on the nonce is spent regardless of
        // what the target does.
        let outcome = target.call(request.to, request.value, gas_limit, &request.data);

        // 6. Record and report.
        let record = ForwardedRecord {
            from: request.from,
            to: request.to,
            value: request.value,
            gas: gas_limit,
            nonce: request.nonce,
            data: request.data.clone(),
            success: outcome.success,
            return_data: outcome.return_data.clone(),
            timestamp_ms: chrono::Utc::now().timestamp_millis() as u64,
        };

        tracing::info!(
            from = %record.from,
            to = %record.to,
            value = %record.value,
            gas = record.gas,
            nonce = %record.nonce,
            success = record.success,
            "forwarded"
        );

        self.records.write().push(record);

        Ok(ForwardOutcome {
            success: outcome.success,
            return_data: outcome.return_data,
            nonce: request.nonce,
        })
    }

    /// A snapshot of the append-only forwarded-record log, oldest first.
    pub fn records(&self) -> Vec<ForwardedRecord> {
        self.records.read().clone()
    }

    /// Number of forward calls executed (inner-call failures included).
    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }
}
