//! # Gasless Forwarder — Core Protocol Library
//!
//! A meta-transaction forwarding protocol: a sender authorizes an action by
//! signing a structured [`ForwardRequest`](request::ForwardRequest) under an
//! EIP-712 signing domain, and a relayer submits it on the sender's behalf,
//! paying the execution cost itself. This crate is the part with actual
//! invariants — signature unforgeability and exactly-once execution — where
//! a bug is a security incident, not a UI glitch.
//!
//! ## Architecture
//!
//! The library is split into modules that mirror the protocol's concerns:
//!
//! - **config** — Protocol constants. Every magic number lives here.
//! - **domain** — The deployment-scoped signing domain. A signature for one
//!   chain/contract pair is worthless against any other.
//! - **request** — The `ForwardRequest` type, its canonical EIP-712 encoding,
//!   and strict parsing of loosely-typed wire payloads.
//! - **signature** — secp256k1 recovery. Pure, stateless, paranoid.
//! - **nonce** — Per-sender monotonic counters. The entire replay-protection
//!   story lives in one atomic check-and-increment.
//! - **executor** — Composes the above into the single `forward` operation.
//!
//! ## Design Philosophy
//!
//! 1. Verification is pure; the nonce ledger is the only shared mutable state.
//! 2. Anything that doesn't parse exactly is rejected before it can touch state.
//! 3. A consumed nonce never comes back. Not on inner-call failure, not ever.
//! 4. If it verifies signatures, it has tests. Plural.

pub mod config;
pub mod domain;
pub mod executor;
pub mod nonce;
pub mod request;
pub mod signature;

pub use domain::SigningDomain;
pub use executor::{CallOutcome, CallTarget, ForwardError, ForwardOutcome, ForwardedRecord, Forwarder};
pub use nonce::NonceLedger;
pub use request::{ForwardRequest, ForwardRequestPayload, MalformedRequest};
