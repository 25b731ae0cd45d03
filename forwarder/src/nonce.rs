//! # Nonce Ledger
//!
//! Per-sender monotonically increasing counters — the *entire*
//! replay-protection mechanism. A signed request carries a specific nonce;
//! once that nonce is consumed, the stored counter has moved past it and
//! will never move backward, so no signature bearing it can ever be
//! consumed again for that sender.
//!
//! ## Concurrency
//!
//! Backed by `DashMap`, which shards the keyspace and locks per shard:
//! the check-and-increment in [`consume_if_matches`](NonceLedger::consume_if_matches)
//! holds the sender's shard lock for the whole read-compare-write, making it
//! a single atomic step relative to any other operation on the same sender,
//! while senders on other shards proceed untouched. No global lock anywhere.

use alloy_primitives::{Address, U256};
use dashmap::DashMap;

/// Maps sender addresses to their next expected nonce.
///
/// An entry springs into existence (at zero) the first time a sender is
/// referenced and persists for the life of the ledger. Counters are only
/// ever incremented, only by one, and only through
/// [`consume_if_matches`](Self::consume_if_matches).
#[derive(Debug, Default)]
pub struct NonceLedger {
    counters: DashMap<Address, u64>,
}

impl NonceLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self {
            counters: DashMap::new(),
        }
    }

    /// The sender's current (next expected) nonce. Zero for senders that
    /// have never transacted. Read-only.
    pub fn current(&self, sender: Address) -> u64 {
        self.counters.get(&sender).map(|v| *v).unwrap_or(0)
    }

    /// Atomically: if the sender's current nonce equals `expected`,
    /// increment it by one; otherwise mutate nothing and return the counter
    /// value that was observed. The observed value is read under the same
    /// shard lock as the comparison, so it is exact even when other
    /// submissions for the sender are racing this one.
    ///
    /// `expected` is a full uint256 because that is what requests carry on
    /// the wire; a value above `u64::MAX` can never equal a stored counter
    /// and is rejected without mutation like any other mismatch.
    pub fn consume_if_matches(&self, sender: Address, expected: U256) -> Result<(), u64> {
        // The entry guard holds the shard lock, so the compare and the
        // increment are one indivisible step for this sender.
        let mut current = self.counters.entry(sender).or_insert(0);
        if U256::from(*current) != expected {
            return Err(*current);
        }
        *current += 1;
        Ok(())
    }

    /// Number of senders with a ledger entry.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// `true` if no sender has ever been referenced.
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
