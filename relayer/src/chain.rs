//! # In-Memory Execution Backend
//!
//! A development stand-in for a real chain connection. Tracks native-token
//! balances per address and lets tests register call handlers at specific
//! addresses, so the relay path can be exercised end to end without an RPC
//! endpoint.
//!
//! Gas accounting is deliberately crude: a flat base cost plus a per-byte
//! calldata cost. It exists so "gas too low" failures are reachable, not to
//! approximate real pricing. Value conservation is not modeled either:
//! successful calls credit `value` to the recipient without debiting anyone,
//! so balances only ever grow.

use alloy_primitives::{Address, Bytes, U256};
use parking_lot::RwLock;
use std::collections::HashMap;

use gasless_forwarder::{CallOutcome, CallTarget};

/// Flat gas charged for any call.
const BASE_CALL_GAS: u64 = 21_000;
/// Gas charged per byte of calldata.
const CALLDATA_BYTE_GAS: u64 = 16;

/// Handler invoked when a call hits a registered address. `Ok` data becomes
/// successful return data; `Err` data is treated as revert data.
type CallHandler = Box<dyn Fn(&[u8]) -> Result<Bytes, Bytes> + Send + Sync>;

/// In-memory chain state: balances and registered call handlers.
pub struct InMemoryChain {
    balances: RwLock<HashMap<Address, U256>>,
    handlers: RwLock<HashMap<Address, CallHandler>>,
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Credits `amount` to `address`, creating the account if needed.
    pub fn fund(&self, address: Address, amount: U256) {
        let mut balances = self.balances.write();
        let entry = balances.entry(address).or_insert(U256::ZERO);
        *entry = entry.saturating_add(amount);
    }

    /// Current balance of `address` (zero if never seen).
    pub fn balance_of(&self, address: Address) -> U256 {
        self.balances
            .read()
            .get(&address)
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Registers a call handler at `address`. Calls to any other address
    /// succeed with empty return data (plain value transfer semantics).
    pub fn register_handler<F>(&self, address: Address, handler: F)
    where
        F: Fn(&[u8]) -> Result<Bytes, Bytes> + Send + Sync + 'static,
    {
        self.handlers.write().insert(address, Box::new(handler));
    }

    fn gas_cost(data: &[u8]) -> u64 {
        BASE_CALL_GAS.saturating_add(CALLDATA_BYTE_GAS.saturating_mul(data.len() as u64))
    }
}

impl Default for InMemoryChain {
    fn default() -> Self {
        Self::new()
    }
}

impl CallTarget for InMemoryChain {
    fn call(&self, to: Address, value: U256, gas: u64, data: &[u8]) -> CallOutcome {
        if gas < Self::gas_cost(data) {
            return CallOutcome::failure(Bytes::from_static(b"out of gas"));
        }

        let handler_result = {
            let handlers = self.handlers.read();
            match handlers.get(&to) {
                Some(handler) => handler(data),
                None => Ok(Bytes::new()),
            }
        };

        match handler_result {
            Ok(return_data) => {
                // Value is only credited when the call itself succeeds.
                if !value.is_zero() {
                    self.fund(to, value);
                }
                CallOutcome::success(return_data)
            }
            Err(revert_data) => CallOutcome::failure(revert_data),
        }
    }
}
