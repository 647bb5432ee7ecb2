//! What the host hands the engine on every call, and where forwarded value
//! goes.

use primitive_types::U256;

use crate::address::Address;
use crate::engine::ResonanceEngine;
use crate::error::CalcResult;

/// Per-call environment supplied by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    pub block_number: u64,
    pub timestamp: u64,
    /// Value attached to the call.
    pub value: U256,
}

impl CallContext {
    pub fn new(caller: Address, block_number: u64, timestamp: u64) -> Self {
        CallContext {
            caller,
            block_number,
            timestamp,
            value: U256::zero(),
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Destination for value the engine forwards to the keeper.
///
/// The sink receives the engine itself, so a transfer can call back in.
/// Returning an error aborts the forwarding call and rolls it back.
pub trait ValueSink {
    fn transfer(
        &mut self,
        engine: &mut ResonanceEngine,
        to: Address,
        amount: U256,
    ) -> CalcResult<()>;
}

/// Accepts every transfer and remembers it.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub transfers: Vec<(Address, U256)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> U256 {
        self.transfers
            .iter()
            .fold(U256::zero(), |acc, (_, amount)| acc.saturating_add(*amount))
    }
}

impl ValueSink for RecordingSink {
    fn transfer(
        &mut self,
        _engine: &mut ResonanceEngine,
        to: Address,
        amount: U256,
    ) -> CalcResult<()> {
        self.transfers.push((to, amount));
        Ok(())
    }
}
