//! Outbound notification records. One per successful mutating call.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::address::Address;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Event {
    TriadResolved {
        caller: Address,
        a: U256,
        b: U256,
        c: U256,
        sum: U256,
        root: U256,
    },
    FluxComputed {
        caller: Address,
        magnitude: U256,
        phase: U256,
        flux: U256,
    },
    HarmonicStored {
        keeper: Address,
        slot: u64,
        old: U256,
        new: U256,
    },
    MagnitudeBoundUpdated {
        curator: Address,
        old: U256,
        new: U256,
    },
    OracleInvoked {
        oracle: Address,
        query_id: U256,
        result: U256,
    },
    PhaseLockUpdated {
        keeper: Address,
        old: U256,
        new: U256,
    },
    ResonantPointRecorded {
        keeper: Address,
        slot: u64,
        value: U256,
    },
    SuperCalcExecuted {
        caller: Address,
        operands: u64,
        result: U256,
        forwarded: U256,
    },
    TriadVerified {
        caller: Address,
        a: U256,
        b: U256,
        c: U256,
        valid: bool,
    },
    ValueForwarded {
        from: Address,
        to: Address,
        amount: U256,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TriadResolved { .. } => "TriadResolved",
            Event::FluxComputed { .. } => "FluxComputed",
            Event::HarmonicStored { .. } => "HarmonicStored",
            Event::MagnitudeBoundUpdated { .. } => "MagnitudeBoundUpdated",
            Event::OracleInvoked { .. } => "OracleInvoked",
            Event::PhaseLockUpdated { .. } => "PhaseLockUpdated",
            Event::ResonantPointRecorded { .. } => "ResonantPointRecorded",
            Event::SuperCalcExecuted { .. } => "SuperCalcExecuted",
            Event::TriadVerified { .. } => "TriadVerified",
            Event::ValueForwarded { .. } => "ValueForwarded",
        }
    }
}

/// An emitted event with its position in the log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub block_number: u64,
    pub event: Event,
}
