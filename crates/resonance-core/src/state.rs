use std::collections::BTreeMap;

use primitive_types::U256;

use crate::constants::MAX_MAGNITUDE;

/// Everything a mutating call may touch. Cloned whole before each call so a
/// failure can put it back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineState {
    pub magnitude_bound: U256,
    pub current_phase: U256,
    /// Sparse; an absent slot reads as zero.
    pub harmonic_slots: BTreeMap<u64, U256>,
    /// Highest slot ever written + 1. Never decreases.
    pub harmonic_slot_count: u64,
    pub oracle_results: BTreeMap<U256, U256>,
    /// Every oracle write, repeats included.
    pub oracle_call_count: u64,
    pub flux_count: u64,
    /// Running total of value passed on to the keeper.
    pub forwarded_total: U256,
    /// Sequence number the next event will carry.
    pub next_sequence: u64,
}

impl EngineState {
    pub fn new(initial_phase: U256) -> Self {
        EngineState {
            magnitude_bound: MAX_MAGNITUDE,
            current_phase: initial_phase,
            harmonic_slots: BTreeMap::new(),
            harmonic_slot_count: 0,
            oracle_results: BTreeMap::new(),
            oracle_call_count: 0,
            flux_count: 0,
            forwarded_total: U256::zero(),
            next_sequence: 0,
        }
    }

    pub fn harmonic(&self, slot: u64) -> U256 {
        self.harmonic_slots.get(&slot).copied().unwrap_or_default()
    }

    pub fn oracle_result(&self, query_id: U256) -> U256 {
        self.oracle_results.get(&query_id).copied().unwrap_or_default()
    }
}
