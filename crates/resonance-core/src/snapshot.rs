//! JSON snapshot of one engine instance.
//!
//! Values are `0x`-prefixed hex strings (the `primitive-types` serde form),
//! identities are `0x` + 40 hex digits. Importing re-checks every state
//! invariant, so a hand-edited file cannot smuggle in a slot past the end
//! or a bound above the ceiling.

use std::collections::BTreeMap;

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{MAX_MAGNITUDE, MAX_PHASE, MAX_SLOTS};
use crate::engine::ResonanceEngine;
use crate::error::CalcError;
use crate::events::EventRecord;
use crate::roles::Roles;
use crate::state::EngineState;

pub const CURRENT_VERSION: &str = "1";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot version {0:?}")]
    Version(String),
    #[error("snapshot violates engine invariant: {0}")]
    Invalid(#[from] CalcError),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SlotEntry {
    pub slot: u64,
    pub value: U256,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OracleEntry {
    pub query_id: U256,
    pub result: U256,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub version: String,
    pub roles: Roles,
    pub magnitude_bound: U256,
    pub current_phase: U256,
    pub harmonic_slot_count: u64,
    #[serde(default)]
    pub harmonic_slots: Vec<SlotEntry>,
    #[serde(default)]
    pub oracle_results: Vec<OracleEntry>,
    #[serde(default)]
    pub oracle_call_count: u64,
    #[serde(default)]
    pub flux_count: u64,
    #[serde(default)]
    pub forwarded_total: U256,
    #[serde(default)]
    pub next_sequence: u64,
    #[serde(default)]
    pub events: Vec<EventRecord>,
}

impl Snapshot {
    pub fn capture(engine: &ResonanceEngine) -> Self {
        let state = engine.state();
        Snapshot {
            version: CURRENT_VERSION.to_string(),
            roles: *engine.roles(),
            magnitude_bound: state.magnitude_bound,
            current_phase: state.current_phase,
            harmonic_slot_count: state.harmonic_slot_count,
            harmonic_slots: state
                .harmonic_slots
                .iter()
                .map(|(&slot, &value)| SlotEntry { slot, value })
                .collect(),
            oracle_results: state
                .oracle_results
                .iter()
                .map(|(&query_id, &result)| OracleEntry { query_id, result })
                .collect(),
            oracle_call_count: state.oracle_call_count,
            flux_count: state.flux_count,
            forwarded_total: state.forwarded_total,
            next_sequence: state.next_sequence,
            events: engine.events().to_vec(),
        }
    }

    /// Rebuild an engine, checking the invariants the entry points would
    /// otherwise have maintained.
    pub fn restore(self) -> Result<ResonanceEngine, SnapshotError> {
        if self.version != CURRENT_VERSION {
            return Err(SnapshotError::Version(self.version));
        }
        self.roles.validate()?;
        if self.magnitude_bound > MAX_MAGNITUDE {
            return Err(CalcError::MagnitudeBoundExceeded.into());
        }
        if self.current_phase > MAX_PHASE {
            return Err(CalcError::PhaseOutOfRange.into());
        }
        if self.harmonic_slot_count > MAX_SLOTS as u64 {
            return Err(CalcError::InvalidSlot.into());
        }

        let mut harmonic_slots = BTreeMap::new();
        for entry in self.harmonic_slots {
            if entry.slot >= self.harmonic_slot_count {
                return Err(CalcError::InvalidSlot.into());
            }
            harmonic_slots.insert(entry.slot, entry.value);
        }

        let mut oracle_results = BTreeMap::new();
        for entry in self.oracle_results {
            if entry.query_id.is_zero() {
                return Err(CalcError::ZeroMagnitude.into());
            }
            oracle_results.insert(entry.query_id, entry.result);
        }

        // a saturated counter would fail the next call that bumps it
        if [self.oracle_call_count, self.flux_count, self.next_sequence].contains(&u64::MAX) {
            return Err(CalcError::ArithmeticOverflow.into());
        }

        // sequences must strictly increase
        let mut expected: Option<u64> = None;
        for record in &self.events {
            if expected.is_some_and(|min| record.sequence < min) {
                return Err(CalcError::InvalidArgument.into());
            }
            let next = record
                .sequence
                .checked_add(1)
                .ok_or(CalcError::ArithmeticOverflow)?;
            expected = Some(next);
        }
        let next_sequence = expected.map_or(self.next_sequence, |n| n.max(self.next_sequence));

        let state = EngineState {
            magnitude_bound: self.magnitude_bound,
            current_phase: self.current_phase,
            harmonic_slots,
            harmonic_slot_count: self.harmonic_slot_count,
            oracle_results,
            oracle_call_count: self.oracle_call_count,
            flux_count: self.flux_count,
            forwarded_total: self.forwarded_total,
            next_sequence,
        };
        Ok(ResonanceEngine::from_parts(self.roles, state, self.events))
    }
}

/// Serialize an engine to the pretty-printed snapshot format.
pub fn export_json(engine: &ResonanceEngine) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(&Snapshot::capture(engine))?)
}

/// Parse and validate a snapshot.
pub fn import_json(json: &str) -> Result<ResonanceEngine, SnapshotError> {
    let snapshot: Snapshot = serde_json::from_str(json)?;
    snapshot.restore()
}
