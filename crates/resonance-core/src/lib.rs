//! Resonance calculator engine.
//!
//! A catalogue of checked 256-bit arithmetic and number-theory functions
//! (digit sums, digital roots, GCD/LCM, modular exponentiation, figurate and
//! combinatorial numbers, batch reducers, fixed-point scaling, bit twiddling)
//! plus a small stateful engine that gates a handful of entry points behind
//! three fixed roles, a reentrancy lock and per-call rollback, and emits one
//! event record per successful mutation.
//!
//! Zero I/O. The host supplies caller, block height, clock and value sink.

pub mod address;
pub mod batch;
pub mod bits;
pub mod catalogue;
pub mod checked;
pub mod combinatorics;
pub mod constants;
pub mod context;
pub mod digits;
pub mod engine;
pub mod error;
pub mod events;
pub mod fixed_point;
pub mod hash;
pub mod number_theory;
pub mod roles;
pub mod snapshot;
pub mod state;
pub mod triad;

pub use address::Address;
pub use catalogue::{Arity, Output, evaluate};
pub use constants::{
    BASE, MAX_MAGNITUDE, MAX_OPERANDS, MAX_PHASE, MAX_SLOTS, SCALE, TRIAD_A, TRIAD_B, TRIAD_C,
    TRIAD_SUM,
};
pub use context::{CallContext, RecordingSink, ValueSink};
pub use engine::ResonanceEngine;
pub use error::{CalcError, CalcResult};
pub use events::{Event, EventRecord};
pub use hash::{domain_id, version_id};
pub use primitive_types::U256;
pub use roles::{Role, Roles};
pub use snapshot::{CURRENT_VERSION, Snapshot, SnapshotError, export_json, import_json};
pub use state::EngineState;
