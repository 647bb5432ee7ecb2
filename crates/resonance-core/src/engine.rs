//! The stateful engine: role gates, the reentrancy lock, per-call rollback
//! and event emission wrapped around the pure catalogue.

use primitive_types::U256;

use crate::address::Address;
use crate::checked::{safe_add, small};
use crate::constants::{MAX_MAGNITUDE, MAX_OPERANDS, MAX_PHASE, MAX_SLOTS, TRIAD_SUM};
use crate::context::{CallContext, ValueSink};
use crate::digits::is_triad_resonant;
use crate::error::{CalcError, CalcResult};
use crate::events::{Event, EventRecord};
use crate::roles::{Role, Roles};
use crate::state::EngineState;
use crate::triad::{flux_value, resolve_triad_value, super_calc_value, verify_triad};

/// One engine instance. The host serializes calls against it; the only
/// concurrency primitive it owns is the reentrancy lock.
#[derive(Debug)]
pub struct ResonanceEngine {
    roles: Roles,
    state: EngineState,
    events: Vec<EventRecord>,
    locked: bool,
}

impl ResonanceEngine {
    /// Fixes the roles and seeds the phase from the deployment clock modulo
    /// the triad sum.
    pub fn new(
        curator: Address,
        oracle: Address,
        keeper: Address,
        deploy_timestamp: u64,
    ) -> CalcResult<Self> {
        let roles = Roles::new(curator, oracle, keeper)?;
        let phase = U256::from(deploy_timestamp) % TRIAD_SUM;
        Ok(Self::from_parts(roles, EngineState::new(phase), Vec::new()))
    }

    pub(crate) fn from_parts(roles: Roles, state: EngineState, events: Vec<EventRecord>) -> Self {
        ResonanceEngine {
            roles,
            state,
            events,
            locked: false,
        }
    }

    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn magnitude_bound(&self) -> U256 {
        self.state.magnitude_bound
    }

    pub fn current_phase(&self) -> U256 {
        self.state.current_phase
    }

    pub fn harmonic_slot_count(&self) -> u64 {
        self.state.harmonic_slot_count
    }

    pub fn oracle_call_count(&self) -> u64 {
        self.state.oracle_call_count
    }

    pub fn flux_count(&self) -> u64 {
        self.state.flux_count
    }

    pub fn forwarded_total(&self) -> U256 {
        self.state.forwarded_total
    }

    /// Events emitted since this instance was built or loaded.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    // --- call plumbing ---

    fn emit(&mut self, ctx: &CallContext, event: Event) -> CalcResult<()> {
        let sequence = self.state.next_sequence;
        self.state.next_sequence = bump(sequence)?;
        self.events.push(EventRecord {
            sequence,
            block_number: ctx.block_number,
            event,
        });
        Ok(())
    }

    /// All-or-nothing: on error the state and the event log go back to
    /// where they were before `body` ran.
    fn atomic<T>(&mut self, body: impl FnOnce(&mut Self) -> CalcResult<T>) -> CalcResult<T> {
        let saved_state = self.state.clone();
        let saved_events = self.events.len();
        let result = body(self);
        if let Err(err) = &result {
            tracing::debug!(%err, "call rejected, rolling back");
            self.state = saved_state;
            self.events.truncate(saved_events);
        }
        result
    }

    /// Holds the reentrancy lock for the duration of `body`. The lock is
    /// released whether `body` succeeds or fails.
    fn guarded<T>(&mut self, body: impl FnOnce(&mut Self) -> CalcResult<T>) -> CalcResult<T> {
        if self.locked {
            tracing::debug!("reentrant call refused");
            return Err(CalcError::ReentrantCall);
        }
        self.locked = true;
        let result = body(self);
        self.locked = false;
        result
    }

    fn require(&self, role: Role, caller: Address) -> CalcResult<()> {
        self.roles.require(role, caller).inspect_err(|_| {
            tracing::debug!(role = role.as_str(), %caller, "role check failed");
        })
    }

    /// `1 ≤ value ≤ magnitude_bound`.
    fn check_bounded(&self, value: U256) -> CalcResult<()> {
        if value.is_zero() {
            return Err(CalcError::ZeroMagnitude);
        }
        self.check_within_bound(value)
    }

    fn check_within_bound(&self, value: U256) -> CalcResult<()> {
        if value > self.state.magnitude_bound {
            return Err(CalcError::MagnitudeBoundExceeded);
        }
        Ok(())
    }

    fn slot_index(slot: U256) -> CalcResult<u64> {
        small(slot, (MAX_SLOTS - 1) as u64, CalcError::InvalidSlot)
    }

    // --- entry points ---

    /// Validates a bounded triad summing to a multiple of 3 and returns its
    /// sum with the sum's digital root.
    pub fn resolve_triad(
        &mut self,
        ctx: &CallContext,
        a: U256,
        b: U256,
        c: U256,
    ) -> CalcResult<(U256, U256)> {
        self.atomic(|e| {
            e.check_bounded(a)?;
            e.check_bounded(b)?;
            e.check_bounded(c)?;
            if !verify_triad(a, b, c) {
                return Err(CalcError::InvalidTriad);
            }
            let (sum, root) = resolve_triad_value(a, b, c)?;
            e.emit(
                ctx,
                Event::TriadResolved {
                    caller: ctx.caller,
                    a,
                    b,
                    c,
                    sum,
                    root,
                },
            )?;
            Ok((sum, root))
        })
    }

    /// `magnitude · (phase + BASE)` folded into `[0, MAX_MAGNITUDE)`.
    pub fn compute_flux(
        &mut self,
        ctx: &CallContext,
        magnitude: U256,
        phase: U256,
    ) -> CalcResult<U256> {
        self.atomic(|e| {
            e.guarded(|e| {
                e.check_bounded(magnitude)?;
                if phase > MAX_PHASE {
                    return Err(CalcError::PhaseOutOfRange);
                }
                let flux = flux_value(magnitude, phase)?;
                e.state.flux_count = bump(e.state.flux_count)?;
                e.emit(
                    ctx,
                    Event::FluxComputed {
                        caller: ctx.caller,
                        magnitude,
                        phase,
                        flux,
                    },
                )?;
                Ok(flux)
            })
        })
    }

    pub fn store_harmonic(&mut self, ctx: &CallContext, slot: U256, value: U256) -> CalcResult<()> {
        self.atomic(|e| {
            e.require(Role::Keeper, ctx.caller)?;
            e.guarded(|e| {
                let slot = Self::slot_index(slot)?;
                e.check_within_bound(value)?;
                let old = e.state.harmonic(slot);
                e.state.harmonic_slots.insert(slot, value);
                e.state.harmonic_slot_count = e.state.harmonic_slot_count.max(slot + 1);
                e.emit(
                    ctx,
                    Event::HarmonicStored {
                        keeper: ctx.caller,
                        slot,
                        old,
                        new: value,
                    },
                )?;
                Ok(())
            })
        })
    }

    pub fn set_magnitude_bound(&mut self, ctx: &CallContext, bound: U256) -> CalcResult<()> {
        self.atomic(|e| {
            e.require(Role::Curator, ctx.caller)?;
            if bound > MAX_MAGNITUDE {
                return Err(CalcError::MagnitudeBoundExceeded);
            }
            let old = e.state.magnitude_bound;
            e.state.magnitude_bound = bound;
            e.emit(
                ctx,
                Event::MagnitudeBoundUpdated {
                    curator: ctx.caller,
                    old,
                    new: bound,
                },
            )?;
            Ok(())
        })
    }

    /// Records (or overwrites) the result for `query_id`.
    pub fn invoke_oracle(
        &mut self,
        ctx: &CallContext,
        query_id: U256,
        result: U256,
    ) -> CalcResult<()> {
        self.atomic(|e| {
            e.require(Role::Oracle, ctx.caller)?;
            e.guarded(|e| {
                if query_id.is_zero() {
                    return Err(CalcError::ZeroMagnitude);
                }
                e.state.oracle_results.insert(query_id, result);
                e.state.oracle_call_count = bump(e.state.oracle_call_count)?;
                e.emit(
                    ctx,
                    Event::OracleInvoked {
                        oracle: ctx.caller,
                        query_id,
                        result,
                    },
                )?;
                Ok(())
            })
        })
    }

    pub fn update_phase_lock(&mut self, ctx: &CallContext, phase: U256) -> CalcResult<()> {
        self.atomic(|e| {
            e.require(Role::Keeper, ctx.caller)?;
            if phase > MAX_PHASE {
                return Err(CalcError::PhaseOutOfRange);
            }
            let old = e.state.current_phase;
            e.state.current_phase = phase;
            e.emit(
                ctx,
                Event::PhaseLockUpdated {
                    keeper: ctx.caller,
                    old,
                    new: phase,
                },
            )?;
            Ok(())
        })
    }

    /// Appends a resonant value at the high-water mark and returns the slot
    /// it landed in.
    pub fn record_resonant_point(&mut self, ctx: &CallContext, value: U256) -> CalcResult<u64> {
        self.atomic(|e| {
            e.require(Role::Keeper, ctx.caller)?;
            e.guarded(|e| {
                e.check_bounded(value)?;
                if !is_triad_resonant(value) {
                    return Err(CalcError::InvalidTriad);
                }
                let slot = e.state.harmonic_slot_count;
                if slot >= MAX_SLOTS as u64 {
                    return Err(CalcError::InvalidSlot);
                }
                e.state.harmonic_slots.insert(slot, value);
                e.state.harmonic_slot_count = slot + 1;
                e.emit(
                    ctx,
                    Event::ResonantPointRecorded {
                        keeper: ctx.caller,
                        slot,
                        value,
                    },
                )?;
                Ok(slot)
            })
        })
    }

    /// Runs the super calculation and passes any attached value to the
    /// keeper before the lock is released.
    pub fn execute_super_calc(
        &mut self,
        ctx: &CallContext,
        values: &[U256],
        sink: &mut dyn ValueSink,
    ) -> CalcResult<U256> {
        self.atomic(|e| {
            e.guarded(|e| {
                if values.is_empty() {
                    return Err(CalcError::EmptyOperands);
                }
                if values.len() > MAX_OPERANDS {
                    return Err(CalcError::ArrayLengthMismatch);
                }
                for &v in values {
                    e.check_within_bound(v)?;
                }
                let result = super_calc_value(values)?;
                if !ctx.value.is_zero() {
                    e.state.forwarded_total = safe_add(e.state.forwarded_total, ctx.value)?;
                }
                e.emit(
                    ctx,
                    Event::SuperCalcExecuted {
                        caller: ctx.caller,
                        operands: values.len() as u64,
                        result,
                        forwarded: ctx.value,
                    },
                )?;
                if !ctx.value.is_zero() {
                    let keeper = e.roles.keeper();
                    sink.transfer(e, keeper, ctx.value)?;
                }
                Ok(result)
            })
        })
    }

    /// An invalid triad is not an error: the record carries the verdict
    /// either way. Fails only once the event sequence is exhausted.
    pub fn verify_and_emit_triad(
        &mut self,
        ctx: &CallContext,
        a: U256,
        b: U256,
        c: U256,
    ) -> CalcResult<bool> {
        let valid = verify_triad(a, b, c);
        self.emit(
            ctx,
            Event::TriadVerified {
                caller: ctx.caller,
                a,
                b,
                c,
                valid,
            },
        )?;
        Ok(valid)
    }

    /// Incoming value with no matching call: book it under the lock, then
    /// release the lock and pass the full amount to the keeper. A failed
    /// transfer undoes the bookkeeping.
    pub fn receive_value(&mut self, ctx: &CallContext, sink: &mut dyn ValueSink) -> CalcResult<()> {
        if ctx.value.is_zero() {
            return Ok(());
        }
        self.atomic(|e| {
            let keeper = e.roles.keeper();
            e.guarded(|e| {
                e.state.forwarded_total = safe_add(e.state.forwarded_total, ctx.value)?;
                e.emit(
                    ctx,
                    Event::ValueForwarded {
                        from: ctx.caller,
                        to: keeper,
                        amount: ctx.value,
                    },
                )?;
                Ok(())
            })?;
            sink.transfer(e, keeper, ctx.value)
        })
    }

    // --- read accessors ---

    /// An unset slot reads as zero.
    pub fn get_harmonic(&self, slot: U256) -> CalcResult<U256> {
        Ok(self.state.harmonic(Self::slot_index(slot)?))
    }

    /// An unknown id reads as zero.
    pub fn get_last_oracle_result(&self, query_id: U256) -> CalcResult<U256> {
        if query_id.is_zero() {
            return Err(CalcError::ZeroMagnitude);
        }
        Ok(self.state.oracle_result(query_id))
    }
}

/// Next value of a monotonic counter.
fn bump(counter: u64) -> CalcResult<u64> {
    counter.checked_add(1).ok_or(CalcError::ArithmeticOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RecordingSink;

    const CURATOR: u64 = 1;
    const ORACLE: u64 = 2;
    const KEEPER: u64 = 3;
    const STRANGER: u64 = 99;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    fn engine() -> ResonanceEngine {
        ResonanceEngine::new(
            Address::from_low_u64(CURATOR),
            Address::from_low_u64(ORACLE),
            Address::from_low_u64(KEEPER),
            1_700_000_000,
        )
        .unwrap()
    }

    fn ctx(who: u64) -> CallContext {
        CallContext::new(Address::from_low_u64(who), 10, 1_700_000_100)
    }

    #[test]
    fn test_construction() {
        let e = engine();
        assert_eq!(e.magnitude_bound(), MAX_MAGNITUDE);
        // 1_700_000_000 mod 18 == 8
        assert_eq!(e.current_phase(), u(8));
        assert_eq!(e.harmonic_slot_count(), 0);
        assert!(!e.is_locked());
        assert!(e.events().is_empty());
    }

    #[test]
    fn test_construction_rejects_zero_role() {
        let a = Address::from_low_u64(1);
        assert_eq!(
            ResonanceEngine::new(a, Address::ZERO, a, 0).unwrap_err(),
            CalcError::ZeroAddress
        );
    }

    #[test]
    fn test_resolve_triad() {
        let mut e = engine();
        assert_eq!(e.resolve_triad(&ctx(STRANGER), u(3), u(6), u(9)), Ok((u(18), u(9))));
        assert_eq!(
            e.resolve_triad(&ctx(STRANGER), u(1), u(1), u(2)),
            Err(CalcError::InvalidTriad)
        );
        assert_eq!(
            e.resolve_triad(&ctx(STRANGER), u(0), u(3), u(3)),
            Err(CalcError::ZeroMagnitude)
        );
        assert_eq!(e.events().len(), 1);
    }

    #[test]
    fn test_compute_flux() {
        let mut e = engine();
        assert_eq!(e.compute_flux(&ctx(STRANGER), u(2), u(1)), Ok(u(740)));
        assert_eq!(e.flux_count(), 1);
        assert_eq!(
            e.compute_flux(&ctx(STRANGER), u(2), MAX_PHASE + u(1)),
            Err(CalcError::PhaseOutOfRange)
        );
        assert_eq!(e.flux_count(), 1);
        assert!(!e.is_locked());
    }

    #[test]
    fn test_store_harmonic_high_water_mark() {
        let mut e = engine();
        e.store_harmonic(&ctx(KEEPER), u(5), u(42)).unwrap();
        assert_eq!(e.get_harmonic(u(5)), Ok(u(42)));
        assert_eq!(e.harmonic_slot_count(), 6);
        e.store_harmonic(&ctx(KEEPER), u(2), u(7)).unwrap();
        assert_eq!(e.harmonic_slot_count(), 6);
        assert_eq!(e.get_harmonic(u(3)), Ok(u(0)));
    }

    #[test]
    fn test_store_harmonic_rejections_leave_state() {
        let mut e = engine();
        assert_eq!(
            e.store_harmonic(&ctx(STRANGER), u(5), u(42)),
            Err(CalcError::NotKeeper)
        );
        assert_eq!(
            e.store_harmonic(&ctx(KEEPER), u(MAX_SLOTS as u64), u(1)),
            Err(CalcError::InvalidSlot)
        );
        assert_eq!(e.harmonic_slot_count(), 0);
        assert_eq!(e.get_harmonic(u(5)), Ok(u(0)));
        assert!(e.events().is_empty());
    }

    #[test]
    fn test_bound_applies_to_harmonics() {
        let mut e = engine();
        e.set_magnitude_bound(&ctx(CURATOR), u(100)).unwrap();
        assert_eq!(
            e.store_harmonic(&ctx(KEEPER), u(0), u(101)),
            Err(CalcError::MagnitudeBoundExceeded)
        );
        assert!(e.store_harmonic(&ctx(KEEPER), u(0), u(100)).is_ok());
    }

    #[test]
    fn test_set_magnitude_bound() {
        let mut e = engine();
        assert_eq!(e.set_magnitude_bound(&ctx(KEEPER), u(5)), Err(CalcError::NotCurator));
        assert_eq!(
            e.set_magnitude_bound(&ctx(CURATOR), MAX_MAGNITUDE + u(1)),
            Err(CalcError::MagnitudeBoundExceeded)
        );
        e.set_magnitude_bound(&ctx(CURATOR), u(500)).unwrap();
        assert_eq!(
            e.events()[0].event,
            Event::MagnitudeBoundUpdated {
                curator: Address::from_low_u64(CURATOR),
                old: MAX_MAGNITUDE,
                new: u(500),
            }
        );
    }

    #[test]
    fn test_oracle() {
        let mut e = engine();
        e.invoke_oracle(&ctx(ORACLE), u(7), u(369)).unwrap();
        e.invoke_oracle(&ctx(ORACLE), u(7), u(963)).unwrap();
        assert_eq!(e.get_last_oracle_result(u(7)), Ok(u(963)));
        assert_eq!(e.get_last_oracle_result(u(8)), Ok(u(0)));
        assert_eq!(e.get_last_oracle_result(u(0)), Err(CalcError::ZeroMagnitude));
        assert_eq!(e.oracle_call_count(), 2);
        assert_eq!(
            e.invoke_oracle(&ctx(ORACLE), u(0), u(1)),
            Err(CalcError::ZeroMagnitude)
        );
        assert_eq!(e.invoke_oracle(&ctx(KEEPER), u(1), u(1)), Err(CalcError::NotOracle));
        assert_eq!(e.oracle_call_count(), 2);
    }

    #[test]
    fn test_phase_lock() {
        let mut e = engine();
        e.update_phase_lock(&ctx(KEEPER), MAX_PHASE).unwrap();
        assert_eq!(e.current_phase(), MAX_PHASE);
        assert_eq!(
            e.update_phase_lock(&ctx(KEEPER), MAX_PHASE + u(1)),
            Err(CalcError::PhaseOutOfRange)
        );
        assert_eq!(e.update_phase_lock(&ctx(CURATOR), u(1)), Err(CalcError::NotKeeper));
    }

    #[test]
    fn test_record_resonant_point_appends() {
        let mut e = engine();
        assert_eq!(e.record_resonant_point(&ctx(KEEPER), u(369)), Ok(0));
        e.store_harmonic(&ctx(KEEPER), u(9), u(1)).unwrap();
        assert_eq!(e.record_resonant_point(&ctx(KEEPER), u(12)), Ok(10));
        assert_eq!(e.harmonic_slot_count(), 11);
        assert_eq!(
            e.record_resonant_point(&ctx(KEEPER), u(10)),
            Err(CalcError::InvalidTriad)
        );
    }

    #[test]
    fn test_record_resonant_point_when_full() {
        let mut e = engine();
        e.store_harmonic(&ctx(KEEPER), u(MAX_SLOTS as u64 - 1), u(1)).unwrap();
        assert_eq!(
            e.record_resonant_point(&ctx(KEEPER), u(3)),
            Err(CalcError::InvalidSlot)
        );
    }

    #[test]
    fn test_super_calc() {
        let mut e = engine();
        let mut sink = RecordingSink::new();
        let values = [u(3), u(6), u(9)];
        assert_eq!(e.execute_super_calc(&ctx(STRANGER), &values, &mut sink), Ok(u(59_778)));
        assert!(sink.transfers.is_empty());
        assert_eq!(
            e.execute_super_calc(&ctx(STRANGER), &[], &mut sink),
            Err(CalcError::EmptyOperands)
        );
        let too_many = vec![u(1); MAX_OPERANDS + 1];
        assert_eq!(
            e.execute_super_calc(&ctx(STRANGER), &too_many, &mut sink),
            Err(CalcError::ArrayLengthMismatch)
        );
    }

    #[test]
    fn test_super_calc_forwards_attached_value() {
        let mut e = engine();
        let mut sink = RecordingSink::new();
        let call = ctx(STRANGER).with_value(u(50));
        e.execute_super_calc(&call, &[u(1)], &mut sink).unwrap();
        assert_eq!(sink.transfers, vec![(Address::from_low_u64(KEEPER), u(50))]);
        assert_eq!(e.forwarded_total(), u(50));
        assert_eq!(e.events().len(), 1);
    }

    #[test]
    fn test_verify_and_emit_triad_records_either_verdict() {
        let mut e = engine();
        assert_eq!(e.verify_and_emit_triad(&ctx(STRANGER), u(1), u(1), u(1)), Ok(true));
        assert_eq!(e.verify_and_emit_triad(&ctx(STRANGER), u(1), u(1), u(2)), Ok(false));
        assert_eq!(e.events().len(), 2);
    }

    #[test]
    fn test_receive_value() {
        let mut e = engine();
        let mut sink = RecordingSink::new();
        e.receive_value(&ctx(STRANGER).with_value(u(9)), &mut sink).unwrap();
        e.receive_value(&ctx(STRANGER), &mut sink).unwrap();
        assert_eq!(sink.total(), u(9));
        assert_eq!(e.forwarded_total(), u(9));
        assert_eq!(e.events().len(), 1);
    }

    #[test]
    fn test_event_sequence_is_monotonic() {
        let mut e = engine();
        e.verify_and_emit_triad(&ctx(STRANGER), u(1), u(1), u(1)).unwrap();
        let _ = e.set_magnitude_bound(&ctx(STRANGER), u(1));
        e.set_magnitude_bound(&ctx(CURATOR), u(1)).unwrap();
        let seqs: Vec<u64> = e.events().iter().map(|r| r.sequence).collect();
        assert_eq!(seqs, vec![0, 1]);
        assert!(e.events().iter().all(|r| r.block_number == 10));
    }

    #[test]
    fn test_exhausted_counters_fail_cleanly() {
        let mut e = engine();
        e.state.flux_count = u64::MAX;
        assert_eq!(
            e.compute_flux(&ctx(STRANGER), u(1), u(0)),
            Err(CalcError::ArithmeticOverflow)
        );
        assert_eq!(e.flux_count(), u64::MAX);
        assert!(!e.is_locked());

        e.state.next_sequence = u64::MAX;
        assert_eq!(
            e.verify_and_emit_triad(&ctx(STRANGER), u(3), u(3), u(3)),
            Err(CalcError::ArithmeticOverflow)
        );
        assert_eq!(
            e.set_magnitude_bound(&ctx(CURATOR), u(5)),
            Err(CalcError::ArithmeticOverflow)
        );
        assert_eq!(e.magnitude_bound(), MAX_MAGNITUDE);
        assert!(e.events().is_empty());
    }
}
