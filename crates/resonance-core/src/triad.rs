//! The 3-6-9 helpers and the pure cores of the flux and super-calc entry
//! points.

use primitive_types::U256;

use crate::batch::sum_array;
use crate::checked::{mul_mod, safe_add, safe_add3, safe_mul};
use crate::constants::{BASE, MAX_MAGNITUDE, TRIAD_SUM};
use crate::digits::digital_root;
use crate::error::CalcResult;

const THREE: U256 = U256([3, 0, 0, 0]);

/// Digital roots of 1, 2, 4, 8, 16, 32, …
const VORTEX_CYCLE: [u64; 6] = [1, 2, 4, 8, 7, 5];

/// True when `a + b + c` is divisible by 3. Reduces each operand first so
/// the sum can never overflow.
pub fn verify_triad(a: U256, b: U256, c: U256) -> bool {
    let r = (a % THREE).low_u64() + (b % THREE).low_u64() + (c % THREE).low_u64();
    r % 3 == 0
}

pub fn triad_sum(a: U256, b: U256, c: U256) -> CalcResult<U256> {
    safe_add3(a, b, c)
}

/// `(a + b + c, digital_root(a + b + c))`.
pub fn resolve_triad_value(a: U256, b: U256, c: U256) -> CalcResult<(U256, U256)> {
    let sum = triad_sum(a, b, c)?;
    Ok((sum, digital_root(sum)))
}

/// Non-zero multiple of 3, the common factor of the triad.
pub fn is_triad_value(value: U256) -> bool {
    !value.is_zero() && (value % THREE).is_zero()
}

/// The digital root when it is 3, 6 or 9, otherwise 0.
pub fn triad_class(value: U256) -> U256 {
    let root = digital_root(value);
    if is_triad_value(root) { root } else { U256::zero() }
}

/// Digital root of `2^n`, which walks the 1-2-4-8-7-5 cycle.
pub fn vortex_position(n: U256) -> U256 {
    let index = (n % U256::from(VORTEX_CYCLE.len())).low_u64() as usize;
    U256::from(VORTEX_CYCLE[index])
}

pub fn is_base_aligned(value: U256) -> bool {
    (value % BASE).is_zero()
}

pub fn base_multiple(n: U256) -> CalcResult<U256> {
    safe_mul(n, BASE)
}

/// The `n`-th harmonic of a fundamental.
pub fn harmonic_of(fundamental: U256, n: U256) -> CalcResult<U256> {
    safe_mul(fundamental, n)
}

pub fn phase_alignment(phase: U256) -> U256 {
    phase % TRIAD_SUM
}

/// `magnitude · (phase + BASE) mod MAX_MAGNITUDE` with a 512-bit product.
pub fn flux_value(magnitude: U256, phase: U256) -> CalcResult<U256> {
    mul_mod(magnitude, safe_add(phase, BASE)?, MAX_MAGNITUDE)
}

/// `Σv · digital_root(Σv) · BASE mod MAX_MAGNITUDE`. The sum itself must
/// fit; only the final scaling wraps.
pub fn super_calc_value(values: &[U256]) -> CalcResult<U256> {
    let sum = sum_array(values)?;
    let factor = digital_root(sum) * BASE;
    mul_mod(sum, factor, MAX_MAGNITUDE)
}
