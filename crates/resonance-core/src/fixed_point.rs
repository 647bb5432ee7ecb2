//! Fixed-point helpers denominated in `SCALE` (10^18 == 1.0).

use primitive_types::U256;

use crate::checked::{mul_div, safe_add, safe_mul, safe_sub};
use crate::constants::{BASE, BPS_DENOMINATOR, MAX_MAGNITUDE, SCALE};
use crate::error::{CalcError, CalcResult};
use crate::number_theory::sqrt_floor;

pub fn to_scaled(value: U256) -> CalcResult<U256> {
    safe_mul(value, SCALE)
}

/// Truncates the fractional part.
pub fn from_scaled(value: U256) -> U256 {
    value / SCALE
}

pub fn scaled_mul(a: U256, b: U256) -> CalcResult<U256> {
    mul_div(a, b, SCALE)
}

pub fn scaled_div(a: U256, b: U256) -> CalcResult<U256> {
    mul_div(a, SCALE, b)
}

/// `base^exp` where `base` is scaled and `exp` is a plain integer.
pub fn scaled_pow(base: U256, exp: U256) -> CalcResult<U256> {
    let mut result = SCALE;
    let mut base = base;
    let mut exp = exp;
    while !exp.is_zero() {
        if exp.bit(0) {
            result = scaled_mul(result, base)?;
        }
        exp = exp >> 1usize;
        if !exp.is_zero() {
            base = scaled_mul(base, base)?;
        }
    }
    Ok(result)
}

/// √x in scaled terms: `floor(sqrt(x · SCALE))`.
pub fn scaled_sqrt(value: U256) -> CalcResult<U256> {
    Ok(sqrt_floor(safe_mul(value, SCALE)?))
}

/// 1 / x in scaled terms.
pub fn scaled_reciprocal(value: U256) -> CalcResult<U256> {
    scaled_div(SCALE, value)
}

/// Linear interpolation from `a` to `b` at scaled position `t ∈ [0, SCALE]`.
pub fn scaled_lerp(a: U256, b: U256, t: U256) -> CalcResult<U256> {
    if t > SCALE {
        return Err(CalcError::InvalidArgument);
    }
    if b >= a {
        safe_add(a, mul_div(b - a, t, SCALE)?)
    } else {
        safe_sub(a, mul_div(a - b, t, SCALE)?)
    }
}

/// `value · bps / 10_000`.
pub fn apply_bps(value: U256, bps: U256) -> CalcResult<U256> {
    mul_div(value, bps, BPS_DENOMINATOR)
}

pub fn scale_by_base(value: U256) -> CalcResult<U256> {
    safe_mul(value, BASE)
}

/// Fold any value back into `[0, MAX_MAGNITUDE)`.
pub fn wrap_magnitude(value: U256) -> U256 {
    value % MAX_MAGNITUDE
}
