//! Overflow-checked 256-bit primitives.
//!
//! Everything here either returns the exact mathematical result or fails with
//! a named condition. Nothing wraps. Products that may exceed 256 bits before
//! a division or reduction are carried in a 512-bit intermediate.

use primitive_types::{U256, U512};

use crate::error::{CalcError, CalcResult};

pub fn safe_add(a: U256, b: U256) -> CalcResult<U256> {
    a.checked_add(b).ok_or(CalcError::ArithmeticOverflow)
}

pub fn safe_add3(a: U256, b: U256, c: U256) -> CalcResult<U256> {
    safe_add(safe_add(a, b)?, c)
}

/// Fails when `b > a` instead of wrapping.
pub fn safe_sub(a: U256, b: U256) -> CalcResult<U256> {
    a.checked_sub(b).ok_or(CalcError::ArithmeticOverflow)
}

pub fn safe_mul(a: U256, b: U256) -> CalcResult<U256> {
    a.checked_mul(b).ok_or(CalcError::ArithmeticOverflow)
}

pub fn safe_div(a: U256, b: U256) -> CalcResult<U256> {
    if b.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    Ok(a / b)
}

pub fn safe_mod(a: U256, b: U256) -> CalcResult<U256> {
    if b.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    Ok(a % b)
}

pub fn safe_pow(base: U256, exp: U256) -> CalcResult<U256> {
    base.checked_pow(exp).ok_or(CalcError::ArithmeticOverflow)
}

/// `floor(a * b / denominator)` with a full-width product.
/// Only the final quotient has to fit in 256 bits.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> CalcResult<U256> {
    if denominator.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    let quotient = a.full_mul(b) / U512::from(denominator);
    narrow(quotient)
}

/// `ceil(a * b / denominator)`.
pub fn mul_div_up(a: U256, b: U256, denominator: U256) -> CalcResult<U256> {
    if denominator.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    let (quotient, remainder) = a.full_mul(b).div_mod(U512::from(denominator));
    let quotient = narrow(quotient)?;
    if remainder.is_zero() {
        Ok(quotient)
    } else {
        safe_add(quotient, U256::one())
    }
}

/// `(a * b) mod modulus` without losing the high half of the product.
pub fn mul_mod(a: U256, b: U256, modulus: U256) -> CalcResult<U256> {
    if modulus.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    narrow(a.full_mul(b) % U512::from(modulus))
}

pub fn add_mod(a: U256, b: U256, modulus: U256) -> CalcResult<U256> {
    if modulus.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    let sum = U512::from(a) + U512::from(b);
    narrow(sum % U512::from(modulus))
}

/// `(a - b) mod modulus`, always in `[0, modulus)`.
pub fn sub_mod(a: U256, b: U256, modulus: U256) -> CalcResult<U256> {
    if modulus.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    let a = a % modulus;
    let b = b % modulus;
    if a >= b {
        Ok(a - b)
    } else {
        // modulus - (b - a) < modulus, no wrap
        Ok(modulus - (b - a))
    }
}

pub fn ceil_div(a: U256, b: U256) -> CalcResult<U256> {
    if b.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    let (q, r) = a.div_mod(b);
    if r.is_zero() { Ok(q) } else { safe_add(q, U256::one()) }
}

pub fn abs_diff(a: U256, b: U256) -> U256 {
    if a >= b { a - b } else { b - a }
}

/// Floor of the mean of two values; never overflows.
pub fn average_floor(a: U256, b: U256) -> U256 {
    (a & b) + ((a ^ b) >> 1usize)
}

/// Fails with MagnitudeBoundExceeded when the bounds are inverted.
pub fn clamp(value: U256, lo: U256, hi: U256) -> CalcResult<U256> {
    if lo > hi {
        return Err(CalcError::MagnitudeBoundExceeded);
    }
    Ok(value.max(lo).min(hi))
}

pub fn min(a: U256, b: U256) -> U256 {
    a.min(b)
}

pub fn max(a: U256, b: U256) -> U256 {
    a.max(b)
}

pub fn is_even(value: U256) -> bool {
    !value.bit(0)
}

pub fn is_odd(value: U256) -> bool {
    value.bit(0)
}

pub fn is_within_bound(value: U256, bound: U256) -> bool {
    value <= bound
}

/// Reduce a 512-bit intermediate back to 256 bits or fail.
pub(crate) fn narrow(value: U512) -> CalcResult<U256> {
    U256::try_from(value).map_err(|_| CalcError::ArithmeticOverflow)
}

/// Narrow a small count or index. Anything past `limit` fails with `err`.
pub(crate) fn small(value: U256, limit: u64, err: CalcError) -> CalcResult<u64> {
    if value > U256::from(limit) {
        return Err(err);
    }
    Ok(value.low_u64())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_add_overflow_detected() {
        assert_eq!(safe_add(U256::MAX, u(1)), Err(CalcError::ArithmeticOverflow));
        assert_eq!(safe_add(u(2), u(3)), Ok(u(5)));
    }

    #[test]
    fn test_sub_underflow_detected() {
        assert_eq!(safe_sub(u(3), u(4)), Err(CalcError::ArithmeticOverflow));
        assert_eq!(safe_sub(u(4), u(4)), Ok(U256::zero()));
    }

    #[test]
    fn test_mul_overflow_detected() {
        let half = U256::one() << 128usize;
        assert_eq!(safe_mul(half, half), Err(CalcError::ArithmeticOverflow));
        assert_eq!(safe_mul(half, u(2)), Ok(U256::one() << 129usize));
    }

    #[test]
    fn test_div_and_mod_by_zero() {
        assert_eq!(safe_div(u(1), U256::zero()), Err(CalcError::DivisionByZero));
        assert_eq!(safe_mod(u(1), U256::zero()), Err(CalcError::DivisionByZero));
        assert_eq!(safe_mod(u(10), u(3)), Ok(u(1)));
    }

    #[test]
    fn test_mul_div_zero_denominator() {
        assert_eq!(mul_div(u(7), u(9), U256::zero()), Err(CalcError::DivisionByZero));
        assert_eq!(
            mul_div(U256::zero(), U256::zero(), U256::zero()),
            Err(CalcError::DivisionByZero)
        );
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // MAX * MAX / MAX needs 512 bits in the middle
        assert_eq!(mul_div(U256::MAX, U256::MAX, U256::MAX), Ok(U256::MAX));
        assert_eq!(mul_div(U256::MAX, u(2), u(1)), Err(CalcError::ArithmeticOverflow));
    }

    #[test]
    fn test_mul_div_up_rounds() {
        assert_eq!(mul_div_up(u(10), u(1), u(3)), Ok(u(4)));
        assert_eq!(mul_div_up(u(9), u(1), u(3)), Ok(u(3)));
    }

    #[test]
    fn test_mul_mod_large_modulus() {
        let m = U256::MAX - u(58);
        let a = m - u(1);
        // (m-1)^2 mod m == 1
        assert_eq!(mul_mod(a, a, m), Ok(u(1)));
    }

    #[test]
    fn test_add_and_sub_mod() {
        // 2^256 ≡ 2 (mod 7), so MAX ≡ 1 and MAX + MAX ≡ 2
        assert_eq!(add_mod(U256::MAX, U256::MAX, u(7)), Ok(u(2)));
        assert_eq!(sub_mod(u(2), u(5), u(7)), Ok(u(4)));
        assert_eq!(sub_mod(u(5), u(2), u(7)), Ok(u(3)));
        assert_eq!(sub_mod(u(5), u(2), U256::zero()), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn test_average_floor_no_overflow() {
        assert_eq!(average_floor(U256::MAX, U256::MAX), U256::MAX);
        assert_eq!(average_floor(u(3), u(4)), u(3));
    }

    #[test]
    fn test_ceil_div() {
        assert_eq!(ceil_div(u(7), u(2)), Ok(u(4)));
        assert_eq!(ceil_div(u(0), u(2)), Ok(u(0)));
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(u(50), u(10), u(20)), Ok(u(20)));
        assert_eq!(clamp(u(5), u(10), u(20)), Ok(u(10)));
        assert_eq!(clamp(u(5), u(20), u(10)), Err(CalcError::MagnitudeBoundExceeded));
    }

    #[test]
    fn test_safe_pow() {
        assert_eq!(safe_pow(u(2), u(255)), Ok(U256::one() << 255usize));
        assert_eq!(safe_pow(u(2), u(256)), Err(CalcError::ArithmeticOverflow));
        assert_eq!(safe_pow(U256::zero(), U256::zero()), Ok(u(1)));
    }
}
