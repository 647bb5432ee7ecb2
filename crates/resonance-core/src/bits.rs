//! Bit-level operations on 256-bit words.
//!
//! The `full_*` functions report overflow as a flag next to the wrapped
//! result. They are the one place where wrapping is allowed; the `safe_*`
//! family in [`crate::checked`] rejects instead.

use primitive_types::U256;

use crate::checked::small;
use crate::error::{CalcError, CalcResult};

const WORD_BITS: usize = 256;

fn bit_index(index: U256) -> CalcResult<usize> {
    Ok(small(index, (WORD_BITS - 1) as u64, CalcError::MagnitudeBoundExceeded)? as usize)
}

pub fn popcount(value: U256) -> U256 {
    let ones: u32 = value.0.iter().map(|limb| limb.count_ones()).sum();
    U256::from(ones)
}

/// True when the number of set bits is odd.
pub fn parity(value: U256) -> bool {
    value.0.iter().fold(0u32, |acc, limb| acc ^ (limb.count_ones() & 1)) == 1
}

pub fn is_power_of_two(value: U256) -> bool {
    !value.is_zero() && (value & (value - U256::one())).is_zero()
}

/// Smallest power of two ≥ value. `0 → 1`.
pub fn next_power_of_two(value: U256) -> CalcResult<U256> {
    if value <= U256::one() {
        return Ok(U256::one());
    }
    if is_power_of_two(value) {
        return Ok(value);
    }
    let bits = value.bits();
    if bits >= WORD_BITS {
        return Err(CalcError::ArithmeticOverflow);
    }
    Ok(U256::one() << bits)
}

/// Largest power of two ≤ value.
pub fn prev_power_of_two(value: U256) -> CalcResult<U256> {
    if value.is_zero() {
        return Err(CalcError::ZeroMagnitude);
    }
    Ok(U256::one() << (value.bits() - 1))
}

pub fn bit_length(value: U256) -> U256 {
    U256::from(value.bits())
}

pub fn leading_zeros(value: U256) -> U256 {
    U256::from(value.leading_zeros())
}

/// 256 for zero.
pub fn trailing_zeros(value: U256) -> U256 {
    if value.is_zero() {
        return U256::from(WORD_BITS);
    }
    U256::from(value.trailing_zeros())
}

/// Circular left rotation by `k mod 256`.
pub fn rotate_left(value: U256, k: U256) -> U256 {
    let k = (k % U256::from(WORD_BITS)).low_u64() as usize;
    if k == 0 {
        return value;
    }
    (value << k) | (value >> (WORD_BITS - k))
}

/// Circular right rotation by `k mod 256`.
pub fn rotate_right(value: U256, k: U256) -> U256 {
    let k = (k % U256::from(WORD_BITS)).low_u64() as usize;
    if k == 0 {
        return value;
    }
    (value >> k) | (value << (WORD_BITS - k))
}

/// Mirror the whole 256-bit word.
pub fn reverse_bits(value: U256) -> U256 {
    let mut limbs = [0u64; 4];
    for (i, limb) in value.0.iter().enumerate() {
        limbs[3 - i] = limb.reverse_bits();
    }
    U256(limbs)
}

pub fn test_bit(value: U256, index: U256) -> CalcResult<bool> {
    Ok(value.bit(bit_index(index)?))
}

pub fn set_bit(value: U256, index: U256) -> CalcResult<U256> {
    Ok(value | (U256::one() << bit_index(index)?))
}

pub fn clear_bit(value: U256, index: U256) -> CalcResult<U256> {
    Ok(value & !(U256::one() << bit_index(index)?))
}

pub fn toggle_bit(value: U256, index: U256) -> CalcResult<U256> {
    Ok(value ^ (U256::one() << bit_index(index)?))
}

/// Isolate the lowest set bit; 0 stays 0.
pub fn lowest_set_bit(value: U256) -> U256 {
    let (neg, _) = (!value).overflowing_add(U256::one());
    value & neg
}

pub fn gray_encode(value: U256) -> U256 {
    value ^ (value >> 1usize)
}

pub fn gray_decode(value: U256) -> U256 {
    let mut out = value;
    let mut shift = 1usize;
    while shift < WORD_BITS {
        out = out ^ (out >> shift);
        shift <<= 1;
    }
    out
}

/// Byte `index` counting from the least significant (0..32).
pub fn byte_at(value: U256, index: U256) -> CalcResult<U256> {
    let index = small(index, 31, CalcError::MagnitudeBoundExceeded)? as usize;
    Ok(U256::from(value.byte(index)))
}

/// Wrapped sum and carry-out.
pub fn full_add(a: U256, b: U256) -> (U256, bool) {
    a.overflowing_add(b)
}

/// Wrapped difference and borrow-out.
pub fn full_sub(a: U256, b: U256) -> (U256, bool) {
    a.overflowing_sub(b)
}

/// Low 256 bits of the product and whether anything was lost.
pub fn full_mul(a: U256, b: U256) -> (U256, bool) {
    let (hi, lo) = full_mul_wide(a, b);
    (lo, !hi.is_zero())
}

/// The complete 512-bit product as `(hi, lo)`.
pub fn full_mul_wide(a: U256, b: U256) -> (U256, U256) {
    let wide = a.full_mul(b);
    let w = wide.0;
    (U256([w[4], w[5], w[6], w[7]]), U256([w[0], w[1], w[2], w[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_popcount_parity() {
        assert_eq!(popcount(u(0)), u(0));
        assert_eq!(popcount(u(0b1011)), u(3));
        assert_eq!(popcount(U256::MAX), u(256));
        assert!(parity(u(0b1011)));
        assert!(!parity(u(0b11)));
        assert!(!parity(U256::MAX));
    }

    #[test]
    fn test_powers_of_two() {
        assert!(is_power_of_two(u(1)));
        assert!(is_power_of_two(u(1024)));
        assert!(!is_power_of_two(u(0)));
        assert!(!is_power_of_two(u(369)));
        assert_eq!(next_power_of_two(u(0)), Ok(u(1)));
        assert_eq!(next_power_of_two(u(369)), Ok(u(512)));
        assert_eq!(next_power_of_two(u(512)), Ok(u(512)));
        assert_eq!(next_power_of_two(U256::one() << 255usize), Ok(U256::one() << 255usize));
        assert_eq!(
            next_power_of_two((U256::one() << 255usize) + u(1)),
            Err(CalcError::ArithmeticOverflow)
        );
        assert_eq!(prev_power_of_two(u(369)), Ok(u(256)));
        assert_eq!(prev_power_of_two(u(0)), Err(CalcError::ZeroMagnitude));
    }

    #[test]
    fn test_rotation_wraps_mod_256() {
        let top = U256::one() << 255usize;
        assert_eq!(rotate_left(top, u(1)), u(1));
        assert_eq!(rotate_right(u(1), u(1)), top);
        assert_eq!(rotate_left(u(5), u(256)), u(5));
        assert_eq!(rotate_left(u(5), u(257)), u(10));
        assert_eq!(rotate_right(rotate_left(u(369), u(77)), u(77)), u(369));
    }

    #[test]
    fn test_reverse_bits() {
        assert_eq!(reverse_bits(u(1)), U256::one() << 255usize);
        assert_eq!(reverse_bits(reverse_bits(u(369))), u(369));
    }

    #[test]
    fn test_single_bit_ops() {
        assert_eq!(test_bit(u(4), u(2)), Ok(true));
        assert_eq!(set_bit(u(0), u(3)), Ok(u(8)));
        assert_eq!(clear_bit(u(15), u(0)), Ok(u(14)));
        assert_eq!(toggle_bit(u(1), u(0)), Ok(u(0)));
        assert_eq!(test_bit(u(1), u(256)), Err(CalcError::MagnitudeBoundExceeded));
        assert_eq!(lowest_set_bit(u(12)), u(4));
        assert_eq!(lowest_set_bit(u(0)), u(0));
    }

    #[test]
    fn test_gray() {
        for v in [0u64, 1, 2, 3, 369, 1 << 40] {
            assert_eq!(gray_decode(gray_encode(u(v))), u(v));
        }
        assert_eq!(gray_encode(u(2)), u(3));
    }

    #[test]
    fn test_byte_at() {
        assert_eq!(byte_at(u(0x1234), u(0)), Ok(u(0x34)));
        assert_eq!(byte_at(u(0x1234), u(1)), Ok(u(0x12)));
        assert_eq!(byte_at(u(0x1234), u(32)), Err(CalcError::MagnitudeBoundExceeded));
    }

    #[test]
    fn test_full_ops_report_instead_of_failing() {
        assert_eq!(full_add(U256::MAX, u(2)), (u(1), true));
        assert_eq!(full_add(u(2), u(2)), (u(4), false));
        assert_eq!(full_sub(u(0), u(1)), (U256::MAX, true));
        assert_eq!(full_mul(U256::MAX, u(2)), (U256::MAX - u(1), true));
        assert_eq!(full_mul(u(3), u(4)), (u(12), false));
        assert_eq!(full_mul_wide(U256::MAX, U256::MAX), (U256::MAX - u(1), u(1)));
    }
}
