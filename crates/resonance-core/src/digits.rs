//! Base-10 digit arithmetic and the triad resonance tests built on it.

use primitive_types::U256;

use crate::checked::{safe_add, safe_mul, safe_pow};
use crate::error::{CalcError, CalcResult};

const TEN: U256 = U256([10, 0, 0, 0]);
const NINE: U256 = U256([9, 0, 0, 0]);

/// Decimal digits, least significant first. `0` yields `[0]`.
fn digits_le(mut value: U256) -> Vec<u8> {
    if value.is_zero() {
        return vec![0];
    }
    let mut out = Vec::with_capacity(78);
    while !value.is_zero() {
        let (q, r) = value.div_mod(TEN);
        out.push(r.low_u64() as u8);
        value = q;
    }
    out
}

/// Sum of decimal digits. At most 78 · 9, so it cannot overflow.
pub fn digit_sum(mut value: U256) -> U256 {
    let mut sum = 0u64;
    while !value.is_zero() {
        let (q, r) = value.div_mod(TEN);
        sum += r.low_u64();
        value = q;
    }
    U256::from(sum)
}

/// Closed-form digital root: 0 for 0, 9 for non-zero multiples of 9,
/// otherwise `v mod 9`.
pub fn digital_root(value: U256) -> U256 {
    if value.is_zero() {
        return U256::zero();
    }
    let r = value % NINE;
    if r.is_zero() { NINE } else { r }
}

/// Collapses by repeated `digit_sum` until the value is a single digit, then
/// tests membership in {3, 6, 9}.
///
/// Deliberately iterative rather than going through [`digital_root`].
pub fn is_triad_resonant(value: U256) -> bool {
    let mut v = value;
    while v > NINE {
        v = digit_sum(v);
    }
    let v = v.low_u64();
    v == 3 || v == 6 || v == 9
}

pub fn digit_count(value: U256) -> U256 {
    U256::from(digits_le(value).len())
}

pub fn digit_product(value: U256) -> U256 {
    // 9^78 < 2^248, so the product always fits
    digits_le(value)
        .into_iter()
        .fold(U256::one(), |acc, d| acc * U256::from(d))
}

/// Digit `n` counting from the least significant (0-based). Past the end is 0.
pub fn nth_digit(value: U256, n: U256) -> U256 {
    let digits = digits_le(value);
    if n >= U256::from(digits.len()) {
        return U256::zero();
    }
    U256::from(digits[n.low_u64() as usize])
}

pub fn leading_digit(value: U256) -> U256 {
    let digits = digits_le(value);
    U256::from(digits[digits.len() - 1])
}

/// Digits reversed. Trailing zeros vanish: `reverse_digits(120) == 21`.
/// Fails when the reversed number does not fit in 256 bits.
pub fn reverse_digits(mut value: U256) -> CalcResult<U256> {
    let mut reversed = U256::zero();
    while !value.is_zero() {
        let (q, r) = value.div_mod(TEN);
        reversed = safe_add(safe_mul(reversed, TEN)?, r)?;
        value = q;
    }
    Ok(reversed)
}

pub fn is_palindrome(value: U256) -> bool {
    let digits = digits_le(value);
    digits.iter().eq(digits.iter().rev())
}

/// Divisible by its own digit sum. Zero has no digit sum to divide by.
pub fn is_harshad(value: U256) -> CalcResult<bool> {
    if value.is_zero() {
        return Err(CalcError::ZeroMagnitude);
    }
    Ok((value % digit_sum(value)).is_zero())
}

/// Equal to the sum of its digits each raised to the digit count.
pub fn is_armstrong(value: U256) -> CalcResult<bool> {
    let digits = digits_le(value);
    let k = U256::from(digits.len());
    let mut sum = U256::zero();
    for d in digits {
        sum = safe_add(sum, safe_pow(U256::from(d), k)?)?;
    }
    Ok(sum == value)
}

fn check_digit(digit: U256) -> CalcResult<u8> {
    if digit > NINE {
        return Err(CalcError::InvalidArgument);
    }
    Ok(digit.low_u64() as u8)
}

pub fn digit_frequency(value: U256, digit: U256) -> CalcResult<U256> {
    let d = check_digit(digit)?;
    Ok(U256::from(digits_le(value).into_iter().filter(|&x| x == d).count()))
}

pub fn contains_digit(value: U256, digit: U256) -> CalcResult<bool> {
    let d = check_digit(digit)?;
    Ok(digits_le(value).contains(&d))
}

/// True for the single digits 3, 6 and 9.
pub fn is_triad_digit(value: U256) -> bool {
    value == U256::from(3u64) || value == U256::from(6u64) || value == NINE
}

/// How many of the digits are 3, 6 or 9.
pub fn triad_digit_count(value: U256) -> U256 {
    let n = digits_le(value)
        .into_iter()
        .filter(|d| matches!(d, 3 | 6 | 9))
        .count();
    U256::from(n)
}

/// Number of digit-sum passes needed to reach a single digit.
pub fn additive_persistence(value: U256) -> U256 {
    let mut v = value;
    let mut steps = 0u64;
    while v > NINE {
        v = digit_sum(v);
        steps += 1;
    }
    U256::from(steps)
}

/// Number of digit-product passes needed to reach a single digit.
pub fn multiplicative_persistence(value: U256) -> U256 {
    let mut v = value;
    let mut steps = 0u64;
    while v > NINE {
        v = digit_product(v);
        steps += 1;
    }
    U256::from(steps)
}

pub fn squared_digit_sum(value: U256) -> U256 {
    let sum: u64 = digits_le(value)
        .into_iter()
        .map(|d| u64::from(d) * u64::from(d))
        .sum();
    U256::from(sum)
}

/// Repeated squared-digit sums reach 1. Every unhappy number enters the
/// cycle through 4.
pub fn is_happy(value: U256) -> bool {
    if value.is_zero() {
        return false;
    }
    let mut v = value;
    loop {
        if v == U256::one() {
            return true;
        }
        if v == U256::from(4u64) {
            return false;
        }
        v = squared_digit_sum(v);
    }
}

/// Decimal concatenation: `concat_numbers(12, 34) == 1234`.
pub fn concat_numbers(a: U256, b: U256) -> CalcResult<U256> {
    let shift = safe_pow(TEN, digit_count(b))?;
    safe_add(safe_mul(a, shift)?, b)
}

/// Digits of `value` in `base`, most significant first.
pub fn to_base_digits(value: U256, base: U256) -> CalcResult<Vec<U256>> {
    if base < U256::from(2u64) {
        return Err(CalcError::InvalidArgument);
    }
    if value.is_zero() {
        return Ok(vec![U256::zero()]);
    }
    let mut out = Vec::new();
    let mut v = value;
    while !v.is_zero() {
        let (q, r) = v.div_mod(base);
        out.push(r);
        v = q;
    }
    out.reverse();
    Ok(out)
}

pub fn digit_sum_in_base(value: U256, base: U256) -> CalcResult<U256> {
    let digits = to_base_digits(value, base)?;
    digits.into_iter().try_fold(U256::zero(), safe_add)
}

/// Every digit the same (single-digit numbers included).
pub fn is_repdigit(value: U256) -> bool {
    let digits = digits_le(value);
    digits.iter().all(|&d| d == digits[0])
}
