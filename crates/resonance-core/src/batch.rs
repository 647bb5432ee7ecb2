//! Reducers over sequences of engine values.
//!
//! Every reducer validates shape before touching a value: an empty sequence
//! fails with `EmptyOperands` (there are no identity elements here), parallel
//! sequences of different length fail with `ArrayLengthMismatch`, and the
//! product-like reducers refuse more than `MAX_OPERANDS` entries. Arithmetic
//! is checked element by element and fails on the first overflow.

use std::collections::{BTreeMap, BTreeSet};

use primitive_types::U256;

use crate::checked::{abs_diff, mul_div, safe_add, safe_mul, safe_sub};
use crate::constants::MAX_OPERANDS;
use crate::digits::{digit_sum, digital_root, is_triad_resonant};
use crate::error::{CalcError, CalcResult};
use crate::number_theory::{gcd, lcm, sqrt_floor};

fn non_empty(values: &[U256]) -> CalcResult<()> {
    if values.is_empty() {
        return Err(CalcError::EmptyOperands);
    }
    Ok(())
}

fn capped(values: &[U256]) -> CalcResult<()> {
    non_empty(values)?;
    if values.len() > MAX_OPERANDS {
        return Err(CalcError::ArrayLengthMismatch);
    }
    Ok(())
}

fn paired(a: &[U256], b: &[U256]) -> CalcResult<()> {
    non_empty(a)?;
    if a.len() != b.len() {
        return Err(CalcError::ArrayLengthMismatch);
    }
    Ok(())
}

fn len_of(values: &[U256]) -> U256 {
    U256::from(values.len())
}

pub fn sum_array(values: &[U256]) -> CalcResult<U256> {
    non_empty(values)?;
    values.iter().try_fold(U256::zero(), |acc, &v| safe_add(acc, v))
}

pub fn product_array(values: &[U256]) -> CalcResult<U256> {
    capped(values)?;
    values.iter().try_fold(U256::one(), |acc, &v| safe_mul(acc, v))
}

pub fn min_array(values: &[U256]) -> CalcResult<U256> {
    values.iter().copied().min().ok_or(CalcError::EmptyOperands)
}

pub fn max_array(values: &[U256]) -> CalcResult<U256> {
    values.iter().copied().max().ok_or(CalcError::EmptyOperands)
}

/// `max - min`.
pub fn range_array(values: &[U256]) -> CalcResult<U256> {
    Ok(max_array(values)? - min_array(values)?)
}

/// Index of the first minimum.
pub fn argmin(values: &[U256]) -> CalcResult<U256> {
    non_empty(values)?;
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v < values[best] {
            best = i;
        }
    }
    Ok(U256::from(best))
}

/// Index of the first maximum.
pub fn argmax(values: &[U256]) -> CalcResult<U256> {
    non_empty(values)?;
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    Ok(U256::from(best))
}

pub fn gcd_batch(values: &[U256]) -> CalcResult<U256> {
    non_empty(values)?;
    Ok(values.iter().fold(U256::zero(), |acc, &v| gcd(acc, v)))
}

pub fn lcm_batch(values: &[U256]) -> CalcResult<U256> {
    capped(values)?;
    let mut acc = values[0];
    for &v in &values[1..] {
        acc = lcm(acc, v)?;
    }
    Ok(acc)
}

pub fn xor_all(values: &[U256]) -> CalcResult<U256> {
    non_empty(values)?;
    Ok(values.iter().fold(U256::zero(), |acc, &v| acc ^ v))
}

pub fn and_all(values: &[U256]) -> CalcResult<U256> {
    non_empty(values)?;
    Ok(values.iter().fold(U256::MAX, |acc, &v| acc & v))
}

pub fn or_all(values: &[U256]) -> CalcResult<U256> {
    non_empty(values)?;
    Ok(values.iter().fold(U256::zero(), |acc, &v| acc | v))
}

/// Truncating arithmetic mean.
pub fn mean(values: &[U256]) -> CalcResult<U256> {
    Ok(sum_array(values)? / len_of(values))
}

fn sorted_copy(values: &[U256]) -> CalcResult<Vec<U256>> {
    non_empty(values)?;
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    Ok(sorted)
}

/// Middle value of an ascending copy; an even count averages the two middle
/// values with truncation.
pub fn median(values: &[U256]) -> CalcResult<U256> {
    let sorted = sorted_copy(values)?;
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        return Ok(sorted[mid]);
    }
    let (lo, hi) = (sorted[mid - 1], sorted[mid]);
    Ok(lo + (hi - lo) / U256::from(2u64))
}

/// Nearest-rank style percentile: index `floor(len · pct / 100)` clamped to
/// the last element. `pct` must lie in [0, 100].
pub fn percentile_approx(values: &[U256], pct: U256) -> CalcResult<U256> {
    let sorted = sorted_copy(values)?;
    if pct > U256::from(100u64) {
        return Err(CalcError::InvalidArgument);
    }
    let pct = pct.low_u64() as usize;
    let index = (sorted.len() * pct / 100).min(sorted.len() - 1);
    Ok(sorted[index])
}

/// Population variance with truncating division.
pub fn variance(values: &[U256]) -> CalcResult<U256> {
    let m = mean(values)?;
    let mut acc = U256::zero();
    for &v in values {
        let d = abs_diff(v, m);
        acc = safe_add(acc, safe_mul(d, d)?)?;
    }
    Ok(acc / len_of(values))
}

pub fn std_dev_approx(values: &[U256]) -> CalcResult<U256> {
    Ok(sqrt_floor(variance(values)?))
}

/// Most frequent value; ties go to the smallest.
pub fn mode(values: &[U256]) -> CalcResult<U256> {
    non_empty(values)?;
    let mut counts: BTreeMap<U256, usize> = BTreeMap::new();
    for &v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut best = (U256::zero(), 0usize);
    for (v, n) in counts {
        if n > best.1 {
            best = (v, n);
        }
    }
    Ok(best.0)
}

pub fn distinct_count(values: &[U256]) -> CalcResult<U256> {
    non_empty(values)?;
    Ok(U256::from(values.iter().collect::<BTreeSet<_>>().len()))
}

/// How many entries have a triad digital root.
pub fn count_resonant(values: &[U256]) -> CalcResult<U256> {
    non_empty(values)?;
    Ok(U256::from(values.iter().filter(|&&v| is_triad_resonant(v)).count()))
}

/// Entries strictly greater than `threshold`.
pub fn count_above(values: &[U256], threshold: U256) -> CalcResult<U256> {
    non_empty(values)?;
    Ok(U256::from(values.iter().filter(|&&v| v > threshold).count()))
}

pub fn contains_value(values: &[U256], needle: U256) -> CalcResult<bool> {
    non_empty(values)?;
    Ok(values.contains(&needle))
}

/// Non-decreasing order.
pub fn is_sorted(values: &[U256]) -> CalcResult<bool> {
    non_empty(values)?;
    Ok(values.windows(2).all(|w| w[0] <= w[1]))
}

pub fn sum_of_squares_array(values: &[U256]) -> CalcResult<U256> {
    non_empty(values)?;
    values
        .iter()
        .try_fold(U256::zero(), |acc, &v| safe_add(acc, safe_mul(v, v)?))
}

pub fn add_arrays(a: &[U256], b: &[U256]) -> CalcResult<Vec<U256>> {
    paired(a, b)?;
    a.iter().zip(b).map(|(&x, &y)| safe_add(x, y)).collect()
}

/// Elementwise `a - b`; any `b[i] > a[i]` fails.
pub fn sub_arrays(a: &[U256], b: &[U256]) -> CalcResult<Vec<U256>> {
    paired(a, b)?;
    a.iter().zip(b).map(|(&x, &y)| safe_sub(x, y)).collect()
}

pub fn mul_arrays(a: &[U256], b: &[U256]) -> CalcResult<Vec<U256>> {
    paired(a, b)?;
    capped(a)?;
    a.iter().zip(b).map(|(&x, &y)| safe_mul(x, y)).collect()
}

pub fn dot_product(a: &[U256], b: &[U256]) -> CalcResult<U256> {
    paired(a, b)?;
    capped(a)?;
    a.iter()
        .zip(b)
        .try_fold(U256::zero(), |acc, (&x, &y)| safe_add(acc, safe_mul(x, y)?))
}

/// `Σ(v·w) / Σw`, truncating. All-zero weights divide by zero.
pub fn weighted_mean(values: &[U256], weights: &[U256]) -> CalcResult<U256> {
    let numerator = dot_product(values, weights)?;
    let total = sum_array(weights)?;
    mul_div(numerator, U256::one(), total)
}

/// Running totals: `out[i] = values[0] + … + values[i]`.
pub fn cumulative_sum(values: &[U256]) -> CalcResult<Vec<U256>> {
    non_empty(values)?;
    let mut acc = U256::zero();
    let mut out = Vec::with_capacity(values.len());
    for &v in values {
        acc = safe_add(acc, v)?;
        out.push(acc);
    }
    Ok(out)
}

pub fn scale_array(values: &[U256], factor: U256) -> CalcResult<Vec<U256>> {
    non_empty(values)?;
    values.iter().map(|&v| safe_mul(v, factor)).collect()
}

pub fn digital_root_batch(values: &[U256]) -> CalcResult<Vec<U256>> {
    non_empty(values)?;
    Ok(values.iter().map(|&v| digital_root(v)).collect())
}

pub fn digit_sum_batch(values: &[U256]) -> CalcResult<Vec<U256>> {
    non_empty(values)?;
    Ok(values.iter().map(|&v| digit_sum(v)).collect())
}
