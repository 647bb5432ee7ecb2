//! Counting functions, integer sequences and figurate numbers.
//!
//! Functions with a documented domain cap (factorial, Catalan, partitions,
//! Stirling/Bell) reject larger inputs with MagnitudeBoundExceeded. Everything
//! else grows until a checked step overflows.

use primitive_types::U256;

use crate::checked::{mul_div, safe_add, safe_mul, safe_sub, small};
use crate::constants::{CATALAN_LIMIT, FACTORIAL_LIMIT, PARTITION_LIMIT, STIRLING_LIMIT};
use crate::error::{CalcError, CalcResult};

/// p(n) for n in 0..=25.
const PARTITIONS: [u64; PARTITION_LIMIT + 1] = [
    1, 1, 2, 3, 5, 7, 11, 15, 22, 30, 42, 56, 77, 101, 135, 176, 231, 297, 385, 490, 627, 792,
    1002, 1255, 1575, 1958,
];

/// Index ceiling for the plain recurrences; all of them overflow well before it.
const SEQUENCE_LIMIT: u64 = 1_000;

fn two() -> U256 {
    U256::from(2u64)
}

pub fn factorial(n: U256) -> CalcResult<U256> {
    let n = small(n, u64::from(FACTORIAL_LIMIT), CalcError::MagnitudeBoundExceeded)?;
    let mut acc = U256::one();
    for i in 2..=n {
        acc = safe_mul(acc, U256::from(i))?;
    }
    Ok(acc)
}

/// n·(n-2)·(n-4)·…, with `0!! == 1!! == 1`.
pub fn double_factorial(n: U256) -> CalcResult<U256> {
    let n = small(n, SEQUENCE_LIMIT, CalcError::MagnitudeBoundExceeded)?;
    let mut acc = U256::one();
    let mut i = n;
    while i > 1 {
        acc = safe_mul(acc, U256::from(i))?;
        i -= 2;
    }
    Ok(acc)
}

/// C(n, k) by the multiplicative formula over `min(k, n - k)` steps.
/// Each step `c · (n - i) / (i + 1)` is exact; the product is carried at
/// 512 bits so only a result that truly exceeds 256 bits fails.
/// `k > n` yields 0.
pub fn binomial_coeff(n: U256, k: U256) -> CalcResult<U256> {
    if k > n {
        return Ok(U256::zero());
    }
    let k = k.min(n - k);
    let mut c = U256::one();
    let mut i = U256::zero();
    while i < k {
        c = mul_div(c, n - i, i + U256::one())?;
        i = i + U256::one();
    }
    Ok(c)
}

/// P(n, k) = n! / (n - k)!. `k > n` yields 0.
pub fn permutations(n: U256, k: U256) -> CalcResult<U256> {
    if k > n {
        return Ok(U256::zero());
    }
    let mut acc = U256::one();
    let mut i = U256::zero();
    while i < k {
        acc = safe_mul(acc, n - i)?;
        i = i + U256::one();
    }
    Ok(acc)
}

/// C(2n, n) / (n + 1), n ≤ 10.
pub fn catalan_number(n: U256) -> CalcResult<U256> {
    let n = small(n, u64::from(CATALAN_LIMIT), CalcError::MagnitudeBoundExceeded)?;
    let n = U256::from(n);
    let central = binomial_coeff(n * two(), n)?;
    Ok(central / (n + U256::one()))
}

/// S(n, k) from `S(i, j) = S(i-1, j-1) + j·S(i-1, j)` with one rolling row.
///
/// Only the cells that feed S(n, k) are filled in. Each of those is at most
/// S(n, k), so no intermediate can overflow unless the answer does.
pub fn stirling_second(n: U256, k: U256) -> CalcResult<U256> {
    let n = small(n, u64::from(STIRLING_LIMIT), CalcError::MagnitudeBoundExceeded)? as usize;
    if k > U256::from(n) {
        return Ok(U256::zero());
    }
    let k = k.low_u64() as usize;

    let mut row = vec![U256::zero(); k + 1];
    row[0] = U256::one();
    for i in 1..=n {
        let lo = k.saturating_sub(n - i).max(1);
        let hi = i.min(k);
        let mut next = vec![U256::zero(); k + 1];
        for j in lo..=hi {
            let carried = safe_mul(U256::from(j), row[j])?;
            next[j] = safe_add(row[j - 1], carried)?;
        }
        row = next;
    }
    Ok(row[k])
}

/// B(n) = Σₖ S(n, k).
pub fn bell_number(n: U256) -> CalcResult<U256> {
    let n = small(n, u64::from(STIRLING_LIMIT), CalcError::MagnitudeBoundExceeded)? as usize;
    let mut row = vec![U256::zero(); n + 1];
    row[0] = U256::one();
    for i in 1..=n {
        let mut next = vec![U256::zero(); n + 1];
        for j in 1..=i {
            next[j] = safe_add(row[j - 1], safe_mul(U256::from(j), row[j])?)?;
        }
        row = next;
    }
    row.into_iter().try_fold(U256::zero(), safe_add)
}

/// Subfactorial !n: permutations with no fixed point.
pub fn derangements(n: U256) -> CalcResult<U256> {
    let n = small(n, SEQUENCE_LIMIT, CalcError::MagnitudeBoundExceeded)?;
    if n == 0 {
        return Ok(U256::one());
    }
    let (mut prev, mut curr) = (U256::one(), U256::zero());
    for i in 2..=n {
        let next = safe_mul(U256::from(i - 1), safe_add(prev, curr)?)?;
        prev = curr;
        curr = next;
    }
    Ok(curr)
}

/// Integer partitions p(n) from a fixed table, n ≤ 25.
pub fn euler_partition(n: U256) -> CalcResult<U256> {
    let n = small(n, PARTITION_LIMIT as u64, CalcError::MagnitudeBoundExceeded)?;
    Ok(U256::from(PARTITIONS[n as usize]))
}

fn linear_recurrence<const N: usize>(n: U256, seed: [U256; N]) -> CalcResult<U256> {
    let n = small(n, SEQUENCE_LIMIT, CalcError::MagnitudeBoundExceeded)? as usize;
    if n < N {
        return Ok(seed[n]);
    }
    let mut window = seed;
    for _ in N..=n {
        let next = window.iter().try_fold(U256::zero(), |acc, &v| safe_add(acc, v))?;
        window.rotate_left(1);
        window[N - 1] = next;
    }
    Ok(window[N - 1])
}

pub fn fibonacci(n: U256) -> CalcResult<U256> {
    linear_recurrence(n, [U256::zero(), U256::one()])
}

pub fn lucas(n: U256) -> CalcResult<U256> {
    linear_recurrence(n, [two(), U256::one()])
}

/// T(0) = T(1) = 0, T(2) = 1.
pub fn tribonacci(n: U256) -> CalcResult<U256> {
    linear_recurrence(n, [U256::zero(), U256::zero(), U256::one()])
}

/// n(n+1)/2.
pub fn triangular(n: U256) -> CalcResult<U256> {
    mul_div(n, safe_add(n, U256::one())?, two())
}

/// Whether `x` is some n(n+1)/2, i.e. 8x + 1 is a perfect square.
pub fn is_triangular(x: U256) -> CalcResult<bool> {
    let disc = safe_add(safe_mul(x, U256::from(8u64))?, U256::one())?;
    Ok(crate::number_theory::is_perfect_square(disc))
}

/// n-th s-gonal number: ((s-2)n² - (s-4)n) / 2, s ≥ 3.
pub fn polygonal(s: U256, n: U256) -> CalcResult<U256> {
    if s < U256::from(3u64) {
        return Err(CalcError::InvalidArgument);
    }
    let n_sq = safe_mul(n, n)?;
    let lead = safe_mul(s - two(), n_sq)?;
    let numerator = if s == U256::from(3u64) {
        safe_add(lead, n)?
    } else {
        safe_sub(lead, safe_mul(s - U256::from(4u64), n)?)?
    };
    Ok(numerator / two())
}

pub fn pentagonal(n: U256) -> CalcResult<U256> {
    polygonal(U256::from(5u64), n)
}

pub fn hexagonal(n: U256) -> CalcResult<U256> {
    polygonal(U256::from(6u64), n)
}

/// n(n+1)(n+2)/6.
pub fn tetrahedral(n: U256) -> CalcResult<U256> {
    mul_div(triangular(n)?, safe_add(n, two())?, U256::from(3u64))
}

/// n(n+1)(2n+1)/6, which is also 1² + 2² + … + n².
pub fn square_pyramidal(n: U256) -> CalcResult<U256> {
    let odd = safe_add(safe_mul(n, two())?, U256::one())?;
    mul_div(triangular(n)?, odd, U256::from(3u64))
}

/// 1³ + … + n³ = T(n)².
pub fn sum_of_cubes(n: U256) -> CalcResult<U256> {
    let t = triangular(n)?;
    safe_mul(t, t)
}

/// Σ_{i<n} (a + i·d).
pub fn arithmetic_series(a: U256, d: U256, n: U256) -> CalcResult<U256> {
    if n.is_zero() {
        return Ok(U256::zero());
    }
    let base = safe_mul(a, n)?;
    let steps = mul_div(n, n - U256::one(), two())?;
    safe_add(base, safe_mul(d, steps)?)
}

/// Σ_{i<n} a·rⁱ.
pub fn geometric_series(a: U256, r: U256, n: U256) -> CalcResult<U256> {
    if a.is_zero() || n.is_zero() {
        return Ok(U256::zero());
    }
    if r.is_zero() {
        return Ok(a);
    }
    if r == U256::one() {
        return safe_mul(a, n);
    }
    // r ≥ 2 and a ≥ 1: the term overflows within 256 steps
    let mut sum = U256::zero();
    let mut term = a;
    let mut i = U256::zero();
    while i < n {
        sum = safe_add(sum, term)?;
        i = i + U256::one();
        if i < n {
            term = safe_mul(term, r)?;
        }
    }
    Ok(sum)
}
