//! Divisibility, modular arithmetic, primality and integer roots.

use primitive_types::U256;

use crate::checked::{average_floor, mul_mod, safe_add, safe_mul, sub_mod};
use crate::constants::{COLLATZ_STEP_LIMIT, DIVISOR_SCAN_LIMIT, TOTIENT_TRIAL_LIMIT};
use crate::digits::digit_count;
use crate::error::{CalcError, CalcResult};

/// Miller-Rabin witnesses. Deterministic for every n < 3.3 · 10^24.
const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Candidates examined by `next_prime` before giving up.
const PRIME_SEARCH_WINDOW: u64 = 100_000;

/// Euclid. `gcd(a, 0) == a`, `gcd(0, 0) == 0`.
pub fn gcd(mut a: U256, mut b: U256) -> U256 {
    while !b.is_zero() {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// `a * b / gcd(a, b)`, 0 when either side is 0. The product is checked
/// before dividing, so large coprime-ish pairs fail rather than wrap.
pub fn lcm(a: U256, b: U256) -> CalcResult<U256> {
    if a.is_zero() || b.is_zero() {
        return Ok(U256::zero());
    }
    let product = safe_mul(a, b)?;
    Ok(product / gcd(a, b))
}

pub fn is_coprime(a: U256, b: U256) -> bool {
    gcd(a, b) == U256::one()
}

/// Square-and-multiply. Every product goes through a 512-bit `mul_mod`, so
/// moduli close to 2^256 stay exact.
pub fn pow_mod(base: U256, exp: U256, modulus: U256) -> CalcResult<U256> {
    if modulus.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    if modulus == U256::one() {
        return Ok(U256::zero());
    }
    let mut result = U256::one();
    let mut base = base % modulus;
    let mut exp = exp;
    while !exp.is_zero() {
        if exp.bit(0) {
            result = mul_mod(result, base, modulus)?;
        }
        base = mul_mod(base, base, modulus)?;
        exp = exp >> 1usize;
    }
    Ok(result)
}

/// Multiplicative inverse of `a` modulo `modulus`.
/// Fails with DivisionByZero when `a` shares a factor with the modulus.
pub fn mod_inverse(a: U256, modulus: U256) -> CalcResult<U256> {
    if modulus.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    // old_r ≡ old_t·a and r ≡ t·a (mod modulus)
    let (mut old_r, mut r) = (a % modulus, modulus);
    let (mut old_t, mut t) = (U256::one() % modulus, U256::zero());
    while !r.is_zero() {
        let q = old_r / r;
        let next_r = old_r - q * r;
        old_r = r;
        r = next_r;
        let next_t = sub_mod(old_t, mul_mod(q, t, modulus)?, modulus)?;
        old_t = t;
        t = next_t;
    }
    if old_r != U256::one() && modulus != U256::one() {
        return Err(CalcError::DivisionByZero);
    }
    Ok(old_t % modulus)
}

pub fn is_prime(n: U256) -> CalcResult<bool> {
    if n < U256::from(2u64) {
        return Ok(false);
    }
    for &p in &WITNESSES {
        let p = U256::from(p);
        if n == p {
            return Ok(true);
        }
        if (n % p).is_zero() {
            return Ok(false);
        }
    }

    let n_minus_one = n - U256::one();
    let s = n_minus_one.trailing_zeros() as usize;
    let d = n_minus_one >> s;

    'witness: for &a in &WITNESSES {
        let mut x = pow_mod(U256::from(a), d, n)?;
        if x == U256::one() || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = mul_mod(x, x, n)?;
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return Ok(false);
    }
    Ok(true)
}

/// Smallest prime strictly greater than `n`.
pub fn next_prime(n: U256) -> CalcResult<U256> {
    let mut candidate = n;
    for _ in 0..PRIME_SEARCH_WINDOW {
        candidate = safe_add(candidate, U256::one())?;
        if is_prime(candidate)? {
            return Ok(candidate);
        }
    }
    Err(CalcError::MagnitudeBoundExceeded)
}

/// Euler's totient with trial division capped at 100.
///
/// Prime factors above the cap are never removed, so for any `n` with such a
/// factor the result is larger than the true totient (`totient_approx(101)`
/// is 101, not 100). `totient_approx(0) == 0`.
pub fn totient_approx(n: U256) -> U256 {
    let mut result = n;
    let mut m = n;
    if m.is_zero() {
        return U256::zero();
    }
    for p in 2..=TOTIENT_TRIAL_LIMIT {
        let p = U256::from(p);
        if (m % p).is_zero() {
            while (m % p).is_zero() {
                m = m / p;
            }
            result = result - result / p;
        }
    }
    result
}

/// Distinct primes ≤ 100 dividing `n`, ascending.
pub fn small_prime_factors(n: U256) -> CalcResult<Vec<U256>> {
    if n.is_zero() {
        return Err(CalcError::ZeroMagnitude);
    }
    let mut m = n;
    let mut out = Vec::new();
    for p in 2..=TOTIENT_TRIAL_LIMIT {
        let p = U256::from(p);
        if (m % p).is_zero() {
            out.push(p);
            while (m % p).is_zero() {
                m = m / p;
            }
        }
    }
    Ok(out)
}

/// Newton's method from `(n + 1) / 2`, stopping as soon as the next iterate
/// is not strictly smaller than the current one.
pub fn sqrt_floor(n: U256) -> U256 {
    if n.is_zero() {
        return U256::zero();
    }
    // (n + 1) / 2 without overflowing at n == MAX
    let mut x = (n >> 1usize) + (n & U256::one());
    let mut y = average_floor(x, n / x);
    while y < x {
        x = y;
        y = average_floor(x, n / x);
    }
    x
}

pub fn is_perfect_square(n: U256) -> bool {
    let r = sqrt_floor(n);
    r * r == n
}

/// `floor(n^(1/k))` built bit by bit from the top.
pub fn nth_root_floor(n: U256, k: U256) -> CalcResult<U256> {
    if k.is_zero() {
        return Err(CalcError::InvalidArgument);
    }
    if k == U256::one() || n.is_zero() {
        return Ok(n);
    }
    if k >= U256::from(256u64) {
        // any root ≥ 2 raised to ≥ 256 overflows; only 1 survives
        return Ok(U256::one());
    }
    let k = k.low_u64() as usize;
    let top_bit = n.bits() / k + 1;
    let mut root = U256::zero();
    for bit in (0..=top_bit.min(255)).rev() {
        let candidate = root | (U256::one() << bit);
        match candidate.checked_pow(U256::from(k)) {
            Some(p) if p <= n => root = candidate,
            _ => {}
        }
    }
    Ok(root)
}

pub fn cbrt_floor(n: U256) -> U256 {
    // k == 3 never hits an error path
    nth_root_floor(n, U256::from(3u64)).unwrap_or_default()
}

pub fn is_perfect_cube(n: U256) -> bool {
    let r = cbrt_floor(n);
    r * r * r == n
}

/// `floor(sqrt(a * b))`; the product must fit in 256 bits.
pub fn geometric_mean_approx(a: U256, b: U256) -> CalcResult<U256> {
    Ok(sqrt_floor(safe_mul(a, b)?))
}

pub fn log2_floor(n: U256) -> CalcResult<U256> {
    if n.is_zero() {
        return Err(CalcError::ZeroMagnitude);
    }
    Ok(U256::from(n.bits() - 1))
}

pub fn log10_floor(n: U256) -> CalcResult<U256> {
    if n.is_zero() {
        return Err(CalcError::ZeroMagnitude);
    }
    Ok(digit_count(n) - U256::one())
}

fn scan_limit(n: U256) -> CalcResult<u64> {
    if n.is_zero() {
        return Err(CalcError::ZeroMagnitude);
    }
    if n > U256::from(DIVISOR_SCAN_LIMIT) {
        return Err(CalcError::MagnitudeBoundExceeded);
    }
    Ok(n.low_u64())
}

/// Visit every divisor pair `(d, n / d)` with `d ≤ √n`.
fn for_each_divisor(n: u64, mut f: impl FnMut(u64)) {
    let mut d = 1u64;
    while d * d <= n {
        if n % d == 0 {
            f(d);
            if d != n / d {
                f(n / d);
            }
        }
        d += 1;
    }
}

pub fn divisor_count(n: U256) -> CalcResult<U256> {
    let n = scan_limit(n)?;
    let mut count = 0u64;
    for_each_divisor(n, |_| count += 1);
    Ok(U256::from(count))
}

/// σ(n), the sum of all positive divisors including n.
pub fn divisor_sum(n: U256) -> CalcResult<U256> {
    let n = scan_limit(n)?;
    let mut sum = 0u128;
    for_each_divisor(n, |d| sum += u128::from(d));
    Ok(U256::from(sum))
}

pub fn is_perfect_number(n: U256) -> CalcResult<bool> {
    Ok(divisor_sum(n)? == n * U256::from(2u64))
}

/// Steps for the 3n+1 map to reach 1.
pub fn collatz_steps(n: U256) -> CalcResult<U256> {
    if n.is_zero() {
        return Err(CalcError::ZeroMagnitude);
    }
    let mut v = n;
    let mut steps = 0u32;
    while v != U256::one() {
        if steps >= COLLATZ_STEP_LIMIT {
            return Err(CalcError::MagnitudeBoundExceeded);
        }
        v = if v.bit(0) {
            safe_add(safe_mul(v, U256::from(3u64))?, U256::one())?
        } else {
            v >> 1usize
        };
        steps += 1;
    }
    Ok(U256::from(steps))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_gcd_with_zero() {
        assert_eq!(gcd(u(0), u(12)), u(12));
        assert_eq!(gcd(u(12), u(0)), u(12));
        assert_eq!(gcd(u(0), u(0)), u(0));
        assert_eq!(gcd(u(48), u(18)), u(6));
    }

    #[test]
    fn test_lcm() {
        assert_eq!(lcm(u(4), u(6)), Ok(u(12)));
        assert_eq!(lcm(u(0), u(6)), Ok(u(0)));
        assert_eq!(lcm(u(6), u(0)), Ok(u(0)));
        let big = U256::one() << 200usize;
        assert_eq!(lcm(big, big), Err(CalcError::ArithmeticOverflow));
    }

    #[test]
    fn test_pow_mod_small() {
        assert_eq!(pow_mod(u(4), u(13), u(497)), Ok(u(445)));
        assert_eq!(pow_mod(u(2), u(0), u(7)), Ok(u(1)));
        assert_eq!(pow_mod(u(2), u(10), u(1)), Ok(u(0)));
        assert_eq!(pow_mod(u(2), u(10), u(0)), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn test_pow_mod_large_modulus_exact() {
        // Fermat: a^(p-1) ≡ 1 mod p for the largest 256-bit prime 2^256 - 189
        let p = U256::MAX - u(188);
        assert_eq!(pow_mod(u(3), p - u(1), p), Ok(u(1)));
    }

    #[test]
    fn test_mod_inverse() {
        assert_eq!(mod_inverse(u(3), u(11)), Ok(u(4)));
        assert_eq!(mod_inverse(u(10), u(17)), Ok(u(12)));
        assert_eq!(mod_inverse(u(6), u(9)), Err(CalcError::DivisionByZero));
        assert_eq!(mod_inverse(u(5), u(1)), Ok(u(0)));
        assert_eq!(mod_inverse(u(5), u(0)), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn test_is_prime() {
        let primes = [2u64, 3, 5, 37, 41, 97, 7919, 1_000_000_007];
        for p in primes {
            assert_eq!(is_prime(u(p)), Ok(true), "{p} should be prime");
        }
        let composites = [0u64, 1, 4, 9, 561, 1105, 7917, 1_000_000_008];
        for c in composites {
            assert_eq!(is_prime(u(c)), Ok(false), "{c} should be composite");
        }
        assert_eq!(is_prime(U256::MAX - u(188)), Ok(true));
    }

    #[test]
    fn test_next_prime() {
        assert_eq!(next_prime(u(0)), Ok(u(2)));
        assert_eq!(next_prime(u(13)), Ok(u(17)));
        assert_eq!(next_prime(U256::MAX - u(188)), Err(CalcError::ArithmeticOverflow));
    }

    #[test]
    fn test_totient_approx_capped() {
        assert_eq!(totient_approx(u(0)), u(0));
        assert_eq!(totient_approx(u(1)), u(1));
        assert_eq!(totient_approx(u(36)), u(12));
        assert_eq!(totient_approx(u(97)), u(96));
        // 101 is prime but above the trial cap
        assert_eq!(totient_approx(u(101)), u(101));
        assert_eq!(totient_approx(u(202)), u(101));
    }

    #[test]
    fn test_small_prime_factors() {
        assert_eq!(small_prime_factors(u(360)), Ok(vec![u(2), u(3), u(5)]));
        assert_eq!(small_prime_factors(u(101)), Ok(vec![]));
        assert_eq!(small_prime_factors(u(0)), Err(CalcError::ZeroMagnitude));
    }

    #[test]
    fn test_sqrt_floor() {
        for (n, r) in [
            (0u64, 0u64),
            (1, 1),
            (2, 1),
            (3, 1),
            (4, 2),
            (15, 3),
            (16, 4),
            (17, 4),
            (1_000_000, 1000),
        ] {
            assert_eq!(sqrt_floor(u(n)), u(r), "sqrt({n})");
        }
        assert_eq!(sqrt_floor(U256::MAX), (U256::one() << 128usize) - u(1));
    }

    #[test]
    fn test_perfect_square() {
        assert!(is_perfect_square(u(0)));
        assert!(is_perfect_square(u(1)));
        assert!(is_perfect_square(u(144)));
        assert!(!is_perfect_square(u(145)));
        assert!(!is_perfect_square(U256::MAX));
    }

    #[test]
    fn test_roots() {
        assert_eq!(cbrt_floor(u(27)), u(3));
        assert_eq!(cbrt_floor(u(26)), u(2));
        assert!(is_perfect_cube(u(729)));
        assert!(!is_perfect_cube(u(730)));
        assert_eq!(nth_root_floor(u(1024), u(10)), Ok(u(2)));
        assert_eq!(nth_root_floor(u(1024), u(0)), Err(CalcError::InvalidArgument));
        assert_eq!(nth_root_floor(U256::MAX, u(300)), Ok(u(1)));
        assert_eq!(nth_root_floor(U256::MAX, u(2)), Ok(sqrt_floor(U256::MAX)));
    }

    #[test]
    fn test_geometric_mean() {
        assert_eq!(geometric_mean_approx(u(4), u(9)), Ok(u(6)));
        assert_eq!(geometric_mean_approx(u(2), u(3)), Ok(u(2)));
        assert_eq!(geometric_mean_approx(U256::MAX, u(2)), Err(CalcError::ArithmeticOverflow));
    }

    #[test]
    fn test_logs() {
        assert_eq!(log2_floor(u(1)), Ok(u(0)));
        assert_eq!(log2_floor(u(1024)), Ok(u(10)));
        assert_eq!(log2_floor(U256::MAX), Ok(u(255)));
        assert_eq!(log10_floor(u(999)), Ok(u(2)));
        assert_eq!(log10_floor(u(0)), Err(CalcError::ZeroMagnitude));
    }

    #[test]
    fn test_divisors() {
        assert_eq!(divisor_count(u(36)), Ok(u(9)));
        assert_eq!(divisor_sum(u(12)), Ok(u(28)));
        assert_eq!(is_perfect_number(u(28)), Ok(true));
        assert_eq!(is_perfect_number(u(496)), Ok(true));
        assert_eq!(is_perfect_number(u(27)), Ok(false));
        assert_eq!(divisor_count(u(0)), Err(CalcError::ZeroMagnitude));
        assert_eq!(
            divisor_count(u(DIVISOR_SCAN_LIMIT + 1)),
            Err(CalcError::MagnitudeBoundExceeded)
        );
    }

    #[test]
    fn test_collatz() {
        assert_eq!(collatz_steps(u(1)), Ok(u(0)));
        assert_eq!(collatz_steps(u(6)), Ok(u(8)));
        assert_eq!(collatz_steps(u(27)), Ok(u(111)));
        assert_eq!(collatz_steps(u(0)), Err(CalcError::ZeroMagnitude));
    }
}
