use primitive_types::U256;

/// Base resonance frequency: 3·6·9 arranged as a number.
pub const BASE: U256 = U256([369, 0, 0, 0]);

pub const TRIAD_A: U256 = U256([3, 0, 0, 0]);
pub const TRIAD_B: U256 = U256([6, 0, 0, 0]);
pub const TRIAD_C: U256 = U256([9, 0, 0, 0]);

/// TRIAD_A + TRIAD_B + TRIAD_C. Construction seeds the phase modulo this.
pub const TRIAD_SUM: U256 = U256([18, 0, 0, 0]);

/// Fixed-point unit: 1.0 == 10^18.
pub const SCALE: U256 = U256([1_000_000_000_000_000_000, 0, 0, 0]);

/// 10^36, the hard ceiling for any magnitude the engine accepts.
pub const MAX_MAGNITUDE: U256 = U256([12_919_594_847_110_692_864, 54_210_108_624_275_221, 0, 0]);

/// One year in seconds.
pub const MAX_PHASE: U256 = U256([365 * 86_400, 0, 0, 0]);

/// Slot indices live in [0, MAX_SLOTS).
pub const MAX_SLOTS: usize = 999;

/// Length cap for product-style reducers.
pub const MAX_OPERANDS: usize = 32;

/// Largest n for which factorial(n) is accepted.
pub const FACTORIAL_LIMIT: u32 = 20;

/// Largest n for which catalan_number(n) is accepted.
pub const CATALAN_LIMIT: u32 = 10;

/// Largest n covered by the partition table.
pub const PARTITION_LIMIT: usize = 25;

/// Trial division bound for totient_approx and small_prime_factors.
pub const TOTIENT_TRIAL_LIMIT: u64 = 100;

/// Largest n accepted by the Stirling/Bell recurrences.
pub const STIRLING_LIMIT: u32 = 128;

/// Largest input scanned by the divisor functions.
pub const DIVISOR_SCAN_LIMIT: u64 = 1_000_000_000_000;

/// Collatz iteration ceiling.
pub const COLLATZ_STEP_LIMIT: u32 = 10_000;

/// Basis points in one whole.
pub const BPS_DENOMINATOR: U256 = U256([10_000, 0, 0, 0]);

/// Preimage of DOMAIN_ID.
pub const DOMAIN_TAG: &str = "ResonanceCalculatorEngine";

/// Preimage of VERSION_ID.
pub const VERSION_TAG: &str = "1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_magnitude_is_ten_pow_36() {
        assert_eq!(MAX_MAGNITUDE, U256::from(10u64).pow(U256::from(36u64)));
    }

    #[test]
    fn test_triad_sum() {
        assert_eq!(TRIAD_A + TRIAD_B + TRIAD_C, TRIAD_SUM);
    }

    #[test]
    fn test_max_phase_is_one_year() {
        assert_eq!(MAX_PHASE, U256::from(31_536_000u64));
    }
}
