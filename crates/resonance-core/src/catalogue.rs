//! Name-based dispatch over the pure function catalogue.
//!
//! Scalar functions take a fixed number of arguments. Array reducers take
//! every argument as the array. A few reducers take one leading scalar
//! (threshold, needle, factor, percentile) followed by the array. Parallel
//! reducers split the arguments in half.

use std::fmt;

use primitive_types::U256;

use crate::error::{CalcError, CalcResult};
use crate::{batch, bits, checked, combinatorics, digits, fixed_point, hash, number_theory, triad};

/// What a catalogue function produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    Number(U256),
    Flag(bool),
    /// A wrapped value and its overflow flag (the `full_*` family).
    Pair(U256, bool),
    /// A double-width value split into halves.
    Wide { hi: U256, lo: U256 },
    List(Vec<U256>),
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Number(v) => write!(f, "{v}"),
            Output::Flag(b) => write!(f, "{b}"),
            Output::Pair(v, overflow) => write!(f, "{v} overflow={overflow}"),
            Output::Wide { hi, lo } => write!(f, "hi={hi} lo={lo}"),
            Output::List(vs) => {
                let parts: Vec<String> = vs.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    /// Every argument is one array element.
    Array,
    /// One scalar, then the array.
    ScalarThenArray,
    /// Two equal-length arrays laid end to end.
    Parallel,
}

struct Entry {
    name: &'static str,
    arity: Arity,
    call: fn(&[U256]) -> CalcResult<Output>,
}

fn number(r: CalcResult<U256>) -> CalcResult<Output> {
    r.map(Output::Number)
}

fn value(v: U256) -> CalcResult<Output> {
    Ok(Output::Number(v))
}

fn flag(r: CalcResult<bool>) -> CalcResult<Output> {
    r.map(Output::Flag)
}

fn truth(b: bool) -> CalcResult<Output> {
    Ok(Output::Flag(b))
}

fn list(r: CalcResult<Vec<U256>>) -> CalcResult<Output> {
    r.map(Output::List)
}

fn pair((v, overflow): (U256, bool)) -> CalcResult<Output> {
    Ok(Output::Pair(v, overflow))
}

fn wide((hi, lo): (U256, U256)) -> CalcResult<Output> {
    Ok(Output::Wide { hi, lo })
}

fn halves(args: &[U256]) -> (&[U256], &[U256]) {
    args.split_at(args.len() / 2)
}

use Arity::{Array, Fixed, Parallel, ScalarThenArray};

static ENTRIES: &[Entry] = &[
    // checked primitives
    Entry {
        name: "safe_add",
        arity: Fixed(2),
        call: |a| number(checked::safe_add(a[0], a[1])),
    },
    Entry {
        name: "safe_add3",
        arity: Fixed(3),
        call: |a| number(checked::safe_add3(a[0], a[1], a[2])),
    },
    Entry {
        name: "safe_sub",
        arity: Fixed(2),
        call: |a| number(checked::safe_sub(a[0], a[1])),
    },
    Entry {
        name: "safe_mul",
        arity: Fixed(2),
        call: |a| number(checked::safe_mul(a[0], a[1])),
    },
    Entry {
        name: "safe_div",
        arity: Fixed(2),
        call: |a| number(checked::safe_div(a[0], a[1])),
    },
    Entry {
        name: "safe_mod",
        arity: Fixed(2),
        call: |a| number(checked::safe_mod(a[0], a[1])),
    },
    Entry {
        name: "safe_pow",
        arity: Fixed(2),
        call: |a| number(checked::safe_pow(a[0], a[1])),
    },
    Entry {
        name: "mul_div",
        arity: Fixed(3),
        call: |a| number(checked::mul_div(a[0], a[1], a[2])),
    },
    Entry {
        name: "mul_div_up",
        arity: Fixed(3),
        call: |a| number(checked::mul_div_up(a[0], a[1], a[2])),
    },
    Entry {
        name: "mul_mod",
        arity: Fixed(3),
        call: |a| number(checked::mul_mod(a[0], a[1], a[2])),
    },
    Entry {
        name: "add_mod",
        arity: Fixed(3),
        call: |a| number(checked::add_mod(a[0], a[1], a[2])),
    },
    Entry {
        name: "sub_mod",
        arity: Fixed(3),
        call: |a| number(checked::sub_mod(a[0], a[1], a[2])),
    },
    Entry {
        name: "ceil_div",
        arity: Fixed(2),
        call: |a| number(checked::ceil_div(a[0], a[1])),
    },
    Entry {
        name: "abs_diff",
        arity: Fixed(2),
        call: |a| value(checked::abs_diff(a[0], a[1])),
    },
    Entry {
        name: "average_floor",
        arity: Fixed(2),
        call: |a| value(checked::average_floor(a[0], a[1])),
    },
    Entry {
        name: "clamp",
        arity: Fixed(3),
        call: |a| number(checked::clamp(a[0], a[1], a[2])),
    },
    Entry {
        name: "min",
        arity: Fixed(2),
        call: |a| value(checked::min(a[0], a[1])),
    },
    Entry {
        name: "max",
        arity: Fixed(2),
        call: |a| value(checked::max(a[0], a[1])),
    },
    Entry {
        name: "is_even",
        arity: Fixed(1),
        call: |a| truth(checked::is_even(a[0])),
    },
    Entry {
        name: "is_odd",
        arity: Fixed(1),
        call: |a| truth(checked::is_odd(a[0])),
    },
    Entry {
        name: "is_within_bound",
        arity: Fixed(2),
        call: |a| truth(checked::is_within_bound(a[0], a[1])),
    },
    // digits
    Entry {
        name: "digit_sum",
        arity: Fixed(1),
        call: |a| value(digits::digit_sum(a[0])),
    },
    Entry {
        name: "digital_root",
        arity: Fixed(1),
        call: |a| value(digits::digital_root(a[0])),
    },
    Entry {
        name: "is_triad_resonant",
        arity: Fixed(1),
        call: |a| truth(digits::is_triad_resonant(a[0])),
    },
    Entry {
        name: "digit_count",
        arity: Fixed(1),
        call: |a| value(digits::digit_count(a[0])),
    },
    Entry {
        name: "digit_product",
        arity: Fixed(1),
        call: |a| value(digits::digit_product(a[0])),
    },
    Entry {
        name: "nth_digit",
        arity: Fixed(2),
        call: |a| value(digits::nth_digit(a[0], a[1])),
    },
    Entry {
        name: "leading_digit",
        arity: Fixed(1),
        call: |a| value(digits::leading_digit(a[0])),
    },
    Entry {
        name: "reverse_digits",
        arity: Fixed(1),
        call: |a| number(digits::reverse_digits(a[0])),
    },
    Entry {
        name: "is_palindrome",
        arity: Fixed(1),
        call: |a| truth(digits::is_palindrome(a[0])),
    },
    Entry {
        name: "is_harshad",
        arity: Fixed(1),
        call: |a| flag(digits::is_harshad(a[0])),
    },
    Entry {
        name: "is_armstrong",
        arity: Fixed(1),
        call: |a| flag(digits::is_armstrong(a[0])),
    },
    Entry {
        name: "digit_frequency",
        arity: Fixed(2),
        call: |a| number(digits::digit_frequency(a[0], a[1])),
    },
    Entry {
        name: "contains_digit",
        arity: Fixed(2),
        call: |a| flag(digits::contains_digit(a[0], a[1])),
    },
    Entry {
        name: "is_triad_digit",
        arity: Fixed(1),
        call: |a| truth(digits::is_triad_digit(a[0])),
    },
    Entry {
        name: "triad_digit_count",
        arity: Fixed(1),
        call: |a| value(digits::triad_digit_count(a[0])),
    },
    Entry {
        name: "additive_persistence",
        arity: Fixed(1),
        call: |a| value(digits::additive_persistence(a[0])),
    },
    Entry {
        name: "multiplicative_persistence",
        arity: Fixed(1),
        call: |a| value(digits::multiplicative_persistence(a[0])),
    },
    Entry {
        name: "squared_digit_sum",
        arity: Fixed(1),
        call: |a| value(digits::squared_digit_sum(a[0])),
    },
    Entry {
        name: "is_happy",
        arity: Fixed(1),
        call: |a| truth(digits::is_happy(a[0])),
    },
    Entry {
        name: "concat_numbers",
        arity: Fixed(2),
        call: |a| number(digits::concat_numbers(a[0], a[1])),
    },
    Entry {
        name: "to_base_digits",
        arity: Fixed(2),
        call: |a| list(digits::to_base_digits(a[0], a[1])),
    },
    Entry {
        name: "digit_sum_in_base",
        arity: Fixed(2),
        call: |a| number(digits::digit_sum_in_base(a[0], a[1])),
    },
    Entry {
        name: "is_repdigit",
        arity: Fixed(1),
        call: |a| truth(digits::is_repdigit(a[0])),
    },
    // number theory
    Entry {
        name: "gcd",
        arity: Fixed(2),
        call: |a| value(number_theory::gcd(a[0], a[1])),
    },
    Entry {
        name: "lcm",
        arity: Fixed(2),
        call: |a| number(number_theory::lcm(a[0], a[1])),
    },
    Entry {
        name: "is_coprime",
        arity: Fixed(2),
        call: |a| truth(number_theory::is_coprime(a[0], a[1])),
    },
    Entry {
        name: "pow_mod",
        arity: Fixed(3),
        call: |a| number(number_theory::pow_mod(a[0], a[1], a[2])),
    },
    Entry {
        name: "mod_inverse",
        arity: Fixed(2),
        call: |a| number(number_theory::mod_inverse(a[0], a[1])),
    },
    Entry {
        name: "is_prime",
        arity: Fixed(1),
        call: |a| flag(number_theory::is_prime(a[0])),
    },
    Entry {
        name: "next_prime",
        arity: Fixed(1),
        call: |a| number(number_theory::next_prime(a[0])),
    },
    Entry {
        name: "totient_approx",
        arity: Fixed(1),
        call: |a| value(number_theory::totient_approx(a[0])),
    },
    Entry {
        name: "small_prime_factors",
        arity: Fixed(1),
        call: |a| list(number_theory::small_prime_factors(a[0])),
    },
    Entry {
        name: "sqrt_floor",
        arity: Fixed(1),
        call: |a| value(number_theory::sqrt_floor(a[0])),
    },
    Entry {
        name: "is_perfect_square",
        arity: Fixed(1),
        call: |a| truth(number_theory::is_perfect_square(a[0])),
    },
    Entry {
        name: "nth_root_floor",
        arity: Fixed(2),
        call: |a| number(number_theory::nth_root_floor(a[0], a[1])),
    },
    Entry {
        name: "cbrt_floor",
        arity: Fixed(1),
        call: |a| value(number_theory::cbrt_floor(a[0])),
    },
    Entry {
        name: "is_perfect_cube",
        arity: Fixed(1),
        call: |a| truth(number_theory::is_perfect_cube(a[0])),
    },
    Entry {
        name: "geometric_mean_approx",
        arity: Fixed(2),
        call: |a| number(number_theory::geometric_mean_approx(a[0], a[1])),
    },
    Entry {
        name: "log2_floor",
        arity: Fixed(1),
        call: |a| number(number_theory::log2_floor(a[0])),
    },
    Entry {
        name: "log10_floor",
        arity: Fixed(1),
        call: |a| number(number_theory::log10_floor(a[0])),
    },
    Entry {
        name: "divisor_count",
        arity: Fixed(1),
        call: |a| number(number_theory::divisor_count(a[0])),
    },
    Entry {
        name: "divisor_sum",
        arity: Fixed(1),
        call: |a| number(number_theory::divisor_sum(a[0])),
    },
    Entry {
        name: "is_perfect_number",
        arity: Fixed(1),
        call: |a| flag(number_theory::is_perfect_number(a[0])),
    },
    Entry {
        name: "collatz_steps",
        arity: Fixed(1),
        call: |a| number(number_theory::collatz_steps(a[0])),
    },
    // combinatorics and figurate numbers
    Entry {
        name: "factorial",
        arity: Fixed(1),
        call: |a| number(combinatorics::factorial(a[0])),
    },
    Entry {
        name: "double_factorial",
        arity: Fixed(1),
        call: |a| number(combinatorics::double_factorial(a[0])),
    },
    Entry {
        name: "binomial_coeff",
        arity: Fixed(2),
        call: |a| number(combinatorics::binomial_coeff(a[0], a[1])),
    },
    Entry {
        name: "permutations",
        arity: Fixed(2),
        call: |a| number(combinatorics::permutations(a[0], a[1])),
    },
    Entry {
        name: "catalan_number",
        arity: Fixed(1),
        call: |a| number(combinatorics::catalan_number(a[0])),
    },
    Entry {
        name: "stirling_second",
        arity: Fixed(2),
        call: |a| number(combinatorics::stirling_second(a[0], a[1])),
    },
    Entry {
        name: "bell_number",
        arity: Fixed(1),
        call: |a| number(combinatorics::bell_number(a[0])),
    },
    Entry {
        name: "derangements",
        arity: Fixed(1),
        call: |a| number(combinatorics::derangements(a[0])),
    },
    Entry {
        name: "euler_partition",
        arity: Fixed(1),
        call: |a| number(combinatorics::euler_partition(a[0])),
    },
    Entry {
        name: "fibonacci",
        arity: Fixed(1),
        call: |a| number(combinatorics::fibonacci(a[0])),
    },
    Entry {
        name: "lucas",
        arity: Fixed(1),
        call: |a| number(combinatorics::lucas(a[0])),
    },
    Entry {
        name: "tribonacci",
        arity: Fixed(1),
        call: |a| number(combinatorics::tribonacci(a[0])),
    },
    Entry {
        name: "triangular",
        arity: Fixed(1),
        call: |a| number(combinatorics::triangular(a[0])),
    },
    Entry {
        name: "is_triangular",
        arity: Fixed(1),
        call: |a| flag(combinatorics::is_triangular(a[0])),
    },
    Entry {
        name: "polygonal",
        arity: Fixed(2),
        call: |a| number(combinatorics::polygonal(a[0], a[1])),
    },
    Entry {
        name: "pentagonal",
        arity: Fixed(1),
        call: |a| number(combinatorics::pentagonal(a[0])),
    },
    Entry {
        name: "hexagonal",
        arity: Fixed(1),
        call: |a| number(combinatorics::hexagonal(a[0])),
    },
    Entry {
        name: "tetrahedral",
        arity: Fixed(1),
        call: |a| number(combinatorics::tetrahedral(a[0])),
    },
    Entry {
        name: "square_pyramidal",
        arity: Fixed(1),
        call: |a| number(combinatorics::square_pyramidal(a[0])),
    },
    Entry {
        name: "sum_of_cubes",
        arity: Fixed(1),
        call: |a| number(combinatorics::sum_of_cubes(a[0])),
    },
    Entry {
        name: "arithmetic_series",
        arity: Fixed(3),
        call: |a| number(combinatorics::arithmetic_series(a[0], a[1], a[2])),
    },
    Entry {
        name: "geometric_series",
        arity: Fixed(3),
        call: |a| number(combinatorics::geometric_series(a[0], a[1], a[2])),
    },
    // fixed point
    Entry {
        name: "to_scaled",
        arity: Fixed(1),
        call: |a| number(fixed_point::to_scaled(a[0])),
    },
    Entry {
        name: "from_scaled",
        arity: Fixed(1),
        call: |a| value(fixed_point::from_scaled(a[0])),
    },
    Entry {
        name: "scaled_mul",
        arity: Fixed(2),
        call: |a| number(fixed_point::scaled_mul(a[0], a[1])),
    },
    Entry {
        name: "scaled_div",
        arity: Fixed(2),
        call: |a| number(fixed_point::scaled_div(a[0], a[1])),
    },
    Entry {
        name: "scaled_pow",
        arity: Fixed(2),
        call: |a| number(fixed_point::scaled_pow(a[0], a[1])),
    },
    Entry {
        name: "scaled_sqrt",
        arity: Fixed(1),
        call: |a| number(fixed_point::scaled_sqrt(a[0])),
    },
    Entry {
        name: "scaled_reciprocal",
        arity: Fixed(1),
        call: |a| number(fixed_point::scaled_reciprocal(a[0])),
    },
    Entry {
        name: "scaled_lerp",
        arity: Fixed(3),
        call: |a| number(fixed_point::scaled_lerp(a[0], a[1], a[2])),
    },
    Entry {
        name: "apply_bps",
        arity: Fixed(2),
        call: |a| number(fixed_point::apply_bps(a[0], a[1])),
    },
    Entry {
        name: "scale_by_base",
        arity: Fixed(1),
        call: |a| number(fixed_point::scale_by_base(a[0])),
    },
    Entry {
        name: "wrap_magnitude",
        arity: Fixed(1),
        call: |a| value(fixed_point::wrap_magnitude(a[0])),
    },
    // bits
    Entry {
        name: "popcount",
        arity: Fixed(1),
        call: |a| value(bits::popcount(a[0])),
    },
    Entry {
        name: "parity",
        arity: Fixed(1),
        call: |a| truth(bits::parity(a[0])),
    },
    Entry {
        name: "is_power_of_two",
        arity: Fixed(1),
        call: |a| truth(bits::is_power_of_two(a[0])),
    },
    Entry {
        name: "next_power_of_two",
        arity: Fixed(1),
        call: |a| number(bits::next_power_of_two(a[0])),
    },
    Entry {
        name: "prev_power_of_two",
        arity: Fixed(1),
        call: |a| number(bits::prev_power_of_two(a[0])),
    },
    Entry {
        name: "bit_length",
        arity: Fixed(1),
        call: |a| value(bits::bit_length(a[0])),
    },
    Entry {
        name: "leading_zeros",
        arity: Fixed(1),
        call: |a| value(bits::leading_zeros(a[0])),
    },
    Entry {
        name: "trailing_zeros",
        arity: Fixed(1),
        call: |a| value(bits::trailing_zeros(a[0])),
    },
    Entry {
        name: "rotate_left",
        arity: Fixed(2),
        call: |a| value(bits::rotate_left(a[0], a[1])),
    },
    Entry {
        name: "rotate_right",
        arity: Fixed(2),
        call: |a| value(bits::rotate_right(a[0], a[1])),
    },
    Entry {
        name: "reverse_bits",
        arity: Fixed(1),
        call: |a| value(bits::reverse_bits(a[0])),
    },
    Entry {
        name: "test_bit",
        arity: Fixed(2),
        call: |a| flag(bits::test_bit(a[0], a[1])),
    },
    Entry {
        name: "set_bit",
        arity: Fixed(2),
        call: |a| number(bits::set_bit(a[0], a[1])),
    },
    Entry {
        name: "clear_bit",
        arity: Fixed(2),
        call: |a| number(bits::clear_bit(a[0], a[1])),
    },
    Entry {
        name: "toggle_bit",
        arity: Fixed(2),
        call: |a| number(bits::toggle_bit(a[0], a[1])),
    },
    Entry {
        name: "lowest_set_bit",
        arity: Fixed(1),
        call: |a| value(bits::lowest_set_bit(a[0])),
    },
    Entry {
        name: "gray_encode",
        arity: Fixed(1),
        call: |a| value(bits::gray_encode(a[0])),
    },
    Entry {
        name: "gray_decode",
        arity: Fixed(1),
        call: |a| value(bits::gray_decode(a[0])),
    },
    Entry {
        name: "byte_at",
        arity: Fixed(2),
        call: |a| number(bits::byte_at(a[0], a[1])),
    },
    Entry {
        name: "full_add",
        arity: Fixed(2),
        call: |a| pair(bits::full_add(a[0], a[1])),
    },
    Entry {
        name: "full_sub",
        arity: Fixed(2),
        call: |a| pair(bits::full_sub(a[0], a[1])),
    },
    Entry {
        name: "full_mul",
        arity: Fixed(2),
        call: |a| pair(bits::full_mul(a[0], a[1])),
    },
    Entry {
        name: "full_mul_wide",
        arity: Fixed(2),
        call: |a| wide(bits::full_mul_wide(a[0], a[1])),
    },
    // triad
    Entry {
        name: "verify_triad",
        arity: Fixed(3),
        call: |a| truth(triad::verify_triad(a[0], a[1], a[2])),
    },
    Entry {
        name: "triad_sum",
        arity: Fixed(3),
        call: |a| number(triad::triad_sum(a[0], a[1], a[2])),
    },
    Entry {
        name: "resolve_triad_value",
        arity: Fixed(3),
        call: |a| list(triad::resolve_triad_value(a[0], a[1], a[2]).map(|(s, r)| vec![s, r])),
    },
    Entry {
        name: "is_triad_value",
        arity: Fixed(1),
        call: |a| truth(triad::is_triad_value(a[0])),
    },
    Entry {
        name: "triad_class",
        arity: Fixed(1),
        call: |a| value(triad::triad_class(a[0])),
    },
    Entry {
        name: "vortex_position",
        arity: Fixed(1),
        call: |a| value(triad::vortex_position(a[0])),
    },
    Entry {
        name: "is_base_aligned",
        arity: Fixed(1),
        call: |a| truth(triad::is_base_aligned(a[0])),
    },
    Entry {
        name: "base_multiple",
        arity: Fixed(1),
        call: |a| number(triad::base_multiple(a[0])),
    },
    Entry {
        name: "harmonic_of",
        arity: Fixed(2),
        call: |a| number(triad::harmonic_of(a[0], a[1])),
    },
    Entry {
        name: "phase_alignment",
        arity: Fixed(1),
        call: |a| value(triad::phase_alignment(a[0])),
    },
    Entry {
        name: "flux_value",
        arity: Fixed(2),
        call: |a| number(triad::flux_value(a[0], a[1])),
    },
    Entry {
        name: "super_calc_value",
        arity: Array,
        call: |a| number(triad::super_calc_value(a)),
    },
    // batch reducers
    Entry {
        name: "sum_array",
        arity: Array,
        call: |a| number(batch::sum_array(a)),
    },
    Entry {
        name: "product_array",
        arity: Array,
        call: |a| number(batch::product_array(a)),
    },
    Entry {
        name: "min_array",
        arity: Array,
        call: |a| number(batch::min_array(a)),
    },
    Entry {
        name: "max_array",
        arity: Array,
        call: |a| number(batch::max_array(a)),
    },
    Entry {
        name: "range_array",
        arity: Array,
        call: |a| number(batch::range_array(a)),
    },
    Entry {
        name: "argmin",
        arity: Array,
        call: |a| number(batch::argmin(a)),
    },
    Entry {
        name: "argmax",
        arity: Array,
        call: |a| number(batch::argmax(a)),
    },
    Entry {
        name: "gcd_batch",
        arity: Array,
        call: |a| number(batch::gcd_batch(a)),
    },
    Entry {
        name: "lcm_batch",
        arity: Array,
        call: |a| number(batch::lcm_batch(a)),
    },
    Entry {
        name: "xor_all",
        arity: Array,
        call: |a| number(batch::xor_all(a)),
    },
    Entry {
        name: "and_all",
        arity: Array,
        call: |a| number(batch::and_all(a)),
    },
    Entry {
        name: "or_all",
        arity: Array,
        call: |a| number(batch::or_all(a)),
    },
    Entry {
        name: "mean",
        arity: Array,
        call: |a| number(batch::mean(a)),
    },
    Entry {
        name: "median",
        arity: Array,
        call: |a| number(batch::median(a)),
    },
    Entry {
        name: "percentile_approx",
        arity: ScalarThenArray,
        call: |a| number(batch::percentile_approx(&a[1..], a[0])),
    },
    Entry {
        name: "variance",
        arity: Array,
        call: |a| number(batch::variance(a)),
    },
    Entry {
        name: "std_dev_approx",
        arity: Array,
        call: |a| number(batch::std_dev_approx(a)),
    },
    Entry {
        name: "mode",
        arity: Array,
        call: |a| number(batch::mode(a)),
    },
    Entry {
        name: "distinct_count",
        arity: Array,
        call: |a| number(batch::distinct_count(a)),
    },
    Entry {
        name: "count_resonant",
        arity: Array,
        call: |a| number(batch::count_resonant(a)),
    },
    Entry {
        name: "count_above",
        arity: ScalarThenArray,
        call: |a| number(batch::count_above(&a[1..], a[0])),
    },
    Entry {
        name: "contains_value",
        arity: ScalarThenArray,
        call: |a| flag(batch::contains_value(&a[1..], a[0])),
    },
    Entry {
        name: "is_sorted",
        arity: Array,
        call: |a| flag(batch::is_sorted(a)),
    },
    Entry {
        name: "sum_of_squares_array",
        arity: Array,
        call: |a| number(batch::sum_of_squares_array(a)),
    },
    Entry {
        name: "add_arrays",
        arity: Parallel,
        call: |a| { let (x, y) = halves(a); list(batch::add_arrays(x, y)) },
    },
    Entry {
        name: "sub_arrays",
        arity: Parallel,
        call: |a| { let (x, y) = halves(a); list(batch::sub_arrays(x, y)) },
    },
    Entry {
        name: "mul_arrays",
        arity: Parallel,
        call: |a| { let (x, y) = halves(a); list(batch::mul_arrays(x, y)) },
    },
    Entry {
        name: "dot_product",
        arity: Parallel,
        call: |a| { let (x, y) = halves(a); number(batch::dot_product(x, y)) },
    },
    Entry {
        name: "weighted_mean",
        arity: Parallel,
        call: |a| { let (x, y) = halves(a); number(batch::weighted_mean(x, y)) },
    },
    Entry {
        name: "cumulative_sum",
        arity: Array,
        call: |a| list(batch::cumulative_sum(a)),
    },
    Entry {
        name: "scale_array",
        arity: ScalarThenArray,
        call: |a| list(batch::scale_array(&a[1..], a[0])),
    },
    Entry {
        name: "digital_root_batch",
        arity: Array,
        call: |a| list(batch::digital_root_batch(a)),
    },
    Entry {
        name: "digit_sum_batch",
        arity: Array,
        call: |a| list(batch::digit_sum_batch(a)),
    },
    // encoding and hashing
    Entry {
        name: "hash_value",
        arity: Fixed(1),
        call: |a| value(hash::hash_value(a[0])),
    },
    Entry {
        name: "hash_pair",
        arity: Fixed(2),
        call: |a| value(hash::hash_pair(a[0], a[1])),
    },
    Entry {
        name: "pack_halves",
        arity: Fixed(2),
        call: |a| number(hash::pack_halves(a[0], a[1])),
    },
    Entry {
        name: "unpack_halves",
        arity: Fixed(1),
        call: |a| wide(hash::unpack_halves(a[0])),
    },
    Entry {
        name: "domain_id",
        arity: Fixed(0),
        call: |_| value(hash::domain_id()),
    },
    Entry {
        name: "version_id",
        arity: Fixed(0),
        call: |_| value(hash::version_id()),
    },
];

fn lookup(name: &str) -> CalcResult<&'static Entry> {
    ENTRIES
        .iter()
        .find(|e| e.name == name)
        .ok_or(CalcError::UnknownFunction)
}

/// Evaluate a catalogue function by its snake_case name.
pub fn evaluate(name: &str, args: &[U256]) -> CalcResult<Output> {
    let entry = lookup(name)?;
    match entry.arity {
        Fixed(n) if args.len() != n => return Err(CalcError::InvalidArgument),
        ScalarThenArray if args.is_empty() => return Err(CalcError::InvalidArgument),
        Parallel if args.len() % 2 != 0 => return Err(CalcError::ArrayLengthMismatch),
        _ => {}
    }
    (entry.call)(args)
}

pub fn arity(name: &str) -> CalcResult<Arity> {
    lookup(name).map(|e| e.arity)
}

/// Every registered function name, in registration order.
pub fn names() -> impl Iterator<Item = &'static str> {
    ENTRIES.iter().map(|e| e.name)
}
