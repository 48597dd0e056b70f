//! Small numeric helpers shared by sequence generation and radix sort.

use rand::Rng;

/// Uniform integer in `[min, max)`. An empty range yields `min`.
pub fn random_value<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..max)
}

/// Decimal digit of `n` at `place` (0 = least significant), or 0 past the last digit.
pub fn digit_at(n: u32, place: u32) -> u32 {
    match 10u32.checked_pow(place) {
        Some(div) => (n / div) % 10,
        None => 0,
    }
}

/// Number of decimal digits in `n`; zero counts as one digit.
pub fn value_digit_count(n: u32) -> u32 {
    n.checked_ilog10().map_or(1, |d| d + 1)
}

/// Largest digit count across `values`, 0 for an empty slice.
pub fn digit_count(values: &[u32]) -> u32 {
    values
        .iter()
        .map(|&v| value_digit_count(v))
        .max()
        .unwrap_or(0)
}
