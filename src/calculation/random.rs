//! Random sources and rounding helpers.
//!
//! Every random draw in the engine goes through a `&mut dyn RngCore` so that
//! callers decide where randomness comes from. Batches hand out one
//! independent generator per employee via [`Entropy`].

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// The granularity every resolved line item is rounded to.
pub const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Where per-employee random generators come from.
///
/// # Example
///
/// ```
/// use rand::Rng;
/// use salary_engine::calculation::Entropy;
///
/// let entropy = Entropy::Seeded(42);
/// let a: u32 = entropy.rng(3).gen_range(0..1000);
/// let b: u32 = entropy.rng(3).gen_range(0..1000);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entropy {
    /// Seed each generator from the operating system.
    #[default]
    Os,
    /// Derive each generator deterministically from a base seed.
    Seeded(u64),
}

impl Entropy {
    /// Creates the generator for one stream (typically the employee index).
    pub fn rng(&self, stream: u64) -> StdRng {
        match self {
            Entropy::Os => StdRng::from_entropy(),
            Entropy::Seeded(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
        }
    }
}

impl From<Option<u64>> for Entropy {
    fn from(seed: Option<u64>) -> Self {
        seed.map_or(Entropy::Os, Entropy::Seeded)
    }
}

/// Rounds to the nearest multiple of 100, half away from zero, floored at 0.
///
/// # Example
///
/// ```
/// use salary_engine::calculation::round_to_hundred;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_to_hundred(Decimal::new(1250, 0)), Decimal::new(1300, 0));
/// assert_eq!(round_to_hundred(Decimal::new(1249, 0)), Decimal::new(1200, 0));
/// assert_eq!(round_to_hundred(Decimal::new(-400, 0)), Decimal::ZERO);
/// ```
pub fn round_to_hundred(value: Decimal) -> Decimal {
    let rounded = (value / HUNDRED).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        * HUNDRED;
    rounded.max(Decimal::ZERO)
}

/// Smallest multiple of 100 that is `>= value`.
pub fn ceil_to_hundred(value: Decimal) -> Decimal {
    (value / HUNDRED).ceil() * HUNDRED
}

/// Largest multiple of 100 that is `<= value`.
pub fn floor_to_hundred(value: Decimal) -> Decimal {
    (value / HUNDRED).floor() * HUNDRED
}

/// Bounds of the multiples of 100 inside `[min, max]`, if there are any.
pub fn hundreds_within(min: Decimal, max: Decimal) -> Option<(Decimal, Decimal)> {
    let low = ceil_to_hundred(min);
    let high = floor_to_hundred(max);
    (low <= high).then_some((low, high))
}

/// Draws a uniformly random multiple of 100 within `[min, max]`.
///
/// Returns `None` when the range contains no multiple of 100.
pub fn random_hundred_within(min: Decimal, max: Decimal, rng: &mut dyn RngCore) -> Option<Decimal> {
    let (low, high) = hundreds_within(min, max)?;
    let steps = ((high - low) / HUNDRED).to_u64()?;
    let pick = rng.gen_range(0..=steps);
    Some(low + Decimal::from(pick) * HUNDRED)
}

/// Generates `n` values in `[-1, 1]` whose mean is zero.
///
/// Uniform draws are centred on their mean and scaled by the largest
/// magnitude, so at least one value is exactly `±1` unless all are equal.
pub fn zero_centred(n: usize, rng: &mut dyn RngCore) -> Vec<Decimal> {
    if n == 0 {
        return Vec::new();
    }

    let draws: Vec<Decimal> = (0..n)
        .map(|_| Decimal::from(rng.gen_range(-1000i64..=1000)))
        .collect();
    let mean = draws.iter().copied().sum::<Decimal>() / Decimal::from(n as u64);
    let centred: Vec<Decimal> = draws.into_iter().map(|d| d - mean).collect();
    let scale = centred.iter().map(|d| d.abs()).max().unwrap_or(Decimal::ZERO);

    if scale.is_zero() {
        return vec![Decimal::ZERO; n];
    }
    centred.into_iter().map(|d| d / scale).collect()
}
