//! Small seeded linear congruential generator
//!
//! Only local reproducibility is required: same seed, same sequence.

use serde::{Deserialize, Serialize};

const MULTIPLIER: u32 = 1_103_515_245;
const INCREMENT: u32 = 12_345;
/// Largest value returned by [`TrackRng::next`]
pub const RNG_MAX: u32 = 0x7FFF;

/// Deterministic RNG stream. Each generator call and each AI driver owns one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRng {
    state: u32,
}

impl TrackRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Advance the stream, returning a value in `[0, 32767]`
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        (self.state >> 16) & RNG_MAX
    }

    /// Uniform float in `[0, 1]`
    pub fn next_float(&mut self) -> f32 {
        self.next() as f32 / RNG_MAX as f32
    }

    /// Linear map of [`Self::next_float`] into `[min, max]`.
    ///
    /// `min > max` is not rejected; the result then lies in `[max, min]`.
    pub fn next_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_float() * (max - min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_first_values() {
        let mut rng = TrackRng::new(0);
        // state = 12345 -> 12345 >> 16 = 0
        assert_eq!(rng.next(), 0);
        // state = 12345 * 1103515245 + 12345 (mod 2^32)
        let expected = 12_345u32.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        assert_eq!(rng.next(), (expected >> 16) & RNG_MAX);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = TrackRng::new(42);
        let mut b = TrackRng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn test_float_and_range_bounds() {
        let mut rng = TrackRng::new(7);
        for _ in 0..1000 {
            let f = rng.next_float();
            assert!((0.0..=1.0).contains(&f));
            let r = rng.next_range(15.0, 45.0);
            assert!((15.0..=45.0).contains(&r));
        }
    }

    #[test]
    fn test_degenerate_range_is_constant() {
        let mut rng = TrackRng::new(3);
        assert_eq!(rng.next_range(20.0, 20.0), 20.0);
    }
}
