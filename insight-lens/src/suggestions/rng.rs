//! Seeded linear-congruential generator used for reproducible variety.
//!
//! The constants are those of the classic glibc `rand()` LCG with a
//! `2^31 - 1` modulus. Changing them changes every suggestion order, so they
//! are fixed.

const MULTIPLIER: u64 = 1_103_515_245;
const INCREMENT: u64 = 12_345;
const MODULUS: u64 = 2_147_483_647;

/// Deterministic pseudo-random source. Not suitable for anything security related.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Negative seeds wrap into `[0, 2^31 - 1)`.
    pub fn new(seed: i64) -> Self {
        Self {
            state: seed.rem_euclid(MODULUS as i64) as u64,
        }
    }

    /// Advances the state and returns it.
    pub fn next_u32(&mut self) -> u32 {
        self.state = (MULTIPLIER * self.state + INCREMENT) % MODULUS;
        self.state as u32
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / MODULUS as f64
    }

    /// Fisher-Yates shuffle walking from the last index down.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = ((self.next_f64() * (i + 1) as f64).floor() as usize).min(i);
            items.swap(i, j);
        }
    }

    /// Weighted draw over `scores` with weight `(score + 1)^2`.
    ///
    /// Returns `None` only for an empty slice. Non-positive weights are never
    /// drawn unless every weight is zero, in which case the first index wins.
    pub fn weighted_index(&mut self, scores: &[f64]) -> Option<usize> {
        if scores.is_empty() {
            return None;
        }

        let weights: Vec<f64> = scores
            .iter()
            .map(|s| {
                let base = (s + 1.0).max(0.0);
                base * base
            })
            .collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return Some(0);
        }

        let target = self.next_f64() * total;
        let mut cumulative = 0.0;
        for (index, weight) in weights.iter().enumerate() {
            cumulative += weight;
            if target < cumulative {
                return Some(index);
            }
        }
        Some(weights.len() - 1)
    }
}

impl Default for SeededRng {
    fn default() -> Self {
        Self::new(0)
    }
}
