//! Instantaneous transfer rate sampling.
//!
//! The simulator asks a [`RateSampler`] for one rate per tick. The default
//! sampler draws uniformly from a fixed range; a seed makes runs reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_MIN_RATE: f64 = 2.0;
pub const DEFAULT_MAX_RATE: f64 = 12.0;

/// Source of per-tick rates in MB/s.
pub trait RateSampler: Send {
    fn sample(&mut self) -> f64;
}

/// Uniform rate in `[low, high]`.
pub struct UniformRate {
    low: f64,
    high: f64,
    rng: StdRng,
}

impl UniformRate {
    /// Callers validate `0 < low <= high`; see `SimulatorSettings::validate`.
    pub fn new(low: f64, high: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { low, high, rng }
    }

    pub fn range(&self) -> (f64, f64) {
        (self.low, self.high)
    }
}

impl Default for UniformRate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_RATE, DEFAULT_MAX_RATE, None)
    }
}

impl RateSampler for UniformRate {
    fn sample(&mut self) -> f64 {
        if self.high <= self.low {
            return self.low;
        }
        self.rng.gen_range(self.low..=self.high)
    }
}

/// Replays a fixed list of rates, repeating the last one once exhausted.
pub struct ScriptedRates {
    rates: Vec<f64>,
    next: usize,
}

impl ScriptedRates {
    pub fn new(rates: impl Into<Vec<f64>>) -> Self {
        Self {
            rates: rates.into(),
            next: 0,
        }
    }
}

impl RateSampler for ScriptedRates {
    fn sample(&mut self) -> f64 {
        let rate = self
            .rates
            .get(self.next)
            .or_else(|| self.rates.last())
            .copied()
            .unwrap_or(0.0);
        self.next = self.next.saturating_add(1);
        rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_rate_stays_in_range() {
        let mut sampler = UniformRate::new(2.0, 12.0, Some(7));
        for _ in 0..1_000 {
            let rate = sampler.sample();
            assert!((2.0..=12.0).contains(&rate), "rate {rate} out of range");
        }
    }

    #[test]
    fn seeded_samplers_agree() {
        let mut a = UniformRate::new(2.0, 12.0, Some(42));
        let mut b = UniformRate::new(2.0, 12.0, Some(42));
        for _ in 0..16 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn degenerate_range_returns_low() {
        let mut sampler = UniformRate::new(5.0, 5.0, Some(1));
        assert_eq!(sampler.sample(), 5.0);
    }

    #[test]
    fn scripted_rates_repeat_last_value() {
        let mut sampler = ScriptedRates::new(vec![1.0, 2.0]);
        assert_eq!(sampler.sample(), 1.0);
        assert_eq!(sampler.sample(), 2.0);
        assert_eq!(sampler.sample(), 2.0);
        assert_eq!(ScriptedRates::new(Vec::new()).sample(), 0.0);
    }
}
