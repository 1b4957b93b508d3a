//! Parameter initialization.
//!
//! # Glorot-Normal Initialization
//!
//! Weights of a dense layer with `fan_in` inputs and `fan_out` outputs are
//! drawn from `N(0, σ²)` with
//!
//! ```text
//! σ = sqrt(2 / (fan_in + fan_out))
//! ```
//!
//! which keeps the variance of the logits close to that of the inputs.
//! The pooled features lie in `[-1, 1]`, so the initial logits are small and
//! the initial scores close to uniform.

use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_pcg::Pcg64Mcg;

/// Standard deviation of the Glorot-normal distribution.
#[must_use]
pub fn glorot_std(fan_in: usize, fan_out: usize) -> f32 {
    #[expect(clippy::cast_precision_loss)]
    let fans = (fan_in + fan_out).max(1) as f32;
    (2.0 / fans).sqrt()
}

/// Draws a `fan_out × fan_in` weight matrix, row-major.
pub fn glorot_normal<R>(rng: &mut R, fan_in: usize, fan_out: usize) -> Vec<f32>
where
    R: Rng + ?Sized,
{
    let std = glorot_std(fan_in, fan_out);
    (0..fan_in * fan_out)
        .map(|_| rng.sample::<f32, _>(StandardNormal) * std)
        .collect()
}

/// Seeded generator used for model initialization.
#[must_use]
pub fn seeded_rng(seed: u64) -> Pcg64Mcg {
    Pcg64Mcg::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_weights() {
        let a = glorot_normal(&mut seeded_rng(3), 10, 4);
        let b = glorot_normal(&mut seeded_rng(3), 10, 4);
        let c = glorot_normal(&mut seeded_rng(4), 10, 4);
        assert_eq!(a.len(), 40);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_spread_matches_glorot_std() {
        let fan_in = 1000;
        let fan_out = 4;
        let weights = glorot_normal(&mut seeded_rng(0), fan_in, fan_out);
        #[expect(clippy::cast_precision_loss)]
        let n = weights.len() as f32;
        let mean = weights.iter().sum::<f32>() / n;
        let var = weights.iter().map(|w| (w - mean).powi(2)).sum::<f32>() / n;

        let expected = glorot_std(fan_in, fan_out);
        assert!(mean.abs() < 0.01);
        assert!((var.sqrt() - expected).abs() / expected < 0.1);
    }
}
