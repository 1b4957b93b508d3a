//! Softmax output and categorical cross-entropy.

use mimic_pipeline::LABEL_LEN;

/// Probabilities are clipped to `[EPSILON, 1 - EPSILON]` before taking the log.
pub const EPSILON: f32 = 1e-7;

/// Numerically stable softmax.
#[must_use]
pub fn softmax(logits: &[f32; LABEL_LEN]) -> [f32; LABEL_LEN] {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp = logits.map(|l| (l - max).exp());
    let sum: f32 = exp.iter().sum();
    exp.map(|e| e / sum)
}

/// `-Σ yᵢ · ln(pᵢ)`.
#[must_use]
pub fn categorical_cross_entropy(target: &[f32; LABEL_LEN], probs: &[f32; LABEL_LEN]) -> f32 {
    target
        .iter()
        .zip(probs)
        .map(|(y, p)| -y * p.clamp(EPSILON, 1.0 - EPSILON).ln())
        .sum()
}

/// Gradient of [`categorical_cross_entropy`] of [`softmax`] with respect to the
/// logits: `pᵢ · Σy - yᵢ`.
///
/// For a one-hot target this is the familiar `p - y`. Multi-hot targets (two
/// keys held) pull the scores of every held direction up, and an all-zero
/// target has no gradient.
#[must_use]
pub fn softmax_cross_entropy_grad(
    target: &[f32; LABEL_LEN],
    probs: &[f32; LABEL_LEN],
) -> [f32; LABEL_LEN] {
    let total: f32 = target.iter().sum();
    std::array::from_fn(|i| probs[i] * total - target[i])
}

/// Index of the largest value; the first one wins ties.
#[must_use]
pub fn argmax(values: &[f32; LABEL_LEN]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
