//! Attention scoring over cognitive feature vectors

use super::config::AttentionConfig;
use super::features::{Feature, FeatureVector};

/// Weighted-sum scorer mapping a feature vector to a single attention
/// score in [0, 1].
#[derive(Debug, Clone)]
pub struct AttentionScorer {
    weights: [f32; FeatureVector::DIM],
    emergent_boost: f32,
    emergent_threshold: f32,
}

impl AttentionScorer {
    pub fn new(config: &AttentionConfig) -> Self {
        Self {
            weights: config.weights,
            emergent_boost: config.emergent_boost,
            emergent_threshold: config.emergent_threshold,
        }
    }

    /// Score a vector. Deterministic and side-effect-free.
    pub fn score(&self, vector: &FeatureVector) -> f32 {
        let base: f32 = vector
            .values()
            .iter()
            .zip(self.weights.iter())
            .map(|(f, w)| f * w)
            .sum();

        // Boost emergent processes
        let boosted = if vector.get(Feature::Emergent) > self.emergent_threshold {
            base * self.emergent_boost
        } else {
            base
        };

        boosted.clamp(0.0, 1.0)
    }

    pub fn weights(&self) -> &[f32; FeatureVector::DIM] {
        &self.weights
    }
}
