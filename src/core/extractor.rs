//! Feature extraction from host runtime signals

use super::config::AttentionConfig;
use super::features::{Feature, FeatureVector, RuntimeStats};

/// Maps runtime stats onto the cognitive feature dimensions.
///
/// Extraction is a pure computation; the allocator decides when a
/// refresh actually happens (a tick must have elapsed).
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    recency_ticks: u64,
    interactive_baseline: f32,
    memory_placeholder: f32,
}

impl FeatureExtractor {
    pub fn new(config: &AttentionConfig) -> Self {
        Self {
            recency_ticks: config.recency_ticks,
            interactive_baseline: config.interactive_baseline,
            memory_placeholder: config.memory_placeholder,
        }
    }

    /// Derive a fresh vector from defaults.
    pub fn sample(&self, stats: &RuntimeStats, now: u64, last_refresh: u64) -> FeatureVector {
        let mut vector = FeatureVector::new();
        self.refresh_into(&mut vector, stats, now, last_refresh);
        vector
    }

    /// Update the sampled dimensions of an existing vector in place.
    ///
    /// Dimensions the stats collaborator did not supply keep their current
    /// value, so manual overrides and external signals persist across
    /// refresh cycles. The emergent dimension is never sampled.
    pub fn refresh_into(
        &self,
        vector: &mut FeatureVector,
        stats: &RuntimeStats,
        now: u64,
        last_refresh: u64,
    ) {
        vector.set(Feature::Load, stats.cpu);

        // Recent activity = interactive
        let delta = now.saturating_sub(last_refresh);
        let interactive = if delta < self.recency_ticks {
            1.0
        } else {
            self.interactive_baseline
        };
        vector.set(Feature::Interactive, interactive);

        let memory = stats.memory.unwrap_or(self.memory_placeholder);
        vector.set(Feature::Memory, memory);

        if let Some(io) = stats.io {
            vector.set(Feature::Io, io);
        }
        if let Some(network) = stats.network {
            vector.set(Feature::Network, network);
        }
        if let Some(realtime) = stats.realtime {
            vector.set(Feature::Realtime, if realtime { 1.0 } else { 0.0 });
        }

        let priority = if stats.max_priority > 0 {
            stats.priority as f32 / stats.max_priority as f32
        } else {
            0.0
        };
        vector.set(Feature::Priority, priority);
    }
}
