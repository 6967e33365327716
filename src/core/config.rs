//! Configuration for the attention scheduling layer

use serde::{Deserialize, Serialize};

use super::features::FeatureVector;

/// Main attention allocator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttentionConfig {
    /// Per-dimension scoring weights (load, memory, io, interactive,
    /// realtime, network, priority, emergent)
    pub weights: [f32; FeatureVector::DIM],

    /// Multiplier applied when the emergent dimension is dominant
    pub emergent_boost: f32,

    /// Emergent value above which the boost applies
    pub emergent_threshold: f32,

    /// Number of attention queues
    pub bucket_count: usize,

    /// Maximum number of tracked processes
    pub max_procs: usize,

    /// Tensor time-window depth (slots of rolling history)
    pub time_window: usize,

    /// Ticks since last refresh below which a process counts as interactive
    pub recency_ticks: u64,

    /// Interactive baseline for processes outside the recency window
    pub interactive_baseline: f32,

    /// Memory dimension placeholder when no memory signal is supplied
    pub memory_placeholder: f32,

    /// Base attention budget units
    pub total_attention: u64,
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            weights: [0.20, 0.15, 0.10, 0.25, 0.15, 0.05, 0.05, 0.05],
            emergent_boost: 1.2,
            emergent_threshold: 0.5,
            bucket_count: 4,
            max_procs: 256,
            time_window: 32,
            recency_ticks: 10,
            interactive_baseline: 0.1,
            memory_placeholder: 0.5,
            total_attention: 1000,
        }
    }
}

impl AttentionConfig {
    /// Load config from TOML file
    pub fn load(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save(&self, path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check structural constraints the allocator relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.bucket_count == 0 {
            return Err("bucket_count must be at least 1".into());
        }
        if self.max_procs == 0 {
            return Err("max_procs must be at least 1".into());
        }
        if self.time_window == 0 {
            return Err("time_window must be at least 1".into());
        }
        if self.weights.iter().any(|w| *w < 0.0) {
            return Err("weights must be non-negative".into());
        }
        if self.emergent_boost < 1.0 {
            return Err("emergent_boost must be at least 1.0".into());
        }
        if !(0.0..=1.0).contains(&self.emergent_threshold) {
            return Err("emergent_threshold must be within [0, 1]".into());
        }
        Ok(())
    }
}
