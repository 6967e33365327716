//! Core scoring pipeline: configuration, feature model, extraction, scoring

pub mod config;
pub mod extractor;
pub mod features;
pub mod scorer;

pub use config::AttentionConfig;
pub use extractor::FeatureExtractor;
pub use features::{Feature, FeatureVector, RuntimeStats};
pub use scorer::AttentionScorer;
