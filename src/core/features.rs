//! Cognitive feature representation for attention scoring

use serde::{Deserialize, Serialize};

const DIM: usize = 8;

/// Cognitive feature dimensions tracked per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(usize)]
pub enum Feature {
    /// CPU load pattern
    Load = 0,
    /// Memory access pattern
    Memory = 1,
    /// I/O activity pattern
    Io = 2,
    /// Interactive response pattern
    Interactive = 3,
    /// Real-time requirement pattern
    Realtime = 4,
    /// Network activity pattern
    Network = 5,
    /// Traditional priority influence
    Priority = 6,
    /// Emergent behavioral pattern
    Emergent = 7,
}

impl Feature {
    /// All dimensions in index order.
    pub const ALL: [Feature; FeatureVector::DIM] = [
        Feature::Load,
        Feature::Memory,
        Feature::Io,
        Feature::Interactive,
        Feature::Realtime,
        Feature::Network,
        Feature::Priority,
        Feature::Emergent,
    ];

    /// Resolve a raw dimension index, `None` if out of range.
    pub fn from_index(index: usize) -> Option<Feature> {
        Feature::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Normalized per-process feature profile.
///
/// Every dimension is clamped to [0, 1] on write, so a vector read back
/// from any code path is always valid scorer input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f32; DIM]);

impl FeatureVector {
    /// Vector dimension
    pub const DIM: usize = DIM;

    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw values, clamping each dimension.
    pub fn from_values(values: [f32; Self::DIM]) -> Self {
        let mut v = Self::new();
        for (i, value) in values.iter().enumerate() {
            v.0[i] = value.clamp(0.0, 1.0);
        }
        v
    }

    pub fn get(&self, feature: Feature) -> f32 {
        self.0[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, value: f32) {
        self.0[feature.index()] = value.clamp(0.0, 1.0);
    }

    /// Set by raw index. Returns false without touching the vector when
    /// the index is out of range.
    pub fn set_index(&mut self, index: usize, value: f32) -> bool {
        match Feature::from_index(index) {
            Some(feature) => {
                self.set(feature, value);
                true
            }
            None => false,
        }
    }

    /// Get by raw index, 0.0 when out of range.
    pub fn get_index(&self, index: usize) -> f32 {
        Feature::from_index(index).map(|f| self.get(f)).unwrap_or(0.0)
    }

    pub fn values(&self) -> &[f32; Self::DIM] {
        &self.0
    }
}

/// Runtime signals supplied by the host's stats collaborator.
///
/// Optional dimensions are left untouched on refresh when absent, so
/// values set manually or by a richer external signal survive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeStats {
    /// Recent CPU usage fraction (0.0-1.0)
    pub cpu: f32,
    /// Traditional priority level
    pub priority: u32,
    /// Number of priority levels in the traditional scheduler
    pub max_priority: u32,
    /// Memory pressure ratio, if the collaborator tracks it
    pub memory: Option<f32>,
    /// I/O activity ratio
    pub io: Option<f32>,
    /// Network activity ratio
    pub network: Option<f32>,
    /// Whether the process declared a real-time requirement
    pub realtime: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clamps() {
        let mut v = FeatureVector::new();
        v.set(Feature::Load, 1.7);
        assert_eq!(v.get(Feature::Load), 1.0);
        v.set(Feature::Load, -0.3);
        assert_eq!(v.get(Feature::Load), 0.0);
    }

    #[test]
    fn test_set_index_bounds() {
        let mut v = FeatureVector::new();
        assert!(v.set_index(7, 0.5));
        assert_eq!(v.get(Feature::Emergent), 0.5);
        assert!(!v.set_index(8, 0.5));
        assert_eq!(v.get_index(8), 0.0);
    }

    #[test]
    fn test_from_values_clamps() {
        let v = FeatureVector::from_values([2.0, -1.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(v.get(Feature::Load), 1.0);
        assert_eq!(v.get(Feature::Memory), 0.0);
        assert_eq!(v.get(Feature::Io), 0.5);
    }

    #[test]
    fn test_feature_roundtrip() {
        for (i, f) in Feature::ALL.iter().enumerate() {
            assert_eq!(f.index(), i);
            assert_eq!(Feature::from_index(i), Some(*f));
        }
        assert_eq!(Feature::from_index(FeatureVector::DIM), None);
    }
}
