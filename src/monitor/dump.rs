//! Diagnostic state dump structures
//!
//! Serializable snapshot of the allocator for operators and tests. The
//! rendered text format carries no compatibility guarantee.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::features::FeatureVector;

/// Complete allocator snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateDump {
    /// Wall-clock capture time (epoch milliseconds)
    pub captured_at_ms: i64,
    pub initialized: bool,
    pub emergency: bool,
    pub total_attention: u64,
    /// Tick of the last feature refresh anywhere in the allocator
    pub last_update: u64,
    /// Processes currently registered
    pub tracked: usize,
    pub tensor: TensorDump,
    pub buckets: Vec<BucketDump>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorDump {
    pub cursor: usize,
    pub window: usize,
    pub capacity: usize,
    pub active: usize,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketDump {
    pub index: usize,
    pub threshold: f32,
    pub population: usize,
    pub processes: Vec<ProcessDump>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDump {
    pub pid: u32,
    pub attention: f32,
    pub features: [f32; FeatureVector::DIM],
}

impl fmt::Display for StateDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cognitive scheduler state:")?;
        writeln!(
            f,
            "Total attention: {}, Emergency mode: {}",
            self.total_attention, self.emergency
        )?;
        writeln!(
            f,
            "Tracked processes: {}, last update tick: {}",
            self.tracked, self.last_update
        )?;
        writeln!(
            f,
            "Tensor: cursor {}/{}, active processes: {}",
            self.tensor.cursor, self.tensor.window, self.tensor.active
        )?;
        for bucket in &self.buckets {
            if bucket.population == 0 {
                continue;
            }
            writeln!(
                f,
                "Attention queue {} (threshold {:.2}): {} processes",
                bucket.index, bucket.threshold, bucket.population
            )?;
            for proc in &bucket.processes {
                writeln!(
                    f,
                    "  Process {}: attention={:.2} features=[{:.2},{:.2},{:.2},{:.2}]",
                    proc.pid,
                    proc.attention,
                    proc.features[0],
                    proc.features[1],
                    proc.features[2],
                    proc.features[3],
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dump() -> StateDump {
        StateDump {
            captured_at_ms: 0,
            initialized: true,
            emergency: false,
            total_attention: 1000,
            last_update: 7,
            tracked: 1,
            tensor: TensorDump {
                cursor: 3,
                window: 32,
                capacity: 256,
                active: 1,
                timestamp: 7,
            },
            buckets: vec![
                BucketDump {
                    index: 0,
                    threshold: 1.0,
                    population: 0,
                    processes: vec![],
                },
                BucketDump {
                    index: 3,
                    threshold: 0.25,
                    population: 1,
                    processes: vec![ProcessDump {
                        pid: 42,
                        attention: 0.348,
                        features: [0.3, 0.0, 0.0, 0.8, 0.0, 0.0, 0.0, 0.6],
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_display_lists_populated_buckets_only() {
        let text = dump().to_string();
        assert!(text.contains("Attention queue 3 (threshold 0.25): 1 processes"));
        assert!(text.contains("Process 42: attention=0.35"));
        assert!(!text.contains("Attention queue 0"));
    }

    #[test]
    fn test_json_roundtrip() {
        let json = serde_json::to_string(&dump()).unwrap();
        let back: StateDump = serde_json::from_str(&json).unwrap();
        assert_eq!(back.buckets.len(), 2);
        assert_eq!(back.buckets[1].processes[0].pid, 42);
    }
}
