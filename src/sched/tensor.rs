//! Rolling feature-history tensor
//!
//! Bounded store of per-process feature snapshots across a sliding time
//! window, shape [max_procs x features x window]. Diagnostic and
//! temporal-pattern infrastructure only; selection never reads it.

use ndarray::Array3;

use crate::core::features::FeatureVector;

pub struct AttentionTensor {
    /// [slot, feature, time]
    data: Array3<f32>,
    /// Tick recorded for each time slot
    timestamps: Vec<u64>,
    /// Current time slot
    cursor: usize,
    /// Processes currently tracked
    active: usize,
}

impl AttentionTensor {
    pub fn new(capacity: usize, window: usize) -> Self {
        Self {
            data: Array3::zeros((capacity, FeatureVector::DIM, window)),
            timestamps: vec![0; window],
            cursor: 0,
            active: 0,
        }
    }

    /// Zero every cell and timestamp and reset the cursor. Idempotent.
    pub fn initialize(&mut self) {
        self.data.fill(0.0);
        self.timestamps.fill(0);
        self.cursor = 0;
        self.active = 0;
    }

    /// Move the cursor to the next time slot and stamp it.
    pub fn advance(&mut self, now: u64) {
        self.cursor = (self.cursor + 1) % self.timestamps.len();
        self.timestamps[self.cursor] = now;
    }

    /// Persist a feature snapshot for a slot into the current time slot.
    pub fn record(&mut self, slot: usize, vector: &FeatureVector, now: u64) {
        if slot >= self.capacity() {
            return;
        }
        for (i, value) in vector.values().iter().enumerate() {
            self.data[[slot, i, self.cursor]] = *value;
        }
        self.timestamps[self.cursor] = now;
    }

    /// Snapshot of a slot at the current time slot.
    pub fn snapshot(&self, slot: usize) -> Option<[f32; FeatureVector::DIM]> {
        if slot >= self.capacity() {
            return None;
        }
        let mut out = [0.0; FeatureVector::DIM];
        for (i, value) in out.iter_mut().enumerate() {
            *value = self.data[[slot, i, self.cursor]];
        }
        Some(out)
    }

    /// Full history of one feature dimension for a slot, oldest first.
    pub fn history(&self, slot: usize, feature: usize) -> Option<Vec<f32>> {
        if slot >= self.capacity() || feature >= FeatureVector::DIM {
            return None;
        }
        let window = self.window();
        let mut out = Vec::with_capacity(window);
        for t in 1..=window {
            out.push(self.data[[slot, feature, (self.cursor + t) % window]]);
        }
        Some(out)
    }

    /// Drop all history for a slot so a recycled slot starts clean.
    pub fn clear_slot(&mut self, slot: usize) {
        if slot >= self.capacity() {
            return;
        }
        for feature in 0..FeatureVector::DIM {
            for t in 0..self.window() {
                self.data[[slot, feature, t]] = 0.0;
            }
        }
    }

    pub fn set_active(&mut self, active: usize) {
        self.active = active;
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn window(&self) -> usize {
        self.timestamps.len()
    }

    pub fn capacity(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamps[self.cursor]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::features::Feature;

    #[test]
    fn test_initialize_is_idempotent() {
        let mut tensor = AttentionTensor::new(4, 8);
        tensor.advance(5);
        tensor.record(0, &FeatureVector::from_values([0.5; 8]), 5);
        tensor.initialize();
        let after_one = (tensor.cursor(), tensor.timestamp(), tensor.snapshot(0));

        tensor.initialize();
        assert_eq!(
            (tensor.cursor(), tensor.timestamp(), tensor.snapshot(0)),
            after_one
        );
        assert_eq!(tensor.snapshot(0), Some([0.0; 8]));
    }

    #[test]
    fn test_cursor_wraps() {
        let mut tensor = AttentionTensor::new(2, 3);
        for now in 1..=3 {
            tensor.advance(now);
        }
        assert_eq!(tensor.cursor(), 0);
        assert_eq!(tensor.timestamp(), 3);
    }

    #[test]
    fn test_record_lands_in_current_slot() {
        let mut tensor = AttentionTensor::new(2, 4);
        let mut v = FeatureVector::new();
        v.set(Feature::Load, 0.7);

        tensor.record(1, &v, 10);
        let snap = tensor.snapshot(1).unwrap();
        assert!((snap[Feature::Load.index()] - 0.7).abs() < 1e-6);
        assert_eq!(tensor.timestamp(), 10);

        // A different slot stays untouched
        assert_eq!(tensor.snapshot(0), Some([0.0; 8]));
    }

    #[test]
    fn test_out_of_range_slot_ignored() {
        let mut tensor = AttentionTensor::new(2, 4);
        tensor.record(9, &FeatureVector::from_values([1.0; 8]), 1);
        assert!(tensor.snapshot(9).is_none());
        assert_eq!(tensor.timestamp(), 0);
    }

    #[test]
    fn test_history_is_oldest_first() {
        let mut tensor = AttentionTensor::new(1, 3);
        let mut v = FeatureVector::new();
        for (tick, value) in [(1u64, 0.1f32), (2, 0.2), (3, 0.3)] {
            tensor.advance(tick);
            v.set(Feature::Load, value);
            tensor.record(0, &v, tick);
        }
        let history = tensor.history(0, Feature::Load.index()).unwrap();
        assert_eq!(history.len(), 3);
        assert!((history[2] - 0.3).abs() < 1e-6);
        // Oldest surviving sample precedes the newest
        assert!(history[1] < history[2]);
    }
}
