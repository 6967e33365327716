//! Threshold-keyed FIFO attention queues

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, TryLockError};

use super::registry::ProcHandle;

/// One FIFO attention queue with a static admission threshold.
///
/// Entries carry the admission stamp issued by the registry; an entry
/// whose stamp no longer matches the record is stale and must be
/// discarded by the consumer.
pub struct Bucket {
    threshold: f32,
    queue: VecDeque<(ProcHandle, u64)>,
}

impl Bucket {
    fn new(threshold: f32, capacity: usize) -> Self {
        Self {
            threshold,
            // Full capacity up front; admission never allocates
            queue: VecDeque::with_capacity(capacity),
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Tail append, preserving FIFO order.
    pub fn push(&mut self, handle: ProcHandle, stamp: u64) {
        self.queue.push_back((handle, stamp));
    }

    pub fn pop_front(&mut self) -> Option<(ProcHandle, u64)> {
        self.queue.pop_front()
    }

    /// Unlink a specific process. Linear scan; order of the remaining
    /// entries is preserved.
    pub fn remove(&mut self, handle: ProcHandle) -> bool {
        if let Some(pos) = self.queue.iter().position(|(h, _)| *h == handle) {
            self.queue.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &(ProcHandle, u64)> {
        self.queue.iter()
    }
}

/// The fixed set of attention queues, one lock per bucket.
///
/// Thresholds are static, so placement decisions read them without
/// touching any bucket lock.
pub struct AttentionQueueSet {
    thresholds: Vec<f32>,
    buckets: Vec<Mutex<Bucket>>,
}

impl AttentionQueueSet {
    /// Build `bucket_count` buckets with thresholds (B - i) / B.
    pub fn new(bucket_count: usize, capacity: usize) -> Self {
        let thresholds: Vec<f32> = (0..bucket_count)
            .map(|i| (bucket_count - i) as f32 / bucket_count as f32)
            .collect();
        let buckets = thresholds
            .iter()
            .map(|t| Mutex::new(Bucket::new(*t, capacity)))
            .collect();
        Self {
            thresholds,
            buckets,
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Index of the first bucket whose threshold the score meets, or the
    /// lowest-threshold bucket as catch-all.
    pub fn bucket_for(&self, score: f32) -> usize {
        self.thresholds
            .iter()
            .position(|t| score >= *t)
            .unwrap_or(self.thresholds.len() - 1)
    }

    pub fn lock(&self, index: usize) -> MutexGuard<'_, Bucket> {
        self.buckets[index]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Non-blocking acquisition for best-effort removal paths.
    pub fn try_lock(&self, index: usize) -> Option<MutexGuard<'_, Bucket>> {
        match self.buckets[index].try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    pub fn thresholds(&self) -> &[f32] {
        &self.thresholds
    }
}
