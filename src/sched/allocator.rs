//! Attention allocator
//!
//! Top-level coordinator owning the registry, history tensor and attention
//! queues. The host scheduler calls `admit` when a process becomes ready
//! and `select_next` when choosing what to run; a `None` selection means
//! "fall back to the traditional scheduler".

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, TryLockError};

use tracing::{debug, info, warn};

use crate::core::config::AttentionConfig;
use crate::core::extractor::FeatureExtractor;
use crate::core::features::RuntimeStats;
use crate::core::scorer::AttentionScorer;
use crate::monitor::dump::{BucketDump, ProcessDump, StateDump, TensorDump};
use crate::sched::queues::AttentionQueueSet;
use crate::sched::registry::{CognitiveRecord, ProcHandle, ProcessRegistry, RegistryError};
use crate::sched::tensor::AttentionTensor;

/// One allocator instance serves the whole host scheduler. Construct it
/// once at startup and inject it wherever admission or selection hooks
/// need it.
///
/// Lock order is registry, then tensor, then one bucket at a time; no
/// path ever holds two bucket locks simultaneously.
pub struct AttentionAllocator {
    config: AttentionConfig,
    extractor: FeatureExtractor,
    scorer: AttentionScorer,
    registry: Mutex<ProcessRegistry>,
    tensor: Mutex<AttentionTensor>,
    queues: AttentionQueueSet,
    initialized: AtomicBool,
    emergency: AtomicBool,
    total_attention: u64,
    last_update: AtomicU64,
}

impl AttentionAllocator {
    /// Build an allocator from config. Degenerate sizing values are
    /// raised to 1 so construction never fails; run
    /// [`AttentionConfig::validate`] first to reject them loudly instead.
    pub fn new(config: AttentionConfig) -> Self {
        let mut config = config;
        config.bucket_count = config.bucket_count.max(1);
        config.max_procs = config.max_procs.max(1);
        config.time_window = config.time_window.max(1);

        let extractor = FeatureExtractor::new(&config);
        let scorer = AttentionScorer::new(&config);
        let registry = Mutex::new(ProcessRegistry::new(config.max_procs));
        let tensor = Mutex::new(AttentionTensor::new(config.max_procs, config.time_window));
        let queues = AttentionQueueSet::new(config.bucket_count, config.max_procs);
        let total_attention = config.total_attention;

        Self {
            config,
            extractor,
            scorer,
            registry,
            tensor,
            queues,
            initialized: AtomicBool::new(false),
            emergency: AtomicBool::new(false),
            total_attention,
            last_update: AtomicU64::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(AttentionConfig::default())
    }

    /// Transition to the initialized state. Safe to call redundantly and
    /// under concurrent first use; exactly one caller performs the reset.
    pub fn initialize(&self) {
        if self
            .initialized
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        self.lock_tensor().initialize();
        self.last_update.store(0, Ordering::Relaxed);
        info!(
            buckets = self.queues.len(),
            max_procs = self.config.max_procs,
            window = self.config.time_window,
            "attention allocator initialized"
        );
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn ensure_initialized(&self) {
        if !self.is_initialized() {
            self.initialize();
        }
    }

    /// Start tracking a process. The handle stays valid until
    /// `unregister`; a handle held past that never resolves again.
    pub fn register(&self, pid: u32) -> Result<ProcHandle, RegistryError> {
        self.ensure_initialized();
        let active;
        let handle = {
            let mut registry = self.lock_registry();
            let handle = registry.register(pid);
            active = registry.active();
            handle
        };
        match handle {
            Ok(handle) => {
                self.lock_tensor().set_active(active);
                debug!(pid, slot = handle.slot(), "process registered");
                Ok(handle)
            }
            Err(e) => {
                warn!(pid, error = %e, "process registration rejected");
                Err(e)
            }
        }
    }

    /// Stop tracking a process, unlinking it from any bucket first. The
    /// termination path must call this before reclaiming the process.
    pub fn unregister(&self, handle: ProcHandle) {
        let active;
        {
            let mut registry = self.lock_registry();
            let bucket = match registry.get(handle) {
                Some(record) => record.bucket,
                None => return,
            };
            if let Some(index) = bucket {
                self.queues.lock(index).remove(handle);
            }
            if let Some(record) = registry.unregister(handle) {
                debug!(pid = record.pid, "process unregistered");
            }
            active = registry.active();
        }
        let mut tensor = self.lock_tensor();
        tensor.set_active(active);
        tensor.clear_slot(handle.slot());
    }

    /// Toggle attention-based scheduling for a process. Opting out
    /// removes it from its bucket immediately.
    pub fn set_opted_in(&self, handle: ProcHandle, opted_in: bool) {
        let mut registry = self.lock_registry();
        let Some(record) = registry.get_mut(handle) else {
            return;
        };
        record.opted_in = opted_in;
        if !opted_in {
            if let Some(index) = record.bucket.take() {
                self.queues.lock(index).remove(handle);
            }
        }
    }

    pub fn is_opted_in(&self, handle: ProcHandle) -> bool {
        self.lock_registry()
            .get(handle)
            .map(|r| r.opted_in)
            .unwrap_or(false)
    }

    /// Admit a ready process into the attention queue matching its score.
    ///
    /// No-op for processes that never opted in. Bookkeeping continues in
    /// emergency mode; only selection is gated. Returns whether the
    /// process was queued.
    pub fn admit(&self, handle: ProcHandle, stats: &RuntimeStats, now: u64) -> bool {
        self.ensure_initialized();

        let mut registry = self.lock_registry();
        let Some(record) = registry.get_mut(handle) else {
            return false;
        };
        if !record.opted_in {
            return false;
        }

        let refreshed = Self::refresh_record(&self.extractor, &self.scorer, record, stats, now);
        let score = record.attention;
        let features = record.features;
        let old_bucket = record.bucket;
        let slot = handle.slot();

        let stamp = registry.next_stamp();
        let target = self.queues.bucket_for(score);
        if let Some(record) = registry.get_mut(handle) {
            record.bucket = Some(target);
            record.stamp = stamp;
        }

        if refreshed {
            let mut tensor = self.lock_tensor();
            tensor.record(slot, &features, now);
            tensor.advance(now);
            self.last_update.store(now, Ordering::Relaxed);
        }

        if let Some(index) = old_bucket {
            self.queues.lock(index).remove(handle);
        }
        self.queues.lock(target).push(handle, stamp);

        debug!(slot, score, bucket = target, "process admitted");
        true
    }

    /// Pop the head of the highest nonempty bucket.
    ///
    /// Returns `None` while uninitialized or in emergency mode; the host
    /// must treat that as "use the traditional scheduler", never as an
    /// error.
    pub fn select_next(&self, now: u64) -> Option<ProcHandle> {
        if !self.is_initialized() || self.emergency_active() {
            return None;
        }

        let mut registry = self.lock_registry();
        for index in 0..self.queues.len() {
            let mut bucket = self.queues.lock(index);
            while let Some((handle, stamp)) = bucket.pop_front() {
                match registry.get_mut(handle) {
                    Some(record)
                        if record.bucket == Some(index)
                            && record.stamp == stamp
                            && record.opted_in =>
                    {
                        record.bucket = None;
                        record.last_refresh = now;
                        debug!(slot = handle.slot(), bucket = index, "process selected");
                        return Some(handle);
                    }
                    _ => {
                        // Entry outlived its record or a re-admission;
                        // drop it and keep scanning.
                        warn!(slot = handle.slot(), bucket = index, "discarded stale queue entry");
                    }
                }
            }
        }
        None
    }

    /// Recompute features and score if at least one tick has elapsed
    /// since the last refresh. Does not re-bucket the process.
    pub fn refresh_features(&self, handle: ProcHandle, stats: &RuntimeStats, now: u64) {
        let mut registry = self.lock_registry();
        let Some(record) = registry.get_mut(handle) else {
            return;
        };
        if !record.opted_in {
            return;
        }
        if !Self::refresh_record(&self.extractor, &self.scorer, record, stats, now) {
            return;
        }
        let features = record.features;
        let slot = handle.slot();
        drop(registry);

        let mut tensor = self.lock_tensor();
        tensor.record(slot, &features, now);
        tensor.advance(now);
        self.last_update.store(now, Ordering::Relaxed);
    }

    fn refresh_record(
        extractor: &FeatureExtractor,
        scorer: &AttentionScorer,
        record: &mut CognitiveRecord,
        stats: &RuntimeStats,
        now: u64,
    ) -> bool {
        // Same scheduling tick: nothing to recompute
        let refreshed = now.saturating_sub(record.last_refresh) > 0;
        if refreshed {
            let last = record.last_refresh;
            extractor.refresh_into(&mut record.features, stats, now, last);
            record.last_refresh = now;
        }
        record.attention = scorer.score(&record.features);
        refreshed
    }

    /// Last cached attention score; 0.0 for unknown or non-opted-in
    /// processes. Never recomputes.
    pub fn attention(&self, handle: ProcHandle) -> f32 {
        self.lock_registry()
            .get(handle)
            .filter(|r| r.opted_in)
            .map(|r| r.attention)
            .unwrap_or(0.0)
    }

    /// One feature dimension by raw index; 0.0 when the index is out of
    /// range or the process is not opted in.
    pub fn feature(&self, handle: ProcHandle, index: usize) -> f32 {
        self.lock_registry()
            .get(handle)
            .filter(|r| r.opted_in)
            .map(|r| r.features.get_index(index))
            .unwrap_or(0.0)
    }

    /// Manually override one feature dimension, clamped to [0, 1].
    /// Ignored for out-of-range indices and non-opted-in processes. The
    /// process is re-bucketed on its next refresh/admit cycle, not here.
    pub fn set_feature(&self, handle: ProcHandle, index: usize, value: f32) {
        let mut registry = self.lock_registry();
        let Some(record) = registry.get_mut(handle) else {
            return;
        };
        if !record.opted_in {
            return;
        }
        record.features.set_index(index, value);
    }

    /// Best-effort unlink from the current bucket. Fails silently under
    /// lock contention; callers must not assume success.
    pub fn remove(&self, handle: ProcHandle) -> bool {
        let Some(mut registry) = self.try_lock_registry() else {
            return false;
        };
        let Some(record) = registry.get_mut(handle) else {
            return false;
        };
        let Some(index) = record.bucket else {
            return true;
        };
        let Some(mut bucket) = self.queues.try_lock(index) else {
            return false;
        };
        bucket.remove(handle);
        record.bucket = None;
        true
    }

    /// Toggle the emergency safety valve. While active the allocator
    /// keeps tracking attention but cedes all selection authority.
    pub fn set_emergency(&self, enabled: bool) {
        let was = self.emergency.swap(enabled, Ordering::SeqCst);
        if was != enabled {
            if enabled {
                info!("emergency mode engaged; selection ceded to traditional scheduler");
            } else {
                info!("emergency mode cleared");
            }
        }
    }

    pub fn emergency_active(&self) -> bool {
        self.emergency.load(Ordering::SeqCst)
    }

    /// Read-only diagnostic snapshot. Acquires one lock at a time.
    pub fn dump_state(&self) -> StateDump {
        let mut by_handle: HashMap<ProcHandle, ProcessDump> = HashMap::new();
        let tracked;
        {
            let registry = self.lock_registry();
            tracked = registry.active();
            for (handle, record) in registry.iter() {
                by_handle.insert(
                    handle,
                    ProcessDump {
                        pid: record.pid,
                        attention: record.attention,
                        features: *record.features.values(),
                    },
                );
            }
        }

        let tensor = {
            let tensor = self.lock_tensor();
            TensorDump {
                cursor: tensor.cursor(),
                window: tensor.window(),
                capacity: tensor.capacity(),
                active: tensor.active(),
                timestamp: tensor.timestamp(),
            }
        };

        let mut buckets = Vec::with_capacity(self.queues.len());
        for index in 0..self.queues.len() {
            let bucket = self.queues.lock(index);
            let processes: Vec<ProcessDump> = bucket
                .entries()
                .filter_map(|(handle, _)| by_handle.get(handle).cloned())
                .collect();
            buckets.push(BucketDump {
                index,
                threshold: bucket.threshold(),
                population: processes.len(),
                processes,
            });
        }

        StateDump {
            captured_at_ms: chrono::Local::now().timestamp_millis(),
            initialized: self.is_initialized(),
            emergency: self.emergency_active(),
            total_attention: self.total_attention,
            last_update: self.last_update.load(Ordering::Relaxed),
            tracked,
            tensor,
            buckets,
        }
    }

    pub fn config(&self) -> &AttentionConfig {
        &self.config
    }

    pub fn thresholds(&self) -> &[f32] {
        self.queues.thresholds()
    }

    fn lock_registry(&self) -> MutexGuard<'_, ProcessRegistry> {
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn try_lock_registry(&self) -> Option<MutexGuard<'_, ProcessRegistry>> {
        match self.registry.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    fn lock_tensor(&self) -> MutexGuard<'_, AttentionTensor> {
        self.tensor
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
