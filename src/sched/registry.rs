//! Fixed-capacity arena of per-process cognitive records
//!
//! Bucket membership is expressed through stable slot handles instead of
//! references embedded in process structures, so a terminated process can
//! never leave a dangling link behind.

use std::fmt;

use crate::core::features::FeatureVector;

/// Handle to a registered process.
///
/// Carries the slot index plus a generation counter; a handle that
/// outlives its registration stops resolving once the slot is recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcHandle {
    slot: u32,
    generation: u32,
}

impl ProcHandle {
    pub fn slot(&self) -> usize {
        self.slot as usize
    }
}

/// Registration failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// All tracking slots are occupied
    CapacityExhausted { capacity: usize },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::CapacityExhausted { capacity } => {
                write!(f, "all {} tracking slots occupied", capacity)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Cognitive state attached to a tracked process.
#[derive(Debug, Clone)]
pub struct CognitiveRecord {
    pub pid: u32,
    pub opted_in: bool,
    pub features: FeatureVector,
    /// Last computed attention score
    pub attention: f32,
    /// Tick of the last feature refresh
    pub last_refresh: u64,
    /// Bucket currently holding this process, if any
    pub bucket: Option<usize>,
    /// Admission stamp; queue entries with an older stamp are stale
    pub stamp: u64,
}

impl CognitiveRecord {
    fn new(pid: u32) -> Self {
        Self {
            pid,
            opted_in: false,
            features: FeatureVector::new(),
            attention: 0.0,
            last_refresh: 0,
            bucket: None,
            stamp: 0,
        }
    }
}

struct Slot {
    generation: u32,
    record: Option<CognitiveRecord>,
}

/// Slot table holding every tracked process's cognitive record.
///
/// Capacity is fixed at construction; registration recycles freed slots
/// and never grows the table.
pub struct ProcessRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    admissions: u64,
}

impl ProcessRegistry {
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                record: None,
            })
            .collect();
        // Hand out low indices first
        let free = (0..capacity as u32).rev().collect();
        Self {
            slots,
            free,
            admissions: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn register(&mut self, pid: u32) -> Result<ProcHandle, RegistryError> {
        let slot = self.free.pop().ok_or(RegistryError::CapacityExhausted {
            capacity: self.slots.len(),
        })?;
        let entry = &mut self.slots[slot as usize];
        entry.record = Some(CognitiveRecord::new(pid));
        Ok(ProcHandle {
            slot,
            generation: entry.generation,
        })
    }

    /// Free the slot, returning the final record state.
    pub fn unregister(&mut self, handle: ProcHandle) -> Option<CognitiveRecord> {
        let entry = self.slots.get_mut(handle.slot())?;
        if entry.generation != handle.generation {
            return None;
        }
        let record = entry.record.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(handle.slot);
        Some(record)
    }

    pub fn get(&self, handle: ProcHandle) -> Option<&CognitiveRecord> {
        let entry = self.slots.get(handle.slot())?;
        if entry.generation != handle.generation {
            return None;
        }
        entry.record.as_ref()
    }

    pub fn get_mut(&mut self, handle: ProcHandle) -> Option<&mut CognitiveRecord> {
        let entry = self.slots.get_mut(handle.slot())?;
        if entry.generation != handle.generation {
            return None;
        }
        entry.record.as_mut()
    }

    /// Next admission stamp, unique per registry.
    pub fn next_stamp(&mut self) -> u64 {
        self.admissions += 1;
        self.admissions
    }

    /// Iterate live records with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (ProcHandle, &CognitiveRecord)> {
        self.slots.iter().enumerate().filter_map(|(i, entry)| {
            entry.record.as_ref().map(|record| {
                (
                    ProcHandle {
                        slot: i as u32,
                        generation: entry.generation,
                    },
                    record,
                )
            })
        })
    }
}
