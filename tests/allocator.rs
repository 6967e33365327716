//! End-to-end allocator scenarios

use std::sync::Arc;
use std::thread;

use cogsched::{
    AttentionAllocator, AttentionConfig, AttentionScorer, FeatureVector, ProcHandle, RuntimeStats,
};

fn quiet_stats() -> RuntimeStats {
    RuntimeStats {
        cpu: 0.0,
        priority: 0,
        max_priority: 20,
        memory: Some(0.0),
        ..Default::default()
    }
}

/// Register, opt in, and pin the cached score to `score`.
///
/// Every non-emergent dimension is set to score / 0.95 (the non-emergent
/// weight budget), so the weighted sum lands on `score` exactly without
/// triggering the emergent boost. Admission on the registration tick
/// skips the refresh and scores the manual vector as-is.
fn admit_with_score(alloc: &AttentionAllocator, pid: u32, score: f32, now: u64) -> ProcHandle {
    let handle = alloc.register(pid).unwrap();
    alloc.set_opted_in(handle, true);
    let value = score / 0.95;
    for index in 0..FeatureVector::DIM - 1 {
        alloc.set_feature(handle, index, value);
    }
    alloc.admit(handle, &quiet_stats(), now);
    handle
}

#[test]
fn selection_follows_descending_score_order() {
    // Scores {0.95, 0.9, 0.6, 0.3, 0.1} under thresholds {1, .75, .5, .25}
    // come back highest-bucket-first; 0.95 and 0.9 share the 0.75 bucket,
    // where admission order breaks the tie.
    let alloc = AttentionAllocator::with_defaults();

    let scores = [0.95f32, 0.9, 0.6, 0.3, 0.1];
    let mut handles = Vec::new();
    for (i, score) in scores.iter().enumerate() {
        let handle = admit_with_score(&alloc, 100 + i as u32, *score, 0);
        assert!(
            (alloc.attention(handle) - score).abs() < 1e-3,
            "pinned score drifted: wanted {}, got {}",
            score,
            alloc.attention(handle)
        );
        handles.push(handle);
    }

    for handle in &handles {
        assert_eq!(alloc.select_next(1), Some(*handle));
    }
    assert_eq!(alloc.select_next(2), None);
}

#[test]
fn fifo_within_a_bucket() {
    let alloc = AttentionAllocator::with_defaults();
    // Identical scores land in the same bucket; admission order decides.
    let a = admit_with_score(&alloc, 1, 0.3, 0);
    let b = admit_with_score(&alloc, 2, 0.3, 0);
    let c = admit_with_score(&alloc, 3, 0.3, 0);

    assert_eq!(alloc.select_next(1), Some(a));
    assert_eq!(alloc.select_next(1), Some(b));
    assert_eq!(alloc.select_next(1), Some(c));
}

#[test]
fn zero_score_process_is_never_dropped() {
    let alloc = AttentionAllocator::with_defaults();
    let handle = admit_with_score(&alloc, 1, 0.0, 0);

    let dump = alloc.dump_state();
    let populations: Vec<usize> = dump.buckets.iter().map(|b| b.population).collect();
    assert_eq!(populations, vec![0, 0, 0, 1]);
    assert_eq!(alloc.select_next(1), Some(handle));
}

#[test]
fn bucket_membership_is_exclusive_across_readmissions() {
    let alloc = AttentionAllocator::with_defaults();
    let handles: Vec<ProcHandle> = (0..6)
        .map(|i| admit_with_score(&alloc, i, 0.1 * i as f32, 0))
        .collect();

    // Churn: re-admit everything with fresh stats several times
    for round in 1..=4u64 {
        for (i, handle) in handles.iter().enumerate() {
            let stats = RuntimeStats {
                cpu: i as f32 / 6.0,
                priority: i as u32,
                max_priority: 20,
                ..Default::default()
            };
            alloc.admit(*handle, &stats, round);
        }
        let dump = alloc.dump_state();
        let total: usize = dump.buckets.iter().map(|b| b.population).sum();
        assert_eq!(total, handles.len(), "round {}: duplicate membership", round);
    }
}

#[test]
fn emergency_mode_defers_until_cleared() {
    let alloc = AttentionAllocator::with_defaults();
    let handle = admit_with_score(&alloc, 1, 0.5, 0);

    alloc.set_emergency(true);
    for tick in 1..10 {
        assert_eq!(alloc.select_next(tick), None);
    }
    alloc.set_emergency(false);
    assert_eq!(alloc.select_next(10), Some(handle));
}

#[test]
fn scenario_vector_scores_into_quarter_bucket() {
    // [0.3, 0, 0, 0.8, 0, 0, 0, 0.6] scores 0.29 * 1.2 = 0.348 and
    // belongs in the 0.25-threshold bucket.
    let config = AttentionConfig::default();
    let scorer = AttentionScorer::new(&config);
    let vector = FeatureVector::from_values([0.3, 0.0, 0.0, 0.8, 0.0, 0.0, 0.0, 0.6]);
    let score = scorer.score(&vector);
    assert!((score - 0.348).abs() < 1e-4);

    let alloc = AttentionAllocator::new(config);
    let handle = alloc.register(1).unwrap();
    alloc.set_opted_in(handle, true);
    for (index, value) in vector.values().iter().enumerate() {
        alloc.set_feature(handle, index, *value);
    }
    alloc.admit(handle, &quiet_stats(), 0);

    let dump = alloc.dump_state();
    assert_eq!(dump.buckets[3].population, 1);
    assert!((dump.buckets[3].processes[0].attention - 0.348).abs() < 1e-4);
}

#[test]
fn concurrent_admission_and_selection_keep_membership_exclusive() {
    let alloc = Arc::new(AttentionAllocator::with_defaults());
    let handles: Vec<ProcHandle> = (0..32)
        .map(|i| {
            let handle = alloc.register(i).unwrap();
            alloc.set_opted_in(handle, true);
            handle
        })
        .collect();

    let mut workers = Vec::new();
    for worker in 0..4usize {
        let alloc = Arc::clone(&alloc);
        let handles = handles.clone();
        workers.push(thread::spawn(move || {
            for tick in 1..=200u64 {
                for (i, handle) in handles.iter().enumerate() {
                    if i % 4 == worker {
                        let stats = RuntimeStats {
                            cpu: i as f32 / 32.0,
                            priority: i as u32 % 20,
                            max_priority: 20,
                            ..Default::default()
                        };
                        alloc.admit(*handle, &stats, tick);
                    }
                }
                alloc.select_next(tick);
            }
        }));
    }
    for worker in workers {
        worker.join().unwrap();
    }

    // Whatever interleaving happened, nothing is in two buckets
    let dump = alloc.dump_state();
    let mut seen = std::collections::HashSet::new();
    for bucket in &dump.buckets {
        for proc in &bucket.processes {
            assert!(seen.insert(proc.pid), "pid {} in two buckets", proc.pid);
        }
    }
}

#[test]
fn lazy_initialization_happens_once() {
    let alloc = AttentionAllocator::with_defaults();
    assert!(!alloc.is_initialized());
    assert_eq!(alloc.select_next(1), None);
    assert!(!alloc.is_initialized(), "selection must not initialize");

    let handle = alloc.register(1).unwrap();
    assert!(alloc.is_initialized(), "registration initializes lazily");
    alloc.set_opted_in(handle, true);
    alloc.admit(handle, &quiet_stats(), 1);
    assert_eq!(alloc.select_next(2), Some(handle));
}
