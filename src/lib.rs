//! Cognitive Process Scheduling Layer
//!
//! An attention-weighted admission and selection layer that augments a
//! traditional priority-based process scheduler. Opted-in processes get
//! an 8-dimensional cognitive feature profile, a weighted attention
//! score, and a place in one of a small set of threshold-keyed FIFO
//! queues; the host scheduler asks for the head of the highest nonempty
//! queue before falling back to its own logic.
//!
//! ## Features
//!
//! - **Bounded feature tracking**: fixed-capacity record arena plus a
//!   rolling [capacity x features x window] history tensor
//! - **Deterministic scoring**: weighted sum with a conditional emergent
//!   boost, always clamped to [0, 1]
//! - **Guaranteed catch-all**: no opted-in process is ever dropped at
//!   admission
//! - **Emergency valve**: one switch cedes all selection authority back
//!   to the traditional scheduler without losing bookkeeping
//!
//! ## Safety
//!
//! Nothing in this layer can make a process unschedulable or block the
//! host scheduler indefinitely: selection misses mean "use the
//! traditional path", contended removal degrades to a no-op, and
//! admission never allocates after initialization.

pub mod core;
pub mod monitor;
pub mod sched;
pub mod stats;

// Re-exports
pub use crate::core::config::AttentionConfig;
pub use crate::core::extractor::FeatureExtractor;
pub use crate::core::features::{Feature, FeatureVector, RuntimeStats};
pub use crate::core::scorer::AttentionScorer;
pub use crate::monitor::dump::StateDump;
pub use crate::sched::allocator::AttentionAllocator;
pub use crate::sched::registry::{ProcHandle, RegistryError};
pub use crate::stats::{StatSource, SysinfoStatSource};
