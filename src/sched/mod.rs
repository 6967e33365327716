//! Admission, selection and bookkeeping for attention-based scheduling

pub mod allocator;
pub mod queues;
pub mod registry;
pub mod tensor;

pub use allocator::AttentionAllocator;
pub use queues::{AttentionQueueSet, Bucket};
pub use registry::{CognitiveRecord, ProcHandle, ProcessRegistry, RegistryError};
pub use tensor::AttentionTensor;
