//! Diagnostics and introspection

pub mod dump;

pub use dump::{BucketDump, ProcessDump, StateDump, TensorDump};
