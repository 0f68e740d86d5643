//! Storage layer
//!
//! The link collection is persisted as one JSON blob, rewritten in full after
//! every mutation. The in-memory [`LinkStore`](crate::store::LinkStore) stays
//! authoritative when a write fails.

pub mod error;
pub mod persistence;

pub use error::{IoOp, StorageError, StorageResult};
pub use persistence::{JsonFilePersistence, MemoryPersistence, Persistence, StorageStats};
