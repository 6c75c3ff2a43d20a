//! vecset Store - Dataset storage and index service adapters
//!
//! This crate defines the index service port and provides adapter
//! implementations for local dataset directories, remote index
//! services, and an in-memory index for development and testing.

pub mod local;
pub mod memory;
pub mod ports;
pub mod remote;

pub use local::LocalDatasetStore;
pub use memory::MemoryIndexService;
pub use ports::IndexService;
