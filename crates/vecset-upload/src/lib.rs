//! vecset Upload - Bulk upload of datasets into vector indexes
//!
//! This crate checks the target index, splits a dataset into batches and
//! upserts them through a bounded pool with retry on transient failures.

pub mod batcher;
pub mod orchestrator;
pub mod pool;
pub mod precondition;
pub mod retry;

pub use batcher::{Batch, Batcher};
pub use orchestrator::{upload, Uploader};
pub use pool::UploadPool;
pub use precondition::{ensure_index_ready, IndexPreparation};
pub use retry::RetryPolicy;
