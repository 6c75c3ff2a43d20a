pub mod dataset;
pub mod index;
pub mod record;
pub mod upload;

pub use dataset::{Dataset, DatasetMetadata, DenseModelMetadata, SparseModelMetadata};
pub use index::{IndexDescription, IndexStats, Metric, NamespaceStats, UploadTarget};
pub use record::{DocumentRecord, QueryRecord, SparseValues};
pub use upload::{FailedBatch, UploadOutcome, UploadPhase, UploadProgress};
