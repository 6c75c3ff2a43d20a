//! Port trait definitions
//!
//! These traits define the interfaces that dataset storage adapters must implement.

use crate::error::Result;
use crate::models::{Dataset, DatasetMetadata};

/// Port for reading packaged datasets
pub trait DatasetSource: Send + Sync {
    /// Describe every dataset the source holds
    fn list_metadata(&self) -> Result<Vec<DatasetMetadata>>;

    /// Materialize one dataset's documents and queries
    fn load(&self, dataset_id: &str) -> Result<Dataset>;
}
