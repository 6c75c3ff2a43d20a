//! Dataset catalog
//!
//! A `Catalog` is built once from a [`DatasetSource`] and is read-only after
//! that, so it can be shared freely between readers.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Result, VecsetError};
use crate::models::{Dataset, DatasetMetadata};
use crate::ports::DatasetSource;

pub struct Catalog {
    source: Arc<dyn DatasetSource>,
    entries: BTreeMap<String, DatasetMetadata>,
}

impl Catalog {
    /// Read every dataset descriptor from the source
    pub fn load(source: Arc<dyn DatasetSource>) -> Result<Self> {
        let entries: BTreeMap<String, DatasetMetadata> = source
            .list_metadata()?
            .into_iter()
            .map(|meta| (meta.name.clone(), meta))
            .collect();

        tracing::debug!(datasets = entries.len(), "Catalog loaded");

        Ok(Self { source, entries })
    }

    /// Dataset identifiers in lexical order
    pub fn list_datasets(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Full descriptors in lexical order of identifier
    pub fn list_metadata(&self) -> Vec<&DatasetMetadata> {
        self.entries.values().collect()
    }

    pub fn contains(&self, dataset_id: &str) -> bool {
        self.entries.contains_key(dataset_id)
    }

    pub fn get(&self, dataset_id: &str) -> Option<&DatasetMetadata> {
        self.entries.get(dataset_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a dataset listed in the catalog
    pub fn load_dataset(&self, dataset_id: &str) -> Result<Dataset> {
        if !self.contains(dataset_id) {
            return Err(VecsetError::DatasetNotFound {
                name: dataset_id.to_string(),
            });
        }

        let dataset = self.source.load(dataset_id)?;
        tracing::info!(
            dataset = dataset_id,
            documents = dataset.len(),
            queries = dataset.queries().len(),
            dim = dataset.dim(),
            "Dataset loaded"
        );
        Ok(dataset)
    }
}
