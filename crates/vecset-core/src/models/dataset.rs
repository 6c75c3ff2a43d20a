use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::record::{DocumentRecord, QueryRecord};
use crate::error::{Result, VecsetError};

/// Dense embedding model that produced a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseModelMetadata {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer: Option<String>,

    pub dimension: usize,
}

/// Sparse embedding model that produced a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseModelMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer: Option<String>,
}

/// Catalog entry describing a packaged dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Dataset identifier
    pub name: String,

    /// Creation timestamp as written by the packager
    pub created_at: String,

    /// Number of documents
    pub documents: usize,

    /// Number of queries
    #[serde(default)]
    pub queries: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,

    pub dense_model: DenseModelMetadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparse_model: Option<SparseModelMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<HashMap<String, serde_json::Value>>,
}

impl DatasetMetadata {
    /// Minimal metadata for a freshly packaged dataset
    pub fn new(name: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            created_at: Utc::now().to_rfc3339(),
            documents: 0,
            queries: 0,
            source: None,
            license: None,
            bucket: None,
            task: None,
            dense_model: DenseModelMetadata {
                name: model.into(),
                tokenizer: None,
                dimension,
            },
            sparse_model: None,
            description: None,
            tags: None,
            args: None,
        }
    }
}

/// A loaded dataset: documents to index plus optional evaluation queries.
///
/// All document vectors share one dimension, checked when the dataset is built
/// and fixed for its lifetime.
#[derive(Debug, Clone)]
pub struct Dataset {
    metadata: DatasetMetadata,
    documents: Vec<DocumentRecord>,
    queries: Vec<QueryRecord>,
    dim: usize,
}

impl Dataset {
    /// Build a dataset, validating vector dimensions against the metadata
    pub fn new(
        mut metadata: DatasetMetadata,
        documents: Vec<DocumentRecord>,
        queries: Vec<QueryRecord>,
    ) -> Result<Self> {
        let dim = metadata.dense_model.dimension;

        if dim == 0 {
            return Err(VecsetError::InvalidDataset {
                name: metadata.name.clone(),
                reason: "dense model dimension must be positive".to_string(),
            });
        }

        for document in &documents {
            if document.values.len() != dim {
                return Err(VecsetError::InvalidDataset {
                    name: metadata.name.clone(),
                    reason: format!(
                        "document {} has dimension {}, expected {}",
                        document.id,
                        document.values.len(),
                        dim
                    ),
                });
            }

            if let Some(ref sparse) = document.sparse_values {
                if !sparse.is_well_formed() {
                    return Err(VecsetError::InvalidDataset {
                        name: metadata.name.clone(),
                        reason: format!(
                            "document {} has {} sparse indices but {} sparse values",
                            document.id,
                            sparse.indices.len(),
                            sparse.values.len()
                        ),
                    });
                }
            }
        }

        metadata.documents = documents.len();
        metadata.queries = queries.len();

        Ok(Self {
            metadata,
            documents,
            queries,
            dim,
        })
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    /// Dense vector dimension shared by every document
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }

    pub fn queries(&self) -> &[QueryRecord] {
        &self.queries
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// First `n` documents
    pub fn head(&self, n: usize) -> &[DocumentRecord] {
        &self.documents[..n.min(self.documents.len())]
    }

    /// Iterate documents in fixed-size chunks; a zero size yields single records
    pub fn iter_documents(&self, batch_size: usize) -> std::slice::Chunks<'_, DocumentRecord> {
        self.documents.chunks(batch_size.max(1))
    }
}
