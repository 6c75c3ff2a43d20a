use serde::{Deserialize, Serialize};

/// Sparse vector as parallel index/value arrays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SparseValues {
    pub indices: Vec<u32>,
    pub values: Vec<f32>,
}

impl SparseValues {
    pub fn new(indices: Vec<u32>, values: Vec<f32>) -> Self {
        Self { indices, values }
    }

    /// Indices and values must pair up one to one
    pub fn is_well_formed(&self) -> bool {
        self.indices.len() == self.values.len()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// A vector to be indexed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Identifier, unique within the dataset
    pub id: String,

    /// Dense embedding
    pub values: Vec<f32>,

    /// Optional sparse embedding for hybrid search
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparse_values: Option<SparseValues>,

    /// Filterable metadata (scalars or lists of strings)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,

    /// Arbitrary payload kept alongside the record, never uploaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<serde_json::Value>,
}

impl DocumentRecord {
    /// Create a dense-only record
    pub fn new(id: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            values,
            sparse_values: None,
            metadata: None,
            blob: None,
        }
    }

    pub fn with_sparse(mut self, sparse: SparseValues) -> Self {
        self.sparse_values = Some(sparse);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Map<String, serde_json::Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }
}

/// A query vector shipped with a dataset for evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub vector: Vec<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparse_vector: Option<SparseValues>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<serde_json::Value>,

    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob: Option<serde_json::Value>,
}

fn default_top_k() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_record_deserializes_without_optionals() {
        let record: DocumentRecord =
            serde_json::from_str(r#"{"id":"1","values":[0.1,0.2,0.3]}"#).unwrap();

        assert_eq!(record.id, "1");
        assert_eq!(record.dimension(), 3);
        assert!(record.sparse_values.is_none());
        assert!(record.metadata.is_none());
    }

    #[test]
    fn test_query_record_defaults_top_k() {
        let query: QueryRecord = serde_json::from_str(r#"{"vector":[1.0,0.0]}"#).unwrap();
        assert_eq!(query.top_k, 10);
    }

    #[test]
    fn test_sparse_values_well_formed() {
        assert!(SparseValues::new(vec![1, 5], vec![0.5, 0.25]).is_well_formed());
        assert!(!SparseValues::new(vec![1], vec![0.5, 0.25]).is_well_formed());
    }
}
