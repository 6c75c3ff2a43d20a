use serde::Serialize;
use tabled::Tabled;
use vecset_core::models::{DatasetMetadata, UploadOutcome};

/// One row of the list command
#[derive(Debug, Serialize, Tabled)]
pub struct DatasetRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Documents")]
    pub documents: usize,
    #[tabled(rename = "Queries")]
    pub queries: usize,
    #[tabled(rename = "Dim")]
    pub dimension: usize,
    #[tabled(rename = "Model")]
    pub model: String,
    #[tabled(rename = "Created")]
    pub created_at: String,
}

impl From<&DatasetMetadata> for DatasetRow {
    fn from(meta: &DatasetMetadata) -> Self {
        Self {
            name: meta.name.clone(),
            documents: meta.documents,
            queries: meta.queries,
            dimension: meta.dense_model.dimension,
            model: meta.dense_model.name.clone(),
            created_at: meta.created_at.clone(),
        }
    }
}

/// Output for the upload command
#[derive(Debug, Serialize)]
pub struct UploadOutput {
    pub dataset: String,
    pub index: String,
    pub namespace: String,
    pub outcome: UploadOutcome,
}

/// One row of the stats command
#[derive(Debug, Serialize, Tabled)]
pub struct NamespaceRow {
    #[tabled(rename = "Namespace")]
    pub namespace: String,
    #[tabled(rename = "Vectors")]
    pub vector_count: usize,
}

/// One row of the config command
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}
