//! Error types for vecset

use std::path::PathBuf;
use thiserror::Error;

use crate::models::UploadOutcome;

#[derive(Debug, Error)]
pub enum VecsetError {
    // Caller errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    // Catalog and dataset errors
    #[error("Dataset not found in catalog: {name}")]
    DatasetNotFound { name: String },

    #[error("Invalid dataset {name}: {reason}")]
    InvalidDataset { name: String, reason: String },

    #[error("Catalog directory not found at {path}")]
    CatalogNotFound { path: PathBuf },

    // Index precondition errors
    #[error("Index not found: {name}")]
    IndexNotFound { name: String },

    #[error("Dimension mismatch for index {index}: index has {index_dim}, dataset has {dataset_dim}")]
    DimensionMismatch {
        index: String,
        index_dim: usize,
        dataset_dim: usize,
    },

    #[error("Failed to create index {name}: {reason}")]
    IndexCreationFailed { name: String, reason: String },

    // Upload errors
    #[error("Transient upload error: {reason}")]
    TransientUpload { reason: String },

    #[error("Fatal upload error: {reason}")]
    FatalUpload { reason: String },

    #[error("Upload aborted after {} of {} records acknowledged: {source}", outcome.total_acknowledged, outcome.total_records)]
    UploadAborted {
        #[source]
        source: Box<VecsetError>,
        outcome: Box<UploadOutcome>,
    },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl VecsetError {
    /// Whether a failed request may succeed if issued again unchanged
    pub fn is_transient(&self) -> bool {
        matches!(self, VecsetError::TransientUpload { .. })
    }

    /// Partial progress attached to an aborted upload
    pub fn outcome(&self) -> Option<&UploadOutcome> {
        match self {
            VecsetError::UploadAborted { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// The underlying error kind, looking through `UploadAborted`
    pub fn root(&self) -> &VecsetError {
        match self {
            VecsetError::UploadAborted { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        VecsetError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub fn transient(reason: impl Into<String>) -> Self {
        VecsetError::TransientUpload {
            reason: reason.into(),
        }
    }

    pub fn fatal(reason: impl Into<String>) -> Self {
        VecsetError::FatalUpload {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for VecsetError {
    fn from(err: serde_json::Error) -> Self {
        VecsetError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VecsetError>;
