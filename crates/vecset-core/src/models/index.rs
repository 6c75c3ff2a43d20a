use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, VecsetError};

/// Similarity metric used when creating an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Cosine,
    Euclidean,
    Dotproduct,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Cosine => "cosine",
            Metric::Euclidean => "euclidean",
            Metric::Dotproduct => "dotproduct",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Metric {
    type Err = VecsetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(Metric::Cosine),
            "euclidean" => Ok(Metric::Euclidean),
            "dotproduct" | "dot" => Ok(Metric::Dotproduct),
            _ => Err(VecsetError::ConfigInvalid {
                key: "metric".to_string(),
                reason: format!("Invalid metric: {}. Use cosine, euclidean, or dotproduct", s),
            }),
        }
    }
}

/// What the index service reports about an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub dimension: usize,
    pub metric: Metric,
    pub ready: bool,
}

/// Per-namespace vector counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NamespaceStats {
    pub vector_count: usize,
}

/// Index-wide vector counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IndexStats {
    pub dimension: usize,
    pub total_vector_count: usize,

    /// Keyed by namespace; the root namespace is `""`
    pub namespaces: BTreeMap<String, NamespaceStats>,
}

impl IndexStats {
    pub fn namespace_count(&self, namespace: &str) -> usize {
        self.namespaces.get(namespace).map(|ns| ns.vector_count).unwrap_or(0)
    }
}

/// Where an upload goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub index_name: String,

    /// Logical partition; `None` writes to the root namespace
    pub namespace: Option<String>,

    /// Create the index when it does not exist
    pub should_create: bool,
}

impl UploadTarget {
    /// Target the root namespace, creating the index if needed
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            namespace: None,
            should_create: true,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn existing_only(mut self) -> Self {
        self.should_create = false;
        self
    }

    /// Namespace as sent on the wire
    pub fn namespace_or_root(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_parse() {
        assert_eq!("cosine".parse::<Metric>().unwrap(), Metric::Cosine);
        assert_eq!("DOT".parse::<Metric>().unwrap(), Metric::Dotproduct);
        assert!("manhattan".parse::<Metric>().is_err());
    }

    #[test]
    fn test_upload_target_defaults_to_root_namespace() {
        let target = UploadTarget::new("quora");
        assert!(target.should_create);
        assert_eq!(target.namespace_or_root(), "");

        let target = target.with_namespace("test").existing_only();
        assert!(!target.should_create);
        assert_eq!(target.namespace_or_root(), "test");
    }

    #[test]
    fn test_namespace_count_missing_is_zero() {
        let stats = IndexStats::default();
        assert_eq!(stats.namespace_count("nope"), 0);
    }
}
