//! Catalog over a dataset directory on disk

use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use vecset_core::error::VecsetError;
use vecset_core::models::{Dataset, DatasetMetadata, DocumentRecord, SparseValues};
use vecset_core::Catalog;
use vecset_store::LocalDatasetStore;

fn write_dataset(store: &LocalDatasetStore, name: &str, n: usize, dim: usize) {
    let documents = (0..n)
        .map(|i| {
            DocumentRecord::new(format!("{}-{}", name, i), vec![0.25; dim])
                .with_sparse(SparseValues::new(vec![i as u32], vec![1.0]))
        })
        .collect();

    let mut metadata = DatasetMetadata::new(name, "all-MiniLM-L6-v2", dim);
    metadata.source = Some("https://example.org/source".to_string());
    metadata.tags = Some(vec!["test".to_string()]);

    store.save(&Dataset::new(metadata, documents, Vec::new()).unwrap()).unwrap();
}

#[test]
fn test_catalog_lists_and_loads() {
    let dir = TempDir::new().unwrap();
    let store = LocalDatasetStore::open(dir.path()).unwrap();
    write_dataset(&store, "quora-small", 12, 8);
    write_dataset(&store, "beir-small", 3, 4);

    let catalog = Catalog::load(Arc::new(store)).unwrap();

    assert_eq!(catalog.list_datasets(), vec!["beir-small", "quora-small"]);
    assert_eq!(catalog.get("quora-small").unwrap().documents, 12);

    let dataset = catalog.load_dataset("quora-small").unwrap();
    assert_eq!(dataset.dim(), 8);
    assert_eq!(dataset.len(), 12);
    assert_eq!(dataset.head(2).len(), 2);
    assert_eq!(dataset.iter_documents(5).count(), 3);
    assert!(dataset.documents()[3].sparse_values.is_some());
}

#[test]
fn test_unknown_dataset() {
    let dir = TempDir::new().unwrap();
    let store = LocalDatasetStore::open(dir.path()).unwrap();
    write_dataset(&store, "quora-small", 2, 4);

    let catalog = Catalog::load(Arc::new(store)).unwrap();
    let err = catalog.load_dataset("does-not-exist").unwrap_err();

    assert!(matches!(err, VecsetError::DatasetNotFound { .. }));
}

#[test]
fn test_dimension_drift_on_disk_is_rejected() {
    let dir = TempDir::new().unwrap();
    let store = LocalDatasetStore::open(dir.path()).unwrap();
    write_dataset(&store, "drifted", 2, 4);

    fs::write(
        dir.path().join("drifted").join("documents.jsonl"),
        "{\"id\":\"a\",\"values\":[0.1,0.2,0.3,0.4]}\n{\"id\":\"b\",\"values\":[0.1,0.2]}\n",
    )
    .unwrap();

    let catalog = Catalog::load(Arc::new(store)).unwrap();
    let err = catalog.load_dataset("drifted").unwrap_err();
    assert!(matches!(err, VecsetError::InvalidDataset { .. }));
}

#[test]
fn test_renamed_directory_is_not_listed() {
    let dir = TempDir::new().unwrap();
    let store = LocalDatasetStore::open(dir.path()).unwrap();
    write_dataset(&store, "quora-small", 2, 4);
    write_dataset(&store, "original", 2, 4);
    fs::rename(dir.path().join("original"), dir.path().join("renamed")).unwrap();

    let catalog = Catalog::load(Arc::new(store)).unwrap();

    assert_eq!(catalog.list_datasets(), vec!["quora-small"]);
    for id in catalog.list_datasets() {
        assert!(catalog.load_dataset(id).is_ok());
    }
}
