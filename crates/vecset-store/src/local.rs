//! Dataset storage on the local filesystem
//!
//! Layout, one directory per dataset under the catalog root:
//!
//! ```text
//! <root>/<dataset>/metadata.json
//! <root>/<dataset>/documents.jsonl
//! <root>/<dataset>/queries.jsonl      (optional)
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use vecset_core::error::{Result, VecsetError};
use vecset_core::models::{Dataset, DatasetMetadata, DocumentRecord, QueryRecord};
use vecset_core::ports::DatasetSource;

const METADATA_FILE: &str = "metadata.json";
const DOCUMENTS_FILE: &str = "documents.jsonl";
const QUERIES_FILE: &str = "queries.jsonl";

/// Filesystem-backed dataset store
#[derive(Debug, Clone)]
pub struct LocalDatasetStore {
    root: PathBuf,
}

impl LocalDatasetStore {
    /// Open a catalog directory, which must already exist
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(VecsetError::CatalogNotFound { path: root });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a dataset in the catalog layout, replacing any previous copy
    pub fn save(&self, dataset: &Dataset) -> Result<PathBuf> {
        let dir = self.dataset_dir(dataset.name())?;
        fs::create_dir_all(&dir)?;

        let metadata = serde_json::to_string_pretty(dataset.metadata())?;
        fs::write(dir.join(METADATA_FILE), metadata)?;

        write_jsonl(&dir.join(DOCUMENTS_FILE), dataset.documents())?;

        let queries_path = dir.join(QUERIES_FILE);
        if dataset.queries().is_empty() {
            if queries_path.exists() {
                fs::remove_file(&queries_path)?;
            }
        } else {
            write_jsonl(&queries_path, dataset.queries())?;
        }

        tracing::debug!(dataset = dataset.name(), path = %dir.display(), "Dataset saved");
        Ok(dir)
    }

    /// Resolve a dataset id to its directory, refusing ids that escape the root
    fn dataset_dir(&self, dataset_id: &str) -> Result<PathBuf> {
        let invalid = dataset_id.is_empty()
            || dataset_id == "."
            || dataset_id == ".."
            || dataset_id.contains(|c: char| c == '/' || c == '\\');

        if invalid {
            return Err(VecsetError::DatasetNotFound {
                name: dataset_id.to_string(),
            });
        }
        Ok(self.root.join(dataset_id))
    }

    fn read_metadata(path: &Path) -> Result<DatasetMetadata> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            VecsetError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

impl DatasetSource for LocalDatasetStore {
    fn list_metadata(&self) -> Result<Vec<DatasetMetadata>> {
        let mut datasets = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let metadata_path = path.join(METADATA_FILE);
            if !path.is_dir() || !metadata_path.is_file() {
                continue;
            }

            let dir_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            match Self::read_metadata(&metadata_path) {
                // Datasets are loaded by directory, so the two must agree
                Ok(metadata) if metadata.name != dir_name => tracing::warn!(
                    path = %metadata_path.display(),
                    name = %metadata.name,
                    directory = dir_name,
                    "Skipping dataset whose name does not match its directory"
                ),
                Ok(metadata) => datasets.push(metadata),
                Err(e) => tracing::warn!(
                    path = %metadata_path.display(),
                    error = %e,
                    "Skipping dataset with unreadable metadata"
                ),
            }
        }

        datasets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(datasets)
    }

    fn load(&self, dataset_id: &str) -> Result<Dataset> {
        let dir = self.dataset_dir(dataset_id)?;
        let metadata_path = dir.join(METADATA_FILE);
        if !metadata_path.is_file() {
            return Err(VecsetError::DatasetNotFound {
                name: dataset_id.to_string(),
            });
        }

        let metadata = Self::read_metadata(&metadata_path)?;
        let documents: Vec<DocumentRecord> = read_jsonl(&dir.join(DOCUMENTS_FILE))?;

        let queries_path = dir.join(QUERIES_FILE);
        let queries: Vec<QueryRecord> =
            if queries_path.is_file() { read_jsonl(&queries_path)? } else { Vec::new() };

        Dataset::new(metadata, documents, queries)
    }
}

/// Read one JSON value per non-blank line
fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let reader = BufReader::new(File::open(path)?);
    let mut items = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let item = serde_json::from_str(&line).map_err(|e| {
            VecsetError::Serialization(format!(
                "{} line {}: {}",
                path.display(),
                line_no + 1,
                e
            ))
        })?;
        items.push(item);
    }

    Ok(items)
}

fn write_jsonl<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for item in items {
        serde_json::to_writer(&mut writer, item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
