//! In-memory index service for development and testing.
//!
//! These implementations use `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state. For real workloads, use one of the remote adapters.
//!
//! Besides storing vectors, the service counts calls, tracks how many upserts
//! are in flight at once, and can be told to fail upserts on demand.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use vecset_core::error::{Result, VecsetError};
use vecset_core::models::{
    DocumentRecord, IndexDescription, IndexStats, Metric, NamespaceStats, SparseValues,
};

use crate::ports::IndexService;

/// A failure the memory service returns instead of storing a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Reported as `TransientUpload`
    Transient(String),
    /// Reported as `FatalUpload`
    Fatal(String),
}

impl Fault {
    fn to_error(&self) -> VecsetError {
        match self {
            Fault::Transient(reason) => VecsetError::transient(reason.clone()),
            Fault::Fatal(reason) => VecsetError::fatal(reason.clone()),
        }
    }
}

/// A stored vector
#[derive(Debug, Clone)]
pub struct StoredVector {
    pub values: Vec<f32>,
    pub sparse_values: Option<SparseValues>,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone)]
struct MemoryIndex {
    description: IndexDescription,
    namespaces: HashMap<String, HashMap<String, StoredVector>>,
}

/// Decrements the in-flight counter when an upsert finishes, however it finishes
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-memory implementation of IndexService
#[derive(Debug, Clone, Default)]
pub struct MemoryIndexService {
    indexes: Arc<RwLock<HashMap<String, MemoryIndex>>>,
    upserts_per_id: Arc<RwLock<HashMap<String, usize>>>,
    batch_sizes: Arc<Mutex<Vec<usize>>>,
    queued_faults: Arc<Mutex<VecDeque<Fault>>>,
    id_faults: Arc<RwLock<HashMap<String, Fault>>>,
    short_acks: Arc<RwLock<HashMap<String, usize>>>,
    upsert_calls: Arc<AtomicUsize>,
    create_calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    latency: Option<Duration>,
}

impl MemoryIndexService {
    /// Create a new, empty in-memory index service
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every successful upsert, so concurrent calls overlap
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Register an index directly, bypassing `create_index`
    pub fn with_index(self, name: &str, dimension: usize) -> Self {
        self.indexes.write().unwrap().insert(
            name.to_string(),
            MemoryIndex {
                description: IndexDescription {
                    name: name.to_string(),
                    dimension,
                    metric: Metric::Cosine,
                    ready: true,
                },
                namespaces: HashMap::new(),
            },
        );
        self
    }

    /// Fail the next upsert calls, one queued fault per call
    pub fn push_faults(&self, faults: impl IntoIterator<Item = Fault>) {
        self.queued_faults.lock().unwrap().extend(faults);
    }

    /// Fail every upsert whose batch carries this record id
    pub fn fail_batches_containing(&self, id: impl Into<String>, fault: Fault) {
        self.id_faults.write().unwrap().insert(id.into(), fault);
    }

    /// Store batches carrying this record id but acknowledge only `acknowledged` records
    pub fn short_ack_batches_containing(&self, id: impl Into<String>, acknowledged: usize) {
        self.short_acks.write().unwrap().insert(id.into(), acknowledged);
    }

    /// Number of upsert calls received, including failed ones
    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    /// Number of create-index calls received
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Highest number of upserts observed in flight at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// How many times a record id has been written
    pub fn upsert_count(&self, id: &str) -> usize {
        self.upserts_per_id.read().unwrap().get(id).copied().unwrap_or(0)
    }

    /// Sizes of successfully stored batches, in completion order
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }

    /// Fetch a stored vector
    pub fn fetch(&self, index: &str, namespace: &str, id: &str) -> Option<StoredVector> {
        let indexes = self.indexes.read().unwrap();
        indexes.get(index)?.namespaces.get(namespace)?.get(id).cloned()
    }

    fn next_fault(&self, records: &[DocumentRecord]) -> Option<Fault> {
        if let Some(fault) = self.queued_faults.lock().unwrap().pop_front() {
            return Some(fault);
        }

        let id_faults = self.id_faults.read().unwrap();
        if id_faults.is_empty() {
            return None;
        }
        records.iter().find_map(|r| id_faults.get(&r.id).cloned())
    }
}

#[async_trait]
impl IndexService for MemoryIndexService {
    async fn index_exists(&self, name: &str) -> Result<bool> {
        let indexes = self.indexes.read().unwrap();
        Ok(indexes.contains_key(name))
    }

    async fn describe_index(&self, name: &str) -> Result<IndexDescription> {
        let indexes = self.indexes.read().unwrap();
        indexes
            .get(name)
            .map(|index| index.description.clone())
            .ok_or_else(|| VecsetError::IndexNotFound {
                name: name.to_string(),
            })
    }

    async fn create_index(&self, name: &str, dimension: usize, metric: Metric) -> Result<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        let mut indexes = self.indexes.write().unwrap();
        if indexes.contains_key(name) {
            return Err(VecsetError::IndexCreationFailed {
                name: name.to_string(),
                reason: "index already exists".to_string(),
            });
        }

        indexes.insert(
            name.to_string(),
            MemoryIndex {
                description: IndexDescription {
                    name: name.to_string(),
                    dimension,
                    metric,
                    ready: true,
                },
                namespaces: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn upsert(
        &self,
        index: &str,
        namespace: &str,
        records: &[DocumentRecord],
    ) -> Result<usize> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        // Faults are reported before any simulated latency, like a rejected request
        if let Some(fault) = self.next_fault(records) {
            return Err(fault.to_error());
        }

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let mut indexes = self.indexes.write().unwrap();
        let memory_index = indexes.get_mut(index).ok_or_else(|| VecsetError::IndexNotFound {
            name: index.to_string(),
        })?;

        let dimension = memory_index.description.dimension;
        if let Some(bad) = records.iter().find(|r| r.values.len() != dimension) {
            return Err(VecsetError::fatal(format!(
                "vector {} has dimension {}, index {} expects {}",
                bad.id,
                bad.values.len(),
                index,
                dimension
            )));
        }

        let vectors = memory_index.namespaces.entry(namespace.to_string()).or_default();
        let mut upserts = self.upserts_per_id.write().unwrap();
        for record in records {
            vectors.insert(
                record.id.clone(),
                StoredVector {
                    values: record.values.clone(),
                    sparse_values: record.sparse_values.clone(),
                    metadata: record.metadata.clone(),
                },
            );
            *upserts.entry(record.id.clone()).or_default() += 1;
        }

        self.batch_sizes.lock().unwrap().push(records.len());

        let short_acks = self.short_acks.read().unwrap();
        let acknowledged = records
            .iter()
            .find_map(|r| short_acks.get(&r.id).copied())
            .map_or(records.len(), |n| n.min(records.len()));
        Ok(acknowledged)
    }

    async fn describe_index_stats(&self, name: &str) -> Result<IndexStats> {
        let indexes = self.indexes.read().unwrap();
        let index = indexes.get(name).ok_or_else(|| VecsetError::IndexNotFound {
            name: name.to_string(),
        })?;

        let namespaces: BTreeMap<String, NamespaceStats> = index
            .namespaces
            .iter()
            .map(|(ns, vectors)| {
                (
                    ns.clone(),
                    NamespaceStats {
                        vector_count: vectors.len(),
                    },
                )
            })
            .collect();

        Ok(IndexStats {
            dimension: index.description.dimension,
            total_vector_count: namespaces.values().map(|ns| ns.vector_count).sum(),
            namespaces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(ids: &[&str], dim: usize) -> Vec<DocumentRecord> {
        ids.iter().map(|id| DocumentRecord::new(*id, vec![0.5; dim])).collect()
    }

    #[tokio::test]
    async fn test_create_and_describe() {
        let service = MemoryIndexService::new();
        assert!(!service.index_exists("quora").await.unwrap());

        service.create_index("quora", 384, Metric::Cosine).await.unwrap();

        let description = service.describe_index("quora").await.unwrap();
        assert_eq!(description.dimension, 384);
        assert!(description.ready);
        assert_eq!(service.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_create_existing_index_fails() {
        let service = MemoryIndexService::new().with_index("quora", 4);
        let err = service.create_index("quora", 4, Metric::Cosine).await.unwrap_err();
        assert!(matches!(err, VecsetError::IndexCreationFailed { .. }));
    }

    #[tokio::test]
    async fn test_describe_missing_index() {
        let service = MemoryIndexService::new();
        let err = service.describe_index("missing").await.unwrap_err();
        assert!(matches!(err, VecsetError::IndexNotFound { .. }));
    }

    #[tokio::test]
    async fn test_upsert_overwrites_by_id() {
        let service = MemoryIndexService::new().with_index("idx", 2);

        service.upsert("idx", "", &records(&["a", "b"], 2)).await.unwrap();
        service.upsert("idx", "", &records(&["b", "c"], 2)).await.unwrap();

        let stats = service.describe_index_stats("idx").await.unwrap();
        assert_eq!(stats.total_vector_count, 3);
        assert_eq!(service.upsert_count("b"), 2);
        assert_eq!(service.upsert_calls(), 2);
    }

    #[tokio::test]
    async fn test_namespaces_are_counted_separately() {
        let service = MemoryIndexService::new().with_index("idx", 2);

        service.upsert("idx", "", &records(&["a", "b"], 2)).await.unwrap();
        service.upsert("idx", "test", &records(&["a", "b"], 2)).await.unwrap();

        let stats = service.describe_index_stats("idx").await.unwrap();
        assert_eq!(stats.total_vector_count, 4);
        assert_eq!(stats.namespace_count(""), 2);
        assert_eq!(stats.namespace_count("test"), 2);
        assert!(service.fetch("idx", "test", "a").is_some());
    }

    #[tokio::test]
    async fn test_upsert_rejects_wrong_dimension() {
        let service = MemoryIndexService::new().with_index("idx", 3);
        let err = service.upsert("idx", "", &records(&["a"], 2)).await.unwrap_err();

        assert!(matches!(err, VecsetError::FatalUpload { .. }));
        assert_eq!(service.describe_index_stats("idx").await.unwrap().total_vector_count, 0);
    }

    #[tokio::test]
    async fn test_queued_faults_fail_in_order() {
        let service = MemoryIndexService::new().with_index("idx", 1);
        service.push_faults([Fault::Transient("slow down".into()), Fault::Fatal("denied".into())]);

        let first = service.upsert("idx", "", &records(&["a"], 1)).await.unwrap_err();
        let second = service.upsert("idx", "", &records(&["a"], 1)).await.unwrap_err();
        let third = service.upsert("idx", "", &records(&["a"], 1)).await;

        assert!(first.is_transient());
        assert!(matches!(second, VecsetError::FatalUpload { .. }));
        assert_eq!(third.unwrap(), 1);
        assert_eq!(service.upsert_calls(), 3);
    }

    #[tokio::test]
    async fn test_id_fault_only_hits_matching_batches() {
        let service = MemoryIndexService::new().with_index("idx", 1);
        service.fail_batches_containing("poison", Fault::Fatal("rejected".into()));

        assert!(service.upsert("idx", "", &records(&["a", "b"], 1)).await.is_ok());
        assert!(service.upsert("idx", "", &records(&["c", "poison"], 1)).await.is_err());
        assert_eq!(service.upsert_count("c"), 0);
    }

    #[tokio::test]
    async fn test_short_ack_stores_but_undercounts() {
        let service = MemoryIndexService::new().with_index("idx", 1);
        service.short_ack_batches_containing("b", 1);

        assert_eq!(service.upsert("idx", "", &records(&["a"], 1)).await.unwrap(), 1);
        assert_eq!(service.upsert("idx", "", &records(&["b", "c", "d"], 1)).await.unwrap(), 1);
        assert_eq!(service.describe_index_stats("idx").await.unwrap().total_vector_count, 4);
    }

    #[tokio::test]
    async fn test_in_flight_returns_to_zero() {
        let service = MemoryIndexService::new()
            .with_index("idx", 1)
            .with_latency(Duration::from_millis(5));

        let batch_a = records(&["a"], 1);
        let batch_b = records(&["b"], 1);
        let (a, b) = tokio::join!(
            service.upsert("idx", "", &batch_a),
            service.upsert("idx", "", &batch_b)
        );
        assert!(a.is_ok() && b.is_ok());

        assert_eq!(service.max_in_flight(), 2);
        assert_eq!(service.in_flight.load(Ordering::SeqCst), 0);
    }
}
