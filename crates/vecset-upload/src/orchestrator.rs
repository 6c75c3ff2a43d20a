use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;
use vecset_core::error::{Result, VecsetError};
use vecset_core::models::{Dataset, Metric, UploadOutcome, UploadPhase, UploadProgress, UploadTarget};
use vecset_store::IndexService;

use crate::batcher::Batcher;
use crate::pool::UploadPool;
use crate::precondition::ensure_index_ready;
use crate::retry::RetryPolicy;

/// Uploads datasets into an index service
///
/// One call checks the index once, then streams every batch through a
/// bounded pool. Repeating a call is safe: records are upserted by id.
pub struct Uploader {
    service: Arc<dyn IndexService>,
    retry: RetryPolicy,
    metric: Metric,
}

impl Uploader {
    pub fn new(service: Arc<dyn IndexService>) -> Self {
        Self {
            service,
            retry: RetryPolicy::default(),
            metric: Metric::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Metric used when the index has to be created
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub async fn upload(
        &self,
        dataset: &Dataset,
        target: &UploadTarget,
        batch_size: usize,
        concurrency: usize,
    ) -> Result<UploadOutcome> {
        self.upload_with_progress(dataset, target, batch_size, concurrency, |_| {}).await
    }

    /// Upload with progress reporting
    ///
    /// `progress` sees every phase change and one update per settled batch.
    pub async fn upload_with_progress<F>(
        &self,
        dataset: &Dataset,
        target: &UploadTarget,
        batch_size: usize,
        concurrency: usize,
        progress: F,
    ) -> Result<UploadOutcome>
    where
        F: FnMut(UploadProgress),
    {
        let upload_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "upload",
            %upload_id,
            dataset = dataset.name(),
            index = %target.index_name,
            namespace = target.namespace_or_root()
        );

        self.run(dataset, target, batch_size, concurrency, progress).instrument(span).await
    }

    async fn run<F>(
        &self,
        dataset: &Dataset,
        target: &UploadTarget,
        batch_size: usize,
        concurrency: usize,
        progress: F,
    ) -> Result<UploadOutcome>
    where
        F: FnMut(UploadProgress),
    {
        let batcher = Batcher::new(dataset.documents(), batch_size)?;
        let pool = UploadPool::new(
            self.service.as_ref(),
            &target.index_name,
            target.namespace_or_root(),
            concurrency,
        )?
        .with_retry(self.retry);

        let total = dataset.len();
        let mut phases = PhaseTracker::new(total, progress);

        phases.advance(UploadPhase::CheckingPreconditions, 0, "Checking index");
        if let Err(e) = ensure_index_ready(self.service.as_ref(), target, dataset.dim(), self.metric).await {
            phases.advance(UploadPhase::Aborted, 0, &e.to_string());
            return Err(e);
        }

        phases.advance(
            UploadPhase::Uploading,
            0,
            &format!("Uploading {} records in {} batches", total, batcher.batch_count()),
        );

        let (outcome, error) = pool
            .run(batcher, total, |outcome| phases.report(outcome.total_acknowledged))
            .await;

        match error {
            None => {
                phases.advance(UploadPhase::Completed, outcome.total_acknowledged, "Upload complete");
                tracing::info!(
                    acknowledged = outcome.total_acknowledged,
                    batches = outcome.batches_succeeded,
                    "Upload completed"
                );
                Ok(outcome)
            }
            Some(source) => {
                phases.advance(UploadPhase::Aborted, outcome.total_acknowledged, &source.to_string());
                tracing::error!(
                    acknowledged = outcome.total_acknowledged,
                    failed_batches = outcome.failure_count(),
                    error = %source,
                    "Upload aborted"
                );
                Err(VecsetError::UploadAborted {
                    source: Box::new(source),
                    outcome: Box::new(outcome),
                })
            }
        }
    }
}

/// Walks the upload state machine and forwards each step to the callback
struct PhaseTracker<F> {
    phase: UploadPhase,
    total: usize,
    progress: F,
}

impl<F: FnMut(UploadProgress)> PhaseTracker<F> {
    fn new(total: usize, progress: F) -> Self {
        Self {
            phase: UploadPhase::NotStarted,
            total,
            progress,
        }
    }

    fn advance(&mut self, next: UploadPhase, acknowledged: usize, message: &str) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal upload transition {:?} -> {:?}",
            self.phase,
            next
        );
        tracing::info!(from = ?self.phase, to = ?next, "Upload phase changed");
        self.phase = next;
        self.emit(acknowledged, message.to_string());
    }

    fn report(&mut self, acknowledged: usize) {
        self.emit(acknowledged, format!("{}/{} records acknowledged", acknowledged, self.total));
    }

    fn emit(&mut self, acknowledged: usize, message: String) {
        (self.progress)(UploadProgress {
            phase: self.phase,
            acknowledged,
            total: self.total,
            message,
        });
    }
}

/// Upload a dataset into `index_name`
///
/// Uses the default retry policy and metric. The root namespace is used when
/// `namespace` is `None`.
pub async fn upload(
    dataset: &Dataset,
    service: Arc<dyn IndexService>,
    index_name: &str,
    batch_size: usize,
    concurrency: usize,
    should_create: bool,
    namespace: Option<&str>,
) -> Result<UploadOutcome> {
    let mut target = UploadTarget::new(index_name);
    target.should_create = should_create;
    target.namespace = namespace.map(str::to_string);

    Uploader::new(service).upload(dataset, &target, batch_size, concurrency).await
}
