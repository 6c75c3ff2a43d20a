//! Bounded-concurrency upsert of batches

use futures::future;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use vecset_core::error::{Result, VecsetError};
use vecset_core::models::{FailedBatch, UploadOutcome};
use vecset_store::IndexService;

use crate::batcher::{Batch, Batcher};
use crate::retry::RetryPolicy;

/// Issues one upsert per batch with at most `concurrency` in flight
///
/// Results are aggregated by a single consumer as they complete. After the
/// first non-retryable failure no further batch is dispatched, while batches
/// already in flight run to completion and are counted.
pub struct UploadPool<'a> {
    service: &'a dyn IndexService,
    index: &'a str,
    namespace: &'a str,
    concurrency: usize,
    retry: RetryPolicy,
}

impl<'a> UploadPool<'a> {
    pub fn new(
        service: &'a dyn IndexService,
        index: &'a str,
        namespace: &'a str,
        concurrency: usize,
    ) -> Result<Self> {
        if concurrency == 0 {
            return Err(VecsetError::invalid_configuration("concurrency must be greater than 0"));
        }
        Ok(Self {
            service,
            index,
            namespace,
            concurrency,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Upload every batch, calling `on_batch` after each one settles
    ///
    /// Returns the aggregated outcome and the first fatal error, if any.
    pub async fn run<F>(
        &self,
        batcher: Batcher<'_>,
        total_records: usize,
        mut on_batch: F,
    ) -> (UploadOutcome, Option<VecsetError>)
    where
        F: FnMut(&UploadOutcome),
    {
        let aborted = AtomicBool::new(false);
        let mut outcome = UploadOutcome::new(total_records);
        let mut first_error = None;

        // The abort flag is checked each time the buffer refills
        let results = stream::iter(batcher.iter())
            .take_while(|_| future::ready(!aborted.load(Ordering::SeqCst)))
            .map(|batch| self.upsert_with_retry(batch))
            .buffer_unordered(self.concurrency);
        let mut results = std::pin::pin!(results);

        while let Some((batch, result)) = results.next().await {
            match result {
                Ok(acknowledged) => {
                    tracing::debug!(batch = batch.index, records = batch.len(), acknowledged, "Batch upserted");
                    outcome.add_success(batch.len(), acknowledged);
                }
                Err(e) => {
                    aborted.store(true, Ordering::SeqCst);
                    tracing::error!(batch = batch.index, records = batch.len(), error = %e, "Batch failed");
                    outcome.add_failure(FailedBatch {
                        batch_index: batch.index,
                        ids: batch.ids(),
                        error: e.to_string(),
                    });
                    first_error.get_or_insert(e);
                }
            }
            on_batch(&outcome);
        }

        (outcome, first_error)
    }

    async fn upsert_with_retry<'b>(&self, batch: Batch<'b>) -> (Batch<'b>, Result<usize>) {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let error = match self.service.upsert(self.index, self.namespace, batch.records).await {
                Ok(acknowledged) if acknowledged == batch.len() => return (batch, Ok(acknowledged)),
                // Short acknowledgements are not retried
                Ok(acknowledged) => {
                    let short = VecsetError::fatal(format!(
                        "batch {} acknowledged {} of {} records",
                        batch.index,
                        acknowledged,
                        batch.len()
                    ));
                    return (batch, Err(short));
                }
                Err(e) => e,
            };

            if !error.is_transient() {
                return (batch, Err(error));
            }

            if attempt >= self.retry.max_attempts {
                let escalated = VecsetError::fatal(format!(
                    "retries exhausted after {} attempts: {}",
                    attempt, error
                ));
                return (batch, Err(escalated));
            }

            let backoff = self.retry.backoff(attempt - 1);
            tracing::warn!(
                batch = batch.index,
                attempt,
                max_attempts = self.retry.max_attempts,
                backoff_ms = backoff.as_millis() as u64,
                error = %error,
                "Transient upsert failure, retrying"
            );
            tokio::time::sleep(backoff).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vecset_core::models::DocumentRecord;
    use vecset_store::memory::Fault;
    use vecset_store::MemoryIndexService;

    fn records(n: usize) -> Vec<DocumentRecord> {
        (0..n).map(|i| DocumentRecord::new(i.to_string(), vec![0.1, 0.2])).collect()
    }

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
        }
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let service = MemoryIndexService::new();
        let err = UploadPool::new(&service, "idx", "", 0).err().unwrap();
        assert!(matches!(err, VecsetError::InvalidConfiguration { .. }));
    }

    #[tokio::test]
    async fn test_all_batches_acknowledged() {
        let service = MemoryIndexService::new().with_index("idx", 2);
        let data = records(25);
        let pool = UploadPool::new(&service, "idx", "", 3).unwrap();

        let mut calls = 0;
        let (outcome, error) =
            pool.run(Batcher::new(&data, 10).unwrap(), data.len(), |_| calls += 1).await;

        assert!(error.is_none());
        assert_eq!(outcome.total_acknowledged, 25);
        assert_eq!(outcome.batches_succeeded, 3);
        assert_eq!(calls, 3);
        assert!(outcome.is_complete());
    }

    #[tokio::test]
    async fn test_transient_failure_retried() {
        let service = MemoryIndexService::new().with_index("idx", 2);
        service.push_faults([Fault::Transient("429".into()), Fault::Transient("503".into())]);
        let data = records(4);
        let pool = UploadPool::new(&service, "idx", "", 1).unwrap().with_retry(fast_retry(3));

        let (outcome, error) = pool.run(Batcher::new(&data, 4).unwrap(), 4, |_| {}).await;

        assert!(error.is_none());
        assert_eq!(outcome.total_acknowledged, 4);
        assert_eq!(service.upsert_calls(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_retries_become_fatal() {
        let service = MemoryIndexService::new().with_index("idx", 2);
        service.fail_batches_containing("0", Fault::Transient("503".into()));
        let data = records(2);
        let pool = UploadPool::new(&service, "idx", "", 1).unwrap().with_retry(fast_retry(3));

        let (outcome, error) = pool.run(Batcher::new(&data, 2).unwrap(), 2, |_| {}).await;

        let error = error.unwrap();
        assert!(matches!(error, VecsetError::FatalUpload { .. }));
        assert!(error.to_string().contains("after 3 attempts"));
        assert_eq!(service.upsert_calls(), 3);
        assert_eq!(outcome.failed_batches[0].ids, vec!["0", "1"]);
    }

    #[tokio::test]
    async fn test_fatal_failure_not_retried() {
        let service = MemoryIndexService::new().with_index("idx", 2);
        service.push_faults([Fault::Fatal("401".into())]);
        let data = records(2);
        let pool = UploadPool::new(&service, "idx", "", 1).unwrap().with_retry(fast_retry(5));

        let (_, error) = pool.run(Batcher::new(&data, 2).unwrap(), 2, |_| {}).await;

        assert!(matches!(error, Some(VecsetError::FatalUpload { .. })));
        assert_eq!(service.upsert_calls(), 1);
    }

    #[tokio::test]
    async fn test_short_acknowledgement_is_fatal() {
        let service = MemoryIndexService::new().with_index("idx", 2);
        service.short_ack_batches_containing("5", 2);
        let data = records(15);
        let pool = UploadPool::new(&service, "idx", "", 1).unwrap().with_retry(fast_retry(3));

        let (outcome, error) = pool.run(Batcher::new(&data, 5).unwrap(), 15, |_| {}).await;

        let error = error.unwrap();
        assert!(matches!(error, VecsetError::FatalUpload { .. }));
        assert!(error.to_string().contains("batch 1 acknowledged 2 of 5 records"));
        assert_eq!(service.upsert_calls(), 2);
        assert_eq!(outcome.total_acknowledged, 5);
        assert_eq!(outcome.failed_batches[0].ids, vec!["5", "6", "7", "8", "9"]);
        assert!(!outcome.is_complete());
    }
}
