use serde::Serialize;

/// Lifecycle of one upload call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UploadPhase {
    NotStarted,
    CheckingPreconditions,
    Uploading,
    Completed,
    Aborted,
}

impl UploadPhase {
    /// Completed and Aborted admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadPhase::Completed | UploadPhase::Aborted)
    }

    /// Whether `next` is a legal successor of this phase
    pub fn can_transition_to(&self, next: UploadPhase) -> bool {
        use UploadPhase::*;
        matches!(
            (self, next),
            (NotStarted, CheckingPreconditions)
                | (CheckingPreconditions, Uploading)
                | (CheckingPreconditions, Aborted)
                | (Uploading, Completed)
                | (Uploading, Aborted)
        )
    }
}

/// Progress information reported during an upload
#[derive(Debug, Clone)]
pub struct UploadProgress {
    pub phase: UploadPhase,
    pub acknowledged: usize,
    pub total: usize,
    pub message: String,
}

/// A batch that could not be written
#[derive(Debug, Clone, Serialize)]
pub struct FailedBatch {
    /// Position of the batch in emission order
    pub batch_index: usize,

    /// Record identifiers the batch carried
    pub ids: Vec<String>,

    pub error: String,
}

/// Aggregate result of one upload call
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadOutcome {
    /// Records in the dataset
    pub total_records: usize,

    /// Records handed to the index service, including failed batches
    pub total_submitted: usize,

    /// Records the index service acknowledged
    pub total_acknowledged: usize,

    /// Batches acknowledged successfully
    pub batches_succeeded: usize,

    pub failed_batches: Vec<FailedBatch>,

    /// First fatal error observed, if any
    pub first_error: Option<String>,
}

impl UploadOutcome {
    pub fn new(total_records: usize) -> Self {
        Self {
            total_records,
            ..Self::default()
        }
    }

    /// Record an acknowledged batch
    pub fn add_success(&mut self, submitted: usize, acknowledged: usize) {
        self.total_submitted += submitted;
        self.total_acknowledged += acknowledged;
        self.batches_succeeded += 1;
    }

    /// Record a failed batch; the first failure becomes `first_error`
    pub fn add_failure(&mut self, batch: FailedBatch) {
        self.total_submitted += batch.ids.len();
        if self.first_error.is_none() {
            self.first_error = Some(batch.error.clone());
        }
        self.failed_batches.push(batch);
    }

    pub fn failure_count(&self) -> usize {
        self.failed_batches.len()
    }

    /// Every record acknowledged and no batch failed
    pub fn is_complete(&self) -> bool {
        self.failed_batches.is_empty() && self.total_acknowledged == self.total_records
    }
}
