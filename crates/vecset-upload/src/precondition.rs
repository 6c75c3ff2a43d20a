//! Index checks that run once before any record is sent

use vecset_core::error::{Result, VecsetError};
use vecset_core::models::{Metric, UploadTarget};
use vecset_store::IndexService;

/// What the precondition check had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPreparation {
    /// The index already existed with a matching dimension
    Existing,
    /// The index was created for this upload
    Created,
}

/// Make sure the target index exists and accepts vectors of `dim`
///
/// With `should_create` an absent index is created; otherwise absence is an
/// `IndexNotFound`. An existing index must report the dataset's dimension.
pub async fn ensure_index_ready(
    service: &dyn IndexService,
    target: &UploadTarget,
    dim: usize,
    metric: Metric,
) -> Result<IndexPreparation> {
    let name = target.index_name.as_str();

    if !service.index_exists(name).await? {
        if !target.should_create {
            return Err(VecsetError::IndexNotFound {
                name: name.to_string(),
            });
        }

        tracing::info!(index = name, dimension = dim, %metric, "Index not found, creating it");
        service.create_index(name, dim, metric).await.map_err(|e| match e {
            err @ VecsetError::IndexCreationFailed { .. } => err,
            other => VecsetError::IndexCreationFailed {
                name: name.to_string(),
                reason: other.to_string(),
            },
        })?;
        return Ok(IndexPreparation::Created);
    }

    let description = service.describe_index(name).await?;
    if description.dimension != dim {
        return Err(VecsetError::DimensionMismatch {
            index: name.to_string(),
            index_dim: description.dimension,
            dataset_dim: dim,
        });
    }

    tracing::debug!(index = name, dimension = dim, "Index exists with matching dimension");
    Ok(IndexPreparation::Existing)
}
