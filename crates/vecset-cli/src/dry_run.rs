use crate::output::OutputWriter;
use serde::Serialize;
use vecset_core::models::{Dataset, Metric, UploadTarget};
use vecset_upload::Batcher;

/// What an upload would do, derived from the same batcher the upload uses
#[derive(Debug, Clone, Serialize)]
pub struct UploadPlan {
    pub dataset: String,
    pub service: String,
    pub steps: Vec<PlannedStep>,
}

/// One step of an upload, in execution order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlannedStep {
    CheckIndex {
        index: String,
        dimension: usize,
    },
    CreateIndex {
        index: String,
        dimension: usize,
        metric: Metric,
    },
    Upsert {
        namespace: String,
        records: usize,
        batch_size: usize,
        batches: usize,
        last_batch: usize,
        concurrency: usize,
    },
}

impl UploadPlan {
    pub fn new(
        dataset: &Dataset,
        target: &UploadTarget,
        batcher: Batcher<'_>,
        concurrency: usize,
        metric: Metric,
        service: impl Into<String>,
    ) -> Self {
        let mut steps = vec![PlannedStep::CheckIndex {
            index: target.index_name.clone(),
            dimension: dataset.dim(),
        }];

        if target.should_create {
            steps.push(PlannedStep::CreateIndex {
                index: target.index_name.clone(),
                dimension: dataset.dim(),
                metric,
            });
        }

        steps.push(PlannedStep::Upsert {
            namespace: target.namespace_or_root().to_string(),
            records: dataset.len(),
            batch_size: batcher.batch_size(),
            batches: batcher.batch_count(),
            last_batch: batcher.iter().last().map_or(0, |batch| batch.len()),
            concurrency,
        });

        Self {
            dataset: dataset.name().to_string(),
            service: service.into(),
            steps,
        }
    }
}

impl PlannedStep {
    fn describe(&self) -> String {
        match self {
            PlannedStep::CheckIndex { index, dimension } => {
                format!("Check index {} exists with dimension {}", index, dimension)
            }
            PlannedStep::CreateIndex { index, metric, .. } => {
                format!("Create index {} ({}) if it does not exist", index, metric)
            }
            PlannedStep::Upsert {
                namespace,
                records,
                batch_size,
                batches,
                last_batch,
                concurrency,
            } => format!(
                "Upsert {} records into namespace {:?}: {} batches of up to {} (last {}), {} in flight",
                records, namespace, batches, batch_size, last_batch, concurrency
            ),
        }
    }
}

/// Display an upload plan in dry-run mode
pub fn display_plan(output: &OutputWriter, plan: &UploadPlan) -> anyhow::Result<()> {
    if output.is_json() {
        return output.result(serde_json::json!({
            "dry_run": true,
            "plan": plan,
        }));
    }

    output.section(format!("Upload plan for {} ({} service, dry run)", plan.dataset, plan.service));
    for (i, step) in plan.steps.iter().enumerate() {
        output.info(format!("{}. {}", i + 1, step.describe()));
    }
    output.info("No records were sent. Run without --dry-run to upload.");
    Ok(())
}
