use super::open_catalog;
use crate::cli::{ServiceBackend, UploadArgs};
use crate::config_loader::load_config_with_overrides;
use crate::dry_run::{display_plan, UploadPlan};
use crate::output::OutputWriter;
use crate::output_types::UploadOutput;
use crate::progress::UploadProgressDisplay;
use crate::service;
use anyhow::Result;
use std::path::PathBuf;
use vecset_core::config::CliConfigOverrides;
use vecset_core::models::UploadTarget;
use vecset_upload::{Batcher, RetryPolicy, Uploader};

pub async fn execute(
    args: UploadArgs,
    output: &OutputWriter,
    catalog_root: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    let config = load_config_with_overrides(CliConfigOverrides {
        catalog_root,
        batch_size: args.batch_size,
        concurrency: args.concurrency,
        metric: args.metric,
    })?;

    let catalog = open_catalog(&config)?;
    let dataset = catalog.load_dataset(&args.dataset)?;

    let mut target = UploadTarget::new(&args.index);
    target.namespace = args.namespace.clone();
    target.should_create = !args.no_create;

    let batch_size = config.batch_size.value;
    let concurrency = config.concurrency.value;

    if dry_run {
        let batcher = Batcher::new(dataset.documents(), batch_size)?;
        let backend = format!("{:?}", args.service).to_lowercase();
        let plan = UploadPlan::new(&dataset, &target, batcher, concurrency, config.metric.value, backend);
        return display_plan(output, &plan);
    }

    let index_service = service::connect(args.service, &config)?;
    let uploader = Uploader::new(index_service)
        .with_retry(RetryPolicy::from_config(&config))
        .with_metric(config.metric.value);

    if args.service == ServiceBackend::Memory {
        output.warning("The memory service keeps nothing after this command exits");
    }
    output.info(format!(
        "Uploading {} ({} records, {} dims) to {}",
        dataset.name(),
        dataset.len(),
        dataset.dim(),
        target.index_name
    ));

    let mut display = UploadProgressDisplay::new(output.is_json());
    let outcome = uploader
        .upload_with_progress(&dataset, &target, batch_size, concurrency, |progress| {
            display.update(&progress)
        })
        .await?;

    if output.is_json() {
        return output.result(UploadOutput {
            dataset: dataset.name().to_string(),
            index: target.index_name.clone(),
            namespace: target.namespace_or_root().to_string(),
            outcome,
        });
    }

    output.success(format!("Uploaded {}", dataset.name()));
    output.section("Upload Summary");
    output.kv("Index", &target.index_name);
    output.kv("Namespace", format!("{:?}", target.namespace_or_root()));
    output.kv("Records acknowledged", format!("{}/{}", outcome.total_acknowledged, outcome.total_records));
    output.kv("Batches", outcome.batches_succeeded);

    Ok(())
}
