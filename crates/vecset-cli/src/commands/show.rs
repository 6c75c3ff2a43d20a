use super::open_catalog;
use crate::cli::ShowArgs;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use anyhow::Result;
use std::path::PathBuf;
use vecset_core::config::CliConfigOverrides;
use vecset_core::error::VecsetError;

pub fn execute(args: ShowArgs, output: &OutputWriter, catalog_root: Option<PathBuf>) -> Result<()> {
    let config = load_config_with_overrides(CliConfigOverrides {
        catalog_root,
        ..Default::default()
    })?;
    let catalog = open_catalog(&config)?;

    let metadata = catalog.get(&args.dataset).ok_or_else(|| VecsetError::DatasetNotFound {
        name: args.dataset.clone(),
    })?;

    let head = match args.head {
        Some(n) => Some(catalog.load_dataset(&args.dataset)?.head(n).to_vec()),
        None => None,
    };

    if output.is_json() {
        return output.result(serde_json::json!({
            "metadata": metadata,
            "head": head,
        }));
    }

    output.section(format!("Dataset {}", metadata.name));
    output.kv("Created", &metadata.created_at);
    output.kv("Documents", metadata.documents);
    output.kv("Queries", metadata.queries);
    output.kv(
        "Dense model",
        format!("{} ({} dims)", metadata.dense_model.name, metadata.dense_model.dimension),
    );
    if let Some(ref sparse) = metadata.sparse_model {
        if let Some(ref name) = sparse.name {
            output.kv("Sparse model", name);
        }
    }
    if let Some(ref source) = metadata.source {
        output.kv("Source", source);
    }
    if let Some(ref license) = metadata.license {
        output.kv("License", license);
    }
    if let Some(ref description) = metadata.description {
        output.kv("Description", description);
    }
    if let Some(ref tags) = metadata.tags {
        output.kv("Tags", tags.join(", "));
    }

    if let Some(records) = head {
        output.section(format!("First {} documents", records.len()));
        for record in records {
            let preview: Vec<String> =
                record.values.iter().take(4).map(|v| format!("{:.4}", v)).collect();
            let ellipsis = if record.values.len() > 4 { ", ..." } else { "" };
            output.kv(&record.id, format!("[{}{}]", preview.join(", "), ellipsis));
        }
    }

    Ok(())
}
