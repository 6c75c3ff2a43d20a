use super::open_catalog;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::DatasetRow;
use anyhow::Result;
use std::path::PathBuf;
use vecset_core::config::CliConfigOverrides;

pub fn execute(output: &OutputWriter, catalog_root: Option<PathBuf>) -> Result<()> {
    let config = load_config_with_overrides(CliConfigOverrides {
        catalog_root,
        ..Default::default()
    })?;
    let catalog = open_catalog(&config)?;

    let rows: Vec<DatasetRow> = catalog.list_metadata().into_iter().map(DatasetRow::from).collect();

    if !output.is_json() {
        output.section(format!("Datasets in {}", config.catalog_root.value.display()));
    }
    output.table(rows)
}
