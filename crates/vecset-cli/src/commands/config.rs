use crate::config_loader::{load_config, CONFIG_FILE};
use crate::output::OutputWriter;
use crate::output_types::ConfigRow;
use anyhow::Result;
use std::path::PathBuf;
use vecset_core::config::CliConfigOverrides;

pub fn execute(output: &OutputWriter, catalog_root: Option<PathBuf>) -> Result<()> {
    let mut config = load_config()?;
    config.update_from_cli(CliConfigOverrides {
        catalog_root,
        ..Default::default()
    });

    let mut rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow {
            key,
            value,
            source: format!("{:?}", source),
        })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    if !output.is_json() {
        output.section(format!("Effective configuration (file: {})", CONFIG_FILE));
    }
    output.table(rows)?;

    if let Err(e) = config.validate() {
        output.warning(e);
    }
    Ok(())
}
