//! Command implementations

mod config;
mod list;
mod show;
mod stats;
mod upload;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;
use std::sync::Arc;
use vecset_core::config::LayeredConfig;
use vecset_core::Catalog;
use vecset_store::LocalDatasetStore;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    match cli.command {
        Commands::List => list::execute(&output, cli.catalog),
        Commands::Show(args) => show::execute(args, &output, cli.catalog),
        Commands::Upload(args) => upload::execute(args, &output, cli.catalog, cli.dry_run).await,
        Commands::Stats(args) => stats::execute(args, &output).await,
        Commands::Config => config::execute(&output, cli.catalog),
    }
}

/// Open the catalog named by the configuration
fn open_catalog(config: &LayeredConfig) -> Result<Catalog> {
    let store = LocalDatasetStore::open(&config.catalog_root.value)?;
    Ok(Catalog::load(Arc::new(store))?)
}
