use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vecset_core::models::Metric;

/// vecset - Pre-packaged vector datasets
#[derive(Parser, Debug)]
#[command(name = "vecset")]
#[command(about = "Catalog and bulk-upload vector embedding datasets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Show planned actions without executing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Catalog directory holding one sub-directory per dataset
    #[arg(long, global = true, value_name = "DIR")]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Index service selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ServiceBackend {
    /// Serverless indexes on the global control plane
    Serverless,
    /// Pod indexes on an environment controller
    Pod,
    /// In-process index, discarded on exit (for rehearsals)
    Memory,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List datasets in the catalog
    List,

    /// Show the metadata of one dataset
    Show(ShowArgs),

    /// Upload a dataset into an index
    Upload(UploadArgs),

    /// Show vector counts of an index
    Stats(StatsArgs),

    /// Show the effective configuration and where each value comes from
    Config,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Dataset identifier
    pub dataset: String,

    /// Also print the first N documents
    #[arg(long, value_name = "N")]
    pub head: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct UploadArgs {
    /// Dataset identifier
    pub dataset: String,

    /// Target index name
    #[arg(long)]
    pub index: String,

    /// Namespace inside the index (root namespace if omitted)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Records per upsert request
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Upsert requests in flight at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Fail instead of creating the index when it does not exist
    #[arg(long)]
    pub no_create: bool,

    /// Index service to upload to
    #[arg(long, value_enum, default_value = "serverless")]
    pub service: ServiceBackend,

    /// Similarity metric for a newly created index
    #[arg(long)]
    pub metric: Option<Metric>,
}

#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Index name
    #[arg(long)]
    pub index: String,

    /// Index service to query
    #[arg(long, value_enum, default_value = "serverless")]
    pub service: ServiceBackend,
}
