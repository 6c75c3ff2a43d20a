use crate::cli::StatsArgs;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::NamespaceRow;
use crate::service;
use anyhow::Result;
use vecset_core::config::CliConfigOverrides;

pub async fn execute(args: StatsArgs, output: &OutputWriter) -> Result<()> {
    let config = load_config_with_overrides(CliConfigOverrides::default())?;
    let index_service = service::connect(args.service, &config)?;

    let stats = index_service.describe_index_stats(&args.index).await?;

    if output.is_json() {
        return output.result(&stats);
    }

    output.section(format!("Index {}", args.index));
    output.kv("Dimension", stats.dimension);
    output.kv("Total vectors", stats.total_vector_count);

    let rows: Vec<NamespaceRow> = stats
        .namespaces
        .iter()
        .map(|(namespace, ns)| NamespaceRow {
            namespace: if namespace.is_empty() { "(root)".to_string() } else { namespace.clone() },
            vector_count: ns.vector_count,
        })
        .collect();
    output.table(rows)
}
