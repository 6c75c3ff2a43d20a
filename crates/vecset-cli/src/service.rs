use crate::cli::ServiceBackend;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use vecset_core::config::LayeredConfig;
use vecset_store::remote::{PodIndexService, RemoteConfig, ServerlessIndexService};
use vecset_store::{IndexService, MemoryIndexService};

/// Build the index service adapter for a backend
pub fn connect(backend: ServiceBackend, config: &LayeredConfig) -> Result<Arc<dyn IndexService>> {
    match backend {
        ServiceBackend::Memory => {
            tracing::warn!("Using the in-memory index service; uploaded vectors are discarded on exit");
            Ok(Arc::new(MemoryIndexService::new()))
        }
        ServiceBackend::Serverless => {
            let remote = remote_config(config)?;
            Ok(Arc::new(ServerlessIndexService::new(remote)?))
        }
        ServiceBackend::Pod => {
            let remote = remote_config(config)?;
            Ok(Arc::new(PodIndexService::new(remote)?))
        }
    }
}

fn remote_config(config: &LayeredConfig) -> Result<RemoteConfig> {
    let timeout = Duration::from_secs(config.request_timeout_secs.value);
    Ok(RemoteConfig::from_env()?.with_request_timeout(timeout))
}
