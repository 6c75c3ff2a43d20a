//! Adapter for environment-scoped (pod based) projects
//!
//! These projects use a per-environment controller and derive index hosts
//! from the index name, project id and environment.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use vecset_core::error::{Result, VecsetError};
use vecset_core::models::{DocumentRecord, IndexDescription, IndexStats, Metric};

use super::{classify_status, classify_transport_error, wait_until_ready, DataPlane, RemoteConfig};
use crate::ports::IndexService;

#[derive(Debug, Deserialize)]
struct DatabaseModel {
    name: String,
    dimension: usize,
    #[serde(default)]
    metric: Metric,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseStatus {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    host: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DescribeDatabaseResponse {
    database: DatabaseModel,
    #[serde(default)]
    status: DatabaseStatus,
}

#[derive(Debug, Serialize)]
struct CreateDatabaseRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: Metric,
}

/// Index service for pod based projects
pub struct PodIndexService {
    config: RemoteConfig,
    environment: String,
    controller_url: String,
    client: reqwest::Client,
    data_plane: DataPlane,
}

impl PodIndexService {
    /// Requires `environment` to be set on the config
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let environment = config.environment.clone().ok_or_else(|| VecsetError::ConfigMissing {
            key: "PINECONE_ENVIRONMENT".to_string(),
        })?;
        let controller_url = format!("https://controller.{}.pinecone.io", environment);

        let client = config.http_client()?;
        let data_plane = DataPlane::new(client.clone(), config.api_key.clone());

        Ok(Self {
            config,
            environment,
            controller_url,
            client,
            data_plane,
        })
    }

    fn controller(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.controller_url, path))
            .header("Api-Key", &self.config.api_key)
    }

    async fn fetch_database(&self, name: &str) -> Result<Option<DescribeDatabaseResponse>> {
        let response = self
            .controller(reqwest::Method::GET, &format!("/databases/{}", name))
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        response
            .json()
            .await
            .map(Some)
            .map_err(|e| VecsetError::Serialization(format!("Invalid index description: {}", e)))
    }

    fn derived_host(&self, name: &str) -> Result<String> {
        let project_id = self.config.project_id.as_deref().ok_or_else(|| VecsetError::ConfigMissing {
            key: "PINECONE_PROJECT_ID".to_string(),
        })?;
        Ok(format!("{}-{}.svc.{}.pinecone.io", name, project_id, self.environment))
    }

    async fn host(&self, name: &str) -> Result<String> {
        if self.config.project_id.is_some() {
            return self.derived_host(name);
        }

        let described = self.fetch_database(name).await?.ok_or_else(|| VecsetError::IndexNotFound {
            name: name.to_string(),
        })?;

        match described.status.host {
            Some(host) => Ok(host),
            None => self.derived_host(name),
        }
    }
}

#[async_trait]
impl IndexService for PodIndexService {
    async fn index_exists(&self, name: &str) -> Result<bool> {
        Ok(self.fetch_database(name).await?.is_some())
    }

    async fn describe_index(&self, name: &str) -> Result<IndexDescription> {
        let described = self.fetch_database(name).await?.ok_or_else(|| VecsetError::IndexNotFound {
            name: name.to_string(),
        })?;

        Ok(IndexDescription {
            name: described.database.name,
            dimension: described.database.dimension,
            metric: described.database.metric,
            ready: described.status.ready,
        })
    }

    async fn create_index(&self, name: &str, dimension: usize, metric: Metric) -> Result<()> {
        tracing::info!(
            index = name,
            dimension,
            environment = %self.environment,
            "Creating pod index"
        );

        let request = CreateDatabaseRequest {
            name,
            dimension,
            metric,
        };

        super::send(self.controller(reqwest::Method::POST, "/databases").json(&request))
            .await
            .map_err(|e| VecsetError::IndexCreationFailed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        wait_until_ready(self, name, self.config.ready_polls, self.config.ready_interval).await
    }

    async fn upsert(
        &self,
        index: &str,
        namespace: &str,
        records: &[DocumentRecord],
    ) -> Result<usize> {
        let host = self.host(index).await?;
        self.data_plane.upsert(&host, namespace, records).await
    }

    async fn describe_index_stats(&self, name: &str) -> Result<IndexStats> {
        let host = self.host(name).await?;
        self.data_plane.describe_index_stats(&host).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RemoteConfig {
        let mut config = RemoteConfig::new("key");
        config.environment = Some("us-west1-gcp".to_string());
        config
    }

    #[test]
    fn test_requires_environment() {
        let err = PodIndexService::new(RemoteConfig::new("key")).err().unwrap();
        assert!(matches!(err, VecsetError::ConfigMissing { ref key } if key == "PINECONE_ENVIRONMENT"));
    }

    #[test]
    fn test_controller_url() {
        let service = PodIndexService::new(config()).unwrap();
        assert_eq!(service.controller_url, "https://controller.us-west1-gcp.pinecone.io");
    }

    #[test]
    fn test_derived_host() {
        let mut config = config();
        config.project_id = Some("abc123".to_string());
        let service = PodIndexService::new(config).unwrap();

        assert_eq!(
            service.derived_host("quora").unwrap(),
            "quora-abc123.svc.us-west1-gcp.pinecone.io"
        );
    }

    #[test]
    fn test_derived_host_needs_project() {
        let service = PodIndexService::new(config()).unwrap();
        assert!(service.derived_host("quora").is_err());
    }

    #[test]
    fn test_describe_response_parses() {
        let described: DescribeDatabaseResponse = serde_json::from_str(
            r#"{"database":{"name":"quora","dimension":768,"metric":"dotproduct","pods":1},
                "status":{"ready":false,"state":"Initializing"}}"#,
        )
        .unwrap();

        assert_eq!(described.database.dimension, 768);
        assert_eq!(described.database.metric, Metric::Dotproduct);
        assert!(!described.status.ready);
        assert!(described.status.host.is_none());
    }
}
