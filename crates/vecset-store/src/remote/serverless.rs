//! Adapter for the global control plane (`api.pinecone.io`)

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use vecset_core::error::{Result, VecsetError};
use vecset_core::models::{DocumentRecord, IndexDescription, IndexStats, Metric};

use super::{classify_status, classify_transport_error, wait_until_ready, DataPlane, RemoteConfig};
use crate::ports::IndexService;

const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
const API_VERSION: &str = "2024-07";

#[derive(Debug, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

#[derive(Debug, Deserialize)]
struct IndexModel {
    name: String,
    dimension: usize,
    #[serde(default)]
    metric: Metric,
    host: String,
    status: IndexStatus,
}

#[derive(Debug, Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateIndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Debug, Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: Metric,
    spec: CreateIndexSpec<'a>,
}

/// Index service backed by serverless indexes
pub struct ServerlessIndexService {
    config: RemoteConfig,
    control_plane_url: String,
    client: reqwest::Client,
    data_plane: DataPlane,
    hosts: RwLock<HashMap<String, String>>,
}

impl ServerlessIndexService {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        Self::with_control_plane(config, CONTROL_PLANE_URL)
    }

    /// Point the adapter at a different control plane, e.g. a local emulator
    pub fn with_control_plane(config: RemoteConfig, url: impl Into<String>) -> Result<Self> {
        let client = config.http_client()?;
        let data_plane = DataPlane::new(client.clone(), config.api_key.clone());
        Ok(Self {
            config,
            control_plane_url: url.into().trim_end_matches('/').to_string(),
            client,
            data_plane,
            hosts: RwLock::new(HashMap::new()),
        })
    }

    fn control(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.control_plane_url, path))
            .header("Api-Key", &self.config.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    async fn fetch_index(&self, name: &str) -> Result<Option<IndexModel>> {
        let response = self
            .control(reqwest::Method::GET, &format!("/indexes/{}", name))
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

        let model: IndexModel = response
            .json()
            .await
            .map_err(|e| VecsetError::Serialization(format!("Invalid index description: {}", e)))?;

        if let Ok(mut hosts) = self.hosts.write() {
            hosts.insert(model.name.clone(), model.host.clone());
        }
        Ok(Some(model))
    }

    /// Index host, described once and then cached
    async fn host(&self, name: &str) -> Result<String> {
        let cached = self.hosts.read().ok().and_then(|hosts| hosts.get(name).cloned());
        if let Some(host) = cached {
            return Ok(host);
        }
        self.fetch_index(name)
            .await?
            .map(|model| model.host)
            .ok_or_else(|| VecsetError::IndexNotFound {
                name: name.to_string(),
            })
    }
}

#[async_trait]
impl IndexService for ServerlessIndexService {
    async fn index_exists(&self, name: &str) -> Result<bool> {
        Ok(self.fetch_index(name).await?.is_some())
    }

    async fn describe_index(&self, name: &str) -> Result<IndexDescription> {
        let model = self.fetch_index(name).await?.ok_or_else(|| VecsetError::IndexNotFound {
            name: name.to_string(),
        })?;

        Ok(IndexDescription {
            name: model.name,
            dimension: model.dimension,
            metric: model.metric,
            ready: model.status.ready,
        })
    }

    async fn create_index(&self, name: &str, dimension: usize, metric: Metric) -> Result<()> {
        let request = CreateIndexRequest {
            name,
            dimension,
            metric,
            spec: CreateIndexSpec {
                serverless: ServerlessSpec {
                    cloud: &self.config.cloud,
                    region: &self.config.region,
                },
            },
        };

        tracing::info!(
            index = name,
            dimension,
            cloud = %self.config.cloud,
            region = %self.config.region,
            "Creating serverless index"
        );

        super::send(self.control(reqwest::Method::POST, "/indexes").json(&request))
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
