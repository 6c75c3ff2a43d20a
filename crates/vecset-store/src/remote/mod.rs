//! Remote index service adapters
//!
//! Both control-plane generations share the same data plane (upsert and stats
//! against the index host); they differ in how indexes are created and
//! described.

pub mod pod;
pub mod serverless;

pub use pod::PodIndexService;
pub use serverless::ServerlessIndexService;

use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::time::Duration;
use vecset_core::error::{Result, VecsetError};
use vecset_core::models::{DocumentRecord, IndexStats, NamespaceStats, SparseValues};

use crate::ports::IndexService;

/// Connection settings shared by the remote adapters
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// API key sent with every request
    pub api_key: String,
    /// Environment name, used by the pod control plane
    pub environment: Option<String>,
    /// Project id, used to derive pod index hosts
    pub project_id: Option<String>,
    /// Cloud for new serverless indexes
    pub cloud: String,
    /// Region for new serverless indexes
    pub region: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// How many times to poll a new index before giving up on it becoming ready
    pub ready_polls: u32,
    /// Delay between readiness polls
    pub ready_interval: Duration,
}

impl RemoteConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            environment: None,
            project_id: None,
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            request_timeout: Duration::from_secs(30),
            ready_polls: 60,
            ready_interval: Duration::from_secs(5),
        }
    }

    /// Load configuration from environment variables
    ///
    /// Requires PINECONE_API_KEY. PINECONE_ENVIRONMENT, PINECONE_PROJECT_ID,
    /// PINECONE_CLOUD and PINECONE_REGION are optional.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("PINECONE_API_KEY").map_err(|_| VecsetError::ConfigMissing {
            key: "PINECONE_API_KEY".to_string(),
        })?;

        if api_key.trim().is_empty() {
            return Err(VecsetError::ConfigInvalid {
                key: "PINECONE_API_KEY".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }

        let mut config = Self::new(api_key);
        config.environment = env::var("PINECONE_ENVIRONMENT").ok();
        config.project_id = env::var("PINECONE_PROJECT_ID").ok();
        if let Ok(cloud) = env::var("PINECONE_CLOUD") {
            config.cloud = cloud;
        }
        if let Ok(region) = env::var("PINECONE_REGION") {
            config.region = region;
        }
        Ok(config)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| VecsetError::ConfigInvalid {
                key: "http_client".to_string(),
                reason: e.to_string(),
            })
    }
}

/// Map a transport failure onto the retry taxonomy
pub(crate) fn classify_transport_error(err: reqwest::Error) -> VecsetError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        VecsetError::transient(format!("request failed: {}", err))
    } else {
        VecsetError::fatal(format!("request failed: {}", err))
    }
}

/// Map an unsuccessful HTTP status onto the retry taxonomy
pub(crate) fn classify_status(status: StatusCode, body: &str) -> VecsetError {
    let body = truncate(body, 512);
    match status {
        StatusCode::REQUEST_TIMEOUT
        | StatusCode::TOO_MANY_REQUESTS
        | StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => VecsetError::transient(format!("{}: {}", status, body)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            VecsetError::fatal(format!("authentication failed ({}): {}", status, body))
        }
        _ => VecsetError::fatal(format!("{}: {}", status, body)),
    }
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Send a request and return the response only if the status is a success
pub(crate) async fn send(request: RequestBuilder) -> Result<reqwest::Response> {
    let response = request.send().await.map_err(classify_transport_error)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify_status(status, &body))
}

/// Poll until an index reports ready
pub(crate) async fn wait_until_ready<S>(
    service: &S,
    name: &str,
    polls: u32,
    interval: Duration,
) -> Result<()>
where
    S: IndexService + ?Sized,
{
    for attempt in 0..polls {
        match service.describe_index(name).await {
            Ok(description) if description.ready => return Ok(()),
            Ok(_) | Err(VecsetError::IndexNotFound { .. }) => {
                tracing::debug!(index = name, attempt, "Waiting for index to become ready");
            }
            Err(e) if e.is_transient() => {
                tracing::debug!(index = name, attempt, error = %e, "Readiness poll failed");
            }
            Err(e) => return Err(e),
        }
        tokio::time::sleep(interval).await;
    }

    Err(VecsetError::IndexCreationFailed {
        name: name.to_string(),
        reason: format!("index not ready after {} polls", polls),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireVector<'a> {
    id: &'a str,
    values: &'a [f32],
    #[serde(skip_serializing_if = "Option::is_none")]
    sparse_values: Option<&'a SparseValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a serde_json::Map<String, serde_json::Value>>,
}

impl<'a> From<&'a DocumentRecord> for WireVector<'a> {
    fn from(record: &'a DocumentRecord) -> Self {
        Self {
            id: &record.id,
            values: &record.values,
            sparse_values: record.sparse_values.as_ref(),
            metadata: record.metadata.as_ref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UpsertRequest<'a> {
    vectors: Vec<WireVector<'a>>,
    namespace: &'a str,
}

impl<'a> UpsertRequest<'a> {
    pub(crate) fn new(namespace: &'a str, records: &'a [DocumentRecord]) -> Self {
        Self {
            vectors: records.iter().map(WireVector::from).collect(),
            namespace,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    upserted_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNamespaceStats {
    #[serde(default)]
    vector_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    namespaces: HashMap<String, WireNamespaceStats>,
    #[serde(default)]
    dimension: usize,
    #[serde(default)]
    total_vector_count: usize,
}

impl From<StatsResponse> for IndexStats {
    fn from(response: StatsResponse) -> Self {
        let namespaces: BTreeMap<String, NamespaceStats> = response
            .namespaces
            .into_iter()
            .map(|(name, ns)| {
                (
                    name,
                    NamespaceStats {
                        vector_count: ns.vector_count,
                    },
                )
            })
            .collect();

        IndexStats {
            dimension: response.dimension,
            total_vector_count: response.total_vector_count,
            namespaces,
        }
    }
}

/// Data-plane calls against one index host
#[derive(Debug, Clone)]
pub(crate) struct DataPlane {
    client: reqwest::Client,
    api_key: String,
}

impl DataPlane {
    pub(crate) fn new(client: reqwest::Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    fn url(host: &str, path: &str) -> String {
        if host.starts_with("http://") || host.starts_with("https://") {
            format!("{}{}", host.trim_end_matches('/'), path)
        } else {
            format!("https://{}{}", host.trim_end_matches('/'), path)
        }
    }

    pub(crate) async fn upsert(
        &self,
        host: &str,
        namespace: &str,
        records: &[DocumentRecord],
    ) -> Result<usize> {
        let request = self
            .client
            .post(Self::url(host, "/vectors/upsert"))
            .header("Api-Key", &self.api_key)
            .json(&UpsertRequest::new(namespace, records));

        let response: UpsertResponse = send(request)
            .await?
            .json()
            .await
            .map_err(|e| VecsetError::Serialization(format!("Invalid upsert response: {}", e)))?;

        Ok(response.upserted_count)
    }

    pub(crate) async fn describe_index_stats(&self, host: &str) -> Result<IndexStats> {
        let request = self
            .client
            .post(Self::url(host, "/describe_index_stats"))
            .header("Api-Key", &self.api_key)
            .json(&serde_json::json!({}));

        let response: StatsResponse = send(request)
            .await?
            .json()
            .await
            .map_err(|e| VecsetError::Serialization(format!("Invalid stats response: {}", e)))?;

        Ok(response.into())
    }
}
