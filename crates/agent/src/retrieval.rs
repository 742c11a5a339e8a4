use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use itinera_core::config::RetrievalConfig;

/// One retrieved knowledge-base passage.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Passage {
    pub content: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Retrieval capability boundary. An empty result is valid and expected;
/// it triggers the recommender's un-augmented fallback. The index is
/// read-only from the pipeline's point of view.
#[async_trait]
pub trait PassageRetriever: Send + Sync {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Passage>>;
}

/// HTTP client for a vector-index query endpoint. Embedding and
/// similarity mechanics stay behind the endpoint.
pub struct VectorIndexRetriever {
    client: reqwest::Client,
    base_url: String,
    index_name: String,
    api_key: Option<SecretString>,
}

impl VectorIndexRetriever {
    pub fn new(
        base_url: impl Into<String>,
        index_name: impl Into<String>,
        api_key: Option<SecretString>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build retrieval http client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            index_name: index_name.into(),
            api_key,
        })
    }

    pub fn from_config(config: &RetrievalConfig) -> Result<Self> {
        Self::new(config.base_url.clone(), config.index_name.clone(), config.api_key.clone())
    }
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    top_k: usize,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<Passage>,
}

#[async_trait]
impl PassageRetriever for VectorIndexRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Passage>> {
        let url = format!("{}/indexes/{}/query", self.base_url, self.index_name);
        let mut request = self.client.post(&url).json(&QueryRequest { query, top_k: k });
        if let Some(api_key) = &self.api_key {
            request = request.header("api-key", api_key.expose_secret());
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("retrieval request to {url} failed"))?
            .error_for_status()
            .context("retrieval provider returned an error status")?;

        let envelope: QueryResponse =
            response.json().await.context("retrieval provider returned an unusable envelope")?;

        Ok(envelope.matches)
    }
}
