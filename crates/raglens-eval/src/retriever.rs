//! Retrieval collaborators used by the runner.
//!
//! - [`HttpRetriever`] calls a search service over HTTP.
//! - [`StaticRetriever`] replays recorded results keyed by query text.
//!
//! [`connect_retriever`] picks one from settings and returns `None` when no
//! search service is usable, which puts the runner in degraded mode.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use raglens_core::{Error, Result, RetrievedChunk, Retriever, Settings};
use raglens_core::logging::{COMPONENT, ERROR_MSG, RESULT_COUNT, SUBSYSTEM, TOP_K};
use serde::{Deserialize, Serialize};
use tracing::field::display;
use tracing::{debug, warn};

/// Retriever backed by a search service's `POST <endpoint>/search`.
#[derive(Debug, Clone)]
pub struct HttpRetriever {
    endpoint: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    collection: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    Chunks(Vec<RetrievedChunk>),
    Wrapped { results: Vec<RetrievedChunk> },
}

impl HttpRetriever {
    pub const NAME: &'static str = "http";

    /// Create a retriever for `endpoint`, which must be an http(s) URL.
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let endpoint = endpoint.into();
        let url = reqwest::Url::parse(&endpoint)
            .map_err(|e| Error::Config(format!("invalid search endpoint '{}': {}", endpoint, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "search endpoint must use http or https: {}",
                endpoint
            )));
        }

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        collection: Option<&str>,
    ) -> Result<Vec<RetrievedChunk>> {
        let url = format!("{}/search", self.endpoint);
        let request = SearchRequest {
            query,
            top_k,
            collection,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(Duration::from_secs(self.timeout_secs))
            .send()
            .await
            .map_err(|e| Error::Retrieval(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Retrieval(format!(
                "Search service returned {}: {}",
                status, body
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Retrieval(format!("Failed to parse search response: {}", e)))?;
        let chunks = match parsed {
            SearchResponse::Chunks(chunks) => chunks,
            SearchResponse::Wrapped { results } => results,
        };

        debug!(
            { SUBSYSTEM } = "retrieval",
            { COMPONENT } = "http_retriever",
            { RESULT_COUNT } = chunks.len(),
            { TOP_K } = top_k,
            "Search completed"
        );
        Ok(chunks)
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

/// Retriever serving pre-recorded ranked results by exact query text.
#[derive(Debug, Clone, Default)]
pub struct StaticRetriever {
    results: HashMap<String, Vec<RetrievedChunk>>,
}

impl StaticRetriever {
    pub const NAME: &'static str = "static";

    pub fn new(results: HashMap<String, Vec<RetrievedChunk>>) -> Self {
        Self { results }
    }

    /// Load a JSON object mapping query text to ranked chunks.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "failed to read recorded results {}: {}",
                path.display(),
                e
            ))
        })?;
        let results = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "malformed recorded results {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self { results })
    }

    /// Record the ranked results for `query`, replacing earlier ones.
    pub fn insert(&mut self, query: impl Into<String>, chunks: Vec<RetrievedChunk>) {
        self.results.insert(query.into(), chunks);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        _collection: Option<&str>,
    ) -> Result<Vec<RetrievedChunk>> {
        Ok(self
            .results
            .get(query)
            .map(|chunks| chunks.iter().take(top_k).cloned().collect())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

/// Build the configured retriever, or `None` when none is usable.
pub fn connect_retriever(settings: &Settings) -> Option<Arc<dyn Retriever>> {
    let Some(endpoint) = settings.retrieval.endpoint.as_deref() else {
        warn!(
            { SUBSYSTEM } = "retrieval",
            { COMPONENT } = "retriever",
            "No search endpoint configured, running without retrieval"
        );
        return None;
    };

    match HttpRetriever::new(endpoint, settings.retrieval.timeout_secs) {
        Ok(retriever) => Some(Arc::new(retriever)),
        Err(e) => {
            warn!(
                { SUBSYSTEM } = "retrieval",
                { COMPONENT } = "retriever",
                { ERROR_MSG } = display(&e),
                "Search service unavailable, running without retrieval"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_retriever_rejects_bad_scheme() {
        assert!(matches!(
            HttpRetriever::new("ftp://search.local", 5).unwrap_err(),
            Error::Config(_)
        ));
        assert!(matches!(
            HttpRetriever::new("not a url", 5).unwrap_err(),
            Error::Config(_)
        ));
    }

    #[test]
    fn test_http_retriever_trims_trailing_slash() {
        let retriever = HttpRetriever::new("http://localhost:8080/api/", 5).unwrap();
        assert_eq!(retriever.endpoint(), "http://localhost:8080/api");
        assert_eq!(retriever.name(), "http");
    }

    #[tokio::test]
    async fn test_static_retriever_honours_top_k() {
        let mut retriever = StaticRetriever::default();
        retriever.insert(
            "q",
            vec![
                RetrievedChunk::new("a"),
                RetrievedChunk::new("b"),
                RetrievedChunk::new("c"),
            ],
        );

        let chunks = retriever.search("q", 2, None).await.unwrap();
        let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_static_retriever_unknown_query_is_empty() {
        let retriever = StaticRetriever::default();
        assert!(retriever.search("missing", 5, None).await.unwrap().is_empty());
    }

    #[test]
    fn test_static_retriever_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        std::fs::write(
            &path,
            r#"{"what is rrf": [{"chunk_id": "c1", "text": "fusion", "score": 0.9}]}"#,
        )
        .unwrap();

        let retriever = StaticRetriever::from_file(&path).unwrap();
        assert_eq!(retriever.len(), 1);
    }

    #[test]
    fn test_connect_without_endpoint_is_none() {
        let settings = Settings::default();
        assert!(connect_retriever(&settings).is_none());
    }

    #[test]
    fn test_connect_with_invalid_endpoint_is_none() {
        let mut settings = Settings::default();
        settings.retrieval.endpoint = Some("file:///tmp/search".to_string());
        assert!(connect_retriever(&settings).is_none());
    }

    #[test]
    fn test_connect_with_endpoint() {
        let mut settings = Settings::default();
        settings.retrieval.endpoint = Some("http://localhost:9000".to_string());
        let retriever = connect_retriever(&settings).unwrap();
        assert_eq!(retriever.name(), "http");
    }
}
