//! Data model shared by evaluators, retrievers and the runner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Metric name to score. Keys are sorted so reports render deterministically.
pub type MetricMap = BTreeMap<String, f64>;

/// One evaluation unit from a golden test set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Query text sent to the retriever.
    pub query: String,
    /// Ground-truth chunk identifiers. Empty means no ground truth configured.
    #[serde(default)]
    pub expected_chunk_ids: Vec<String>,
    /// Collection override for this case.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

impl TestCase {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            expected_chunk_ids: Vec::new(),
            collection: None,
        }
    }

    pub fn with_expected<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_chunk_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Whether any ground truth is configured for this case.
    pub fn has_ground_truth(&self) -> bool {
        !self.expected_chunk_ids.is_empty()
    }
}

/// A ranked candidate returned by a retriever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Identifier, unique within one result list.
    #[serde(alias = "chunk_id")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    /// Relevance score; higher is more relevant.
    #[serde(default)]
    pub score: f64,
    /// Open key-value metadata (e.g. `source_path`).
    #[serde(default)]
    pub metadata: serde_json::Map<String, JsonValue>,
}

impl RetrievedChunk {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            score: 0.0,
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Source document path, when the retriever recorded one.
    pub fn source_path(&self) -> Option<&str> {
        self.metadata.get("source_path").and_then(JsonValue::as_str)
    }
}

/// Outcome of evaluating a single test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query: String,
    /// Wall-clock time for retrieval and answer generation. Scoring is not
    /// included.
    pub elapsed_ms: f64,
    #[serde(default)]
    pub metrics: MetricMap,
    /// Retrieved identifiers in rank order.
    #[serde(default)]
    pub retrieved_chunk_ids: Vec<String>,
    #[serde(default)]
    pub generated_answer: Option<String>,
    /// Per-query failure, if retrieval or evaluation did not succeed.
    #[serde(default)]
    pub error: Option<String>,
}

impl QueryResult {
    /// Whether this query recorded a failure.
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// `name: value` pairs joined with " · ", or `None` without metrics.
    pub fn metric_summary(&self) -> Option<String> {
        if self.metrics.is_empty() {
            return None;
        }
        Some(
            self.metrics
                .iter()
                .map(|(k, v)| format!("{}: {:.3}", k, v))
                .collect::<Vec<_>>()
                .join(" · "),
        )
    }
}
