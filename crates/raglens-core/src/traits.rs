//! Core traits for raglens abstractions.
//!
//! These traits define the seams between the evaluation runner and the
//! collaborators it drives, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{MetricMap, RetrievedChunk};

// =============================================================================
// RETRIEVAL
// =============================================================================

/// Source of ranked chunks for a query (hybrid search, a replay file, ...).
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Search for `query`, returning at most `top_k` chunks best-first.
    ///
    /// `collection` restricts the search when given; otherwise the
    /// backend's default collection is used.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        collection: Option<&str>,
    ) -> Result<Vec<RetrievedChunk>>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// =============================================================================
// EVALUATION
// =============================================================================

/// Scores retrieval output for a single query.
///
/// Every variant shares this signature so the runner never branches on the
/// concrete evaluator. Implementations validate inputs before computing any
/// metric and never mutate their arguments.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Evaluator identity recorded in reports.
    fn name(&self) -> &str;

    /// Compute metrics for one query.
    async fn evaluate(
        &self,
        query: &str,
        retrieved_chunks: &[RetrievedChunk],
        ground_truth: Option<&[String]>,
        generated_answer: Option<&str>,
    ) -> Result<MetricMap>;
}

// =============================================================================
// GENERATION
// =============================================================================

/// Produces an answer from retrieved context.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, query: &str, chunks: &[RetrievedChunk]) -> Result<String>;
}
