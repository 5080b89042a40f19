//! Batch evaluation runner.
//!
//! Runs every test case through retrieval, optional answer generation and
//! the evaluator, strictly one after another, and folds the results into an
//! [`EvalReport`]. Per-query failures are recorded on that query's result and
//! never abort the batch; only test set loading is fatal.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use raglens_core::logging::{
    COLLECTION, COMPONENT, DURATION_MS, ERROR_MSG, EVALUATOR, FAILED_COUNT, OPERATION,
    QUERY_COUNT, QUERY_INDEX, RESULT_COUNT, SUBSYSTEM, TOP_K,
};
use raglens_core::{
    AnswerGenerator, Evaluator, QueryResult, Result, RetrievedChunk, Retriever, TestCase,
};
use tracing::field::{debug as debug_value, display};
use tracing::{debug, info, warn};

use crate::dataset::load_test_set;
use crate::report::EvalReport;

/// Executes evaluation batches against injected collaborators.
pub struct EvalRunner {
    evaluator: Box<dyn Evaluator>,
    retriever: Option<Arc<dyn Retriever>>,
    generator: Option<Arc<dyn AnswerGenerator>>,
}

impl EvalRunner {
    /// Runner with no retriever, which scores every query against an empty
    /// result list.
    pub fn new(evaluator: Box<dyn Evaluator>) -> Self {
        Self {
            evaluator,
            retriever: None,
            generator: None,
        }
    }

    /// Attach a retriever. `None` keeps the runner in degraded mode.
    pub fn with_retriever(mut self, retriever: Option<Arc<dyn Retriever>>) -> Self {
        self.retriever = retriever;
        self
    }

    /// Attach an answer generator; its output fills `generated_answer`.
    pub fn with_generator(mut self, generator: Option<Arc<dyn AnswerGenerator>>) -> Self {
        self.generator = generator;
        self
    }

    pub fn evaluator_name(&self) -> &str {
        self.evaluator.name()
    }

    pub fn has_retriever(&self) -> bool {
        self.retriever.is_some()
    }

    /// Load the test set at `path` and evaluate it.
    ///
    /// Fails only when the test set cannot be loaded.
    pub async fn run(
        &self,
        test_set: impl AsRef<Path>,
        top_k: usize,
        collection: Option<&str>,
    ) -> Result<EvalReport> {
        let cases = load_test_set(test_set)?;
        Ok(self.run_cases(&cases, top_k, collection).await)
    }

    /// Evaluate `cases` in order. A case's own collection takes precedence
    /// over `collection`.
    pub async fn run_cases(
        &self,
        cases: &[TestCase],
        top_k: usize,
        collection: Option<&str>,
    ) -> EvalReport {
        info!(
            { SUBSYSTEM } = "eval",
            { COMPONENT } = "runner",
            { OPERATION } = "run",
            { EVALUATOR } = self.evaluator.name(),
            retriever = self.retriever.as_ref().map(|r| r.name()).unwrap_or("none"),
            { QUERY_COUNT } = cases.len(),
            { TOP_K } = top_k,
            "Starting evaluation run"
        );
        if self.retriever.is_none() {
            warn!(
                { SUBSYSTEM } = "eval",
                { COMPONENT } = "runner",
                "No retriever attached, queries will be scored against empty results"
            );
        }

        let mut results = Vec::with_capacity(cases.len());
        for (idx, case) in cases.iter().enumerate() {
            let result = self.run_case(idx, case, top_k, collection).await;
            results.push(result);
        }

        let report = EvalReport::from_results(self.evaluator.name(), results);
        info!(
            { SUBSYSTEM } = "eval",
            { COMPONENT } = "runner",
            { OPERATION } = "run",
            { EVALUATOR } = report.evaluator_name.as_str(),
            { QUERY_COUNT } = report.query_count,
            { FAILED_COUNT } = report.failed_queries(),
            { DURATION_MS } = report.total_elapsed_ms,
            "Evaluation run finished"
        );
        report
    }

    async fn run_case(
        &self,
        idx: usize,
        case: &TestCase,
        top_k: usize,
        collection: Option<&str>,
    ) -> QueryResult {
        let start = Instant::now();
        let collection = case.collection.as_deref().or(collection);
        let mut errors: Vec<String> = Vec::new();

        let chunks: Vec<RetrievedChunk> = match &self.retriever {
            Some(retriever) => match retriever.search(&case.query, top_k, collection).await {
                Ok(chunks) => chunks,
                Err(e) => {
                    warn!(
                        { SUBSYSTEM } = "eval",
                        { COMPONENT } = "runner",
                        { QUERY_INDEX } = idx,
                        { ERROR_MSG } = display(&e),
                        "Retrieval failed"
                    );
                    errors.push(e.to_string());
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let generated_answer = match &self.generator {
            Some(generator) => match generator.generate(&case.query, &chunks).await {
                Ok(answer) => Some(answer),
                Err(e) => {
                    warn!(
                        { SUBSYSTEM } = "eval",
                        { COMPONENT } = "runner",
                        { QUERY_INDEX } = idx,
                        { ERROR_MSG } = display(&e),
                        "Answer generation failed"
                    );
                    errors.push(e.to_string());
                    None
                }
            },
            None => None,
        };

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let metrics = match self
            .evaluator
            .evaluate(
                &case.query,
                &chunks,
                Some(case.expected_chunk_ids.as_slice()),
                generated_answer.as_deref(),
            )
            .await
        {
            Ok(metrics) => metrics,
            Err(e) => {
                warn!(
                    { SUBSYSTEM } = "eval",
                    { COMPONENT } = "runner",
                    { QUERY_INDEX } = idx,
                    { ERROR_MSG } = display(&e),
                    "Evaluation failed"
                );
                errors.push(e.to_string());
                Default::default()
            }
        };

        debug!(
            { SUBSYSTEM } = "eval",
            { COMPONENT } = "runner",
            { QUERY_INDEX } = idx,
            { COLLECTION } = collection.unwrap_or(""),
            { RESULT_COUNT } = chunks.len(),
            { DURATION_MS } = elapsed_ms,
            metrics = debug_value(&metrics),
            "Query evaluated"
        );

        QueryResult {
            query: case.query.clone(),
            elapsed_ms,
            metrics,
            retrieved_chunk_ids: chunks.into_iter().map(|c| c.id).collect(),
            generated_answer,
            error: if errors.is_empty() {
                None
            } else {
                Some(errors.join("; "))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{CustomEvaluator, NoneEvaluator};
    use crate::retriever::StaticRetriever;

    fn custom() -> Box<dyn Evaluator> {
        Box::new(CustomEvaluator::new(&["hit_rate", "mrr"]).unwrap())
    }

    fn retriever(entries: &[(&str, &[&str])]) -> Option<Arc<dyn Retriever>> {
        let mut retriever = StaticRetriever::default();
        for (query, ids) in entries {
            retriever.insert(
                *query,
                ids.iter().map(|id| RetrievedChunk::new(*id)).collect(),
            );
        }
        Some(Arc::new(retriever))
    }

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let runner = EvalRunner::new(custom())
            .with_retriever(retriever(&[("q1", &["a"]), ("q2", &["b"]), ("q3", &["c"])]));
        let cases = vec![
            TestCase::new("q3").with_expected(["c"]),
            TestCase::new("q1").with_expected(["x"]),
            TestCase::new("q2").with_expected(["b"]),
        ];

        let report = runner.run_cases(&cases, 5, None).await;
        let queries: Vec<&str> = report.query_results.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, vec!["q3", "q1", "q2"]);
        assert_eq!(report.query_results[1].metrics["hit_rate"], 0.0);
        assert_eq!(report.query_results[0].retrieved_chunk_ids, vec!["c"]);
    }

    #[tokio::test]
    async fn test_none_evaluator_records_no_metrics() {
        let runner = EvalRunner::new(Box::new(NoneEvaluator::new()))
            .with_retriever(retriever(&[("q", &["a"])]));
        let report = runner.run_cases(&[TestCase::new("q")], 5, None).await;

        assert_eq!(report.evaluator_name, "none");
        assert_eq!(report.query_count, 1);
        assert!(report.aggregate_metrics.is_empty());
        assert!(report.query_results[0].error.is_none());
        assert_eq!(report.query_results[0].retrieved_chunk_ids, vec!["a"]);
    }

    #[tokio::test]
    async fn test_none_evaluator_without_retriever_records_validation_error() {
        let runner = EvalRunner::new(Box::new(NoneEvaluator::new()));
        let report = runner.run_cases(&[TestCase::new("q")], 5, None).await;

        assert_eq!(report.query_count, 1);
        assert!(report.query_results[0].metrics.is_empty());
        assert_eq!(
            report.query_results[0].error.as_deref(),
            Some("retrieved_chunks cannot be empty")
        );
    }

    #[tokio::test]
    async fn test_empty_test_set() {
        let runner = EvalRunner::new(custom());
        let report = runner.run_cases(&[], 5, None).await;
        assert_eq!(report.query_count, 0);
        assert!(report.query_results.is_empty());
    }

    #[tokio::test]
    async fn test_run_propagates_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let runner = EvalRunner::new(custom());
        let err = runner
            .run(dir.path().join("missing.json"), 5, None)
            .await
            .unwrap_err();
        assert!(matches!(err, raglens_core::Error::TestSetLoad(_)));
    }
}
