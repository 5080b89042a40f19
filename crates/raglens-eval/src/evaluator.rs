//! Evaluator implementations.
//!
//! - [`NoneEvaluator`]: evaluation disabled; validates inputs, returns no metrics
//! - [`CustomEvaluator`]: local hit-rate / MRR against ground-truth chunk ids
//! - [`CompositeEvaluator`]: runs several evaluators and merges their metrics
//!
//! LLM-judged backends plug in through the same [`Evaluator`] trait and are
//! registered with the [`EvaluatorFactory`](crate::factory::EvaluatorFactory).

use async_trait::async_trait;
use raglens_core::logging::{COMPONENT, METRIC, QUERY, RESULT_COUNT, SUBSYSTEM};
use raglens_core::{Error, Evaluator, MetricMap, Result, RetrievedChunk};
use tracing::field::debug as debug_value;
use tracing::{debug, trace};

use crate::metrics::{compute_all, Metric};

/// Reject blank queries and empty result lists.
///
/// Shared by every built-in evaluator so validation always happens before
/// any metric is computed.
pub fn validate_inputs(query: &str, retrieved_chunks: &[RetrievedChunk]) -> Result<()> {
    if query.trim().is_empty() {
        return Err(Error::validation("query", "Query cannot be empty"));
    }
    if retrieved_chunks.is_empty() {
        return Err(Error::validation(
            "retrieved_chunks",
            "retrieved_chunks cannot be empty",
        ));
    }
    Ok(())
}

// =============================================================================
// DISABLED
// =============================================================================

/// Evaluator used when evaluation is turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneEvaluator;

impl NoneEvaluator {
    pub const NAME: &'static str = "none";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Evaluator for NoneEvaluator {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn evaluate(
        &self,
        query: &str,
        retrieved_chunks: &[RetrievedChunk],
        _ground_truth: Option<&[String]>,
        _generated_answer: Option<&str>,
    ) -> Result<MetricMap> {
        validate_inputs(query, retrieved_chunks)?;
        Ok(MetricMap::new())
    }
}

// =============================================================================
// CUSTOM
// =============================================================================

/// Local retrieval metrics computed from chunk ids.
///
/// Requires ground-truth ids (`expected_chunk_ids` in the test set) to produce
/// non-zero scores.
#[derive(Debug, Clone)]
pub struct CustomEvaluator {
    metrics: Vec<Metric>,
}

impl CustomEvaluator {
    pub const NAME: &'static str = "custom";

    /// Create an evaluator computing the named metrics.
    ///
    /// Fails with [`Error::UnsupportedMetric`] listing every name outside the
    /// supported set. An empty list selects all supported metrics; duplicate
    /// names are computed once.
    pub fn new<S: AsRef<str>>(metrics: &[S]) -> Result<Self> {
        let mut selected = Vec::new();
        let mut unsupported = Vec::new();

        for name in metrics {
            match name.as_ref().parse::<Metric>() {
                Ok(metric) if !selected.contains(&metric) => selected.push(metric),
                Ok(_) => {}
                Err(_) => unsupported.push(name.as_ref().to_string()),
            }
        }

        if !unsupported.is_empty() {
            return Err(Error::UnsupportedMetric {
                metrics: unsupported,
                supported: Metric::supported_names(),
            });
        }

        if selected.is_empty() {
            selected = Metric::ALL.to_vec();
        }

        debug!(
            { SUBSYSTEM } = "eval",
            { COMPONENT } = "custom_evaluator",
            metrics = debug_value(&selected),
            "Created custom evaluator"
        );
        Ok(Self { metrics: selected })
    }

    /// Metrics this evaluator computes, in configured order.
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }
}

#[async_trait]
impl Evaluator for CustomEvaluator {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn evaluate(
        &self,
        query: &str,
        retrieved_chunks: &[RetrievedChunk],
        ground_truth: Option<&[String]>,
        _generated_answer: Option<&str>,
    ) -> Result<MetricMap> {
        validate_inputs(query, retrieved_chunks)?;

        let retrieved: Vec<&str> = retrieved_chunks.iter().map(|c| c.id.as_str()).collect();
        let ground_truth = ground_truth.unwrap_or(&[]);

        let scores = compute_all(&self.metrics, &retrieved, ground_truth);
        for (name, value) in &scores {
            trace!(
                { SUBSYSTEM } = "eval",
                { COMPONENT } = "custom_evaluator",
                { QUERY } = query,
                { METRIC } = name.as_str(),
                value,
                "Computed metric"
            );
        }
        debug!(
            { SUBSYSTEM } = "eval",
            { COMPONENT } = "custom_evaluator",
            { QUERY } = query,
            { RESULT_COUNT } = retrieved.len(),
            ground_truth = ground_truth.len(),
            "Custom evaluation complete"
        );
        Ok(scores)
    }
}

// =============================================================================
// COMPOSITE
// =============================================================================

/// Runs several evaluators on the same input and merges their metrics.
///
/// Children run in order; when two children emit the same metric name the
/// later one wins.
pub struct CompositeEvaluator {
    name: String,
    children: Vec<Box<dyn Evaluator>>,
}

impl CompositeEvaluator {
    pub fn new(children: Vec<Box<dyn Evaluator>>) -> Result<Self> {
        if children.is_empty() {
            return Err(Error::Config(
                "Composite evaluator needs at least one child".to_string(),
            ));
        }
        let name = format!(
            "composite({})",
            children
                .iter()
                .map(|c| c.name())
                .collect::<Vec<_>>()
                .join("+")
        );
        Ok(Self { name, children })
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[async_trait]
impl Evaluator for CompositeEvaluator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(
        &self,
        query: &str,
        retrieved_chunks: &[RetrievedChunk],
        ground_truth: Option<&[String]>,
        generated_answer: Option<&str>,
    ) -> Result<MetricMap> {
        validate_inputs(query, retrieved_chunks)?;

        let mut merged = MetricMap::new();
        for child in &self.children {
            let metrics = child
                .evaluate(query, retrieved_chunks, ground_truth, generated_answer)
                .await?;
            merged.extend(metrics);
        }
        Ok(merged)
    }
}
