//! Evaluation report for one batch run.

use std::collections::BTreeMap;

use raglens_core::{MetricMap, QueryResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Longest query prefix shown per line in [`EvalReport::text_summary`].
const SUMMARY_QUERY_CHARS: usize = 80;

/// Aggregate of a full evaluation run.
///
/// Invariants: `query_count == query_results.len()`, and every key in
/// `aggregate_metrics` appears in at least one query result's metrics.
/// Timestamps are attached by the history log at persistence time, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    /// Identity of the evaluator that scored the run.
    pub evaluator_name: String,
    pub query_count: usize,
    /// Sum of per-query elapsed times.
    pub total_elapsed_ms: f64,
    /// Mean per metric over the query results that produced it.
    #[serde(default)]
    pub aggregate_metrics: MetricMap,
    /// One entry per test case, in input order.
    #[serde(default)]
    pub query_results: Vec<QueryResult>,
}

impl EvalReport {
    /// Build a report from per-query results.
    pub fn from_results(evaluator_name: impl Into<String>, query_results: Vec<QueryResult>) -> Self {
        let total_elapsed_ms = query_results.iter().map(|r| r.elapsed_ms).sum();
        Self {
            evaluator_name: evaluator_name.into(),
            query_count: query_results.len(),
            total_elapsed_ms,
            aggregate_metrics: aggregate_metrics(&query_results),
            query_results,
        }
    }

    /// Plain map of the report's attributes, in declaration order, with
    /// nested query results converted the same way.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // Only string keys and finite-or-null floats are involved, so
            // serialization to an object cannot fail.
            _ => Map::new(),
        }
    }

    /// Number of query results that recorded a failure.
    pub fn failed_queries(&self) -> usize {
        self.query_results.iter().filter(|r| r.is_failed()).count()
    }

    /// Markdown summary for terminal display.
    pub fn text_summary(&self) -> String {
        let mut lines = vec![
            "# Retrieval Evaluation Report".to_string(),
            format!("Evaluator: {}", self.evaluator_name),
            format!(
                "Queries: {} ({} failed)",
                self.query_count,
                self.failed_queries()
            ),
            format!("Total time: {:.1} ms", self.total_elapsed_ms),
            String::new(),
            "## Aggregate Metrics".to_string(),
        ];

        if self.aggregate_metrics.is_empty() {
            lines.push("- (none)".to_string());
        }
        for (name, value) in &self.aggregate_metrics {
            lines.push(format!("- {}: {:.4}", name, value));
        }

        lines.push(String::new());
        lines.push("## Queries".to_string());
        for (idx, result) in self.query_results.iter().enumerate() {
            let query: String = result.query.chars().take(SUMMARY_QUERY_CHARS).collect();
            let metrics = result
                .metric_summary()
                .unwrap_or_else(|| "no metrics".to_string());
            let mut line = format!(
                "Q{}: {} — {:.0} ms — {}",
                idx + 1,
                query,
                result.elapsed_ms,
                metrics
            );
            if let Some(error) = &result.error {
                line.push_str(&format!(" (error: {})", error));
            }
            lines.push(line);
        }

        lines.join("\n")
    }
}

/// Arithmetic mean per metric name over the results that contain it.
///
/// Results missing a metric do not count toward that metric's mean.
pub fn aggregate_metrics(results: &[QueryResult]) -> MetricMap {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for result in results {
        for (name, value) in &result.metrics {
            let entry = sums.entry(name.as_str()).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|(name, (sum, count))| (name.to_string(), sum / count as f64))
        .collect()
}
