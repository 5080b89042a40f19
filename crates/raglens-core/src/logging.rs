//! Structured logging schema and field name constants for raglens.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query evaluation runs by the same field names
//! across the runner, evaluators and retrieval backends.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Run aborted (configuration or test set load failure) |
//! | WARN  | Degraded mode, per-query failure, skipped history line |
//! | INFO  | Run lifecycle (start, finish), history append |
//! | DEBUG | Provider selection, per-query metrics |
//! | TRACE | Per-chunk detail |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "eval", "retrieval", "config", "history"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "runner", "factory", "custom_evaluator", "http_retriever"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "run", "evaluate", "search", "append"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Query text being evaluated.
pub const QUERY: &str = "query";

/// Zero-based position of the test case in the test set.
pub const QUERY_INDEX: &str = "query_index";

/// Collection a query is restricted to.
pub const COLLECTION: &str = "collection";

/// Evaluator provider name.
pub const PROVIDER: &str = "provider";

/// Evaluator identity as reported in the run report.
pub const EVALUATOR: &str = "evaluator";

/// Metric name.
pub const METRIC: &str = "metric";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search.
pub const RESULT_COUNT: &str = "result_count";

/// Requested result bound for a search.
pub const TOP_K: &str = "top_k";

/// Number of test cases in a run.
pub const QUERY_COUNT: &str = "query_count";

/// Number of queries that recorded an error.
pub const FAILED_COUNT: &str = "failed_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Filesystem path involved in the operation.
pub const PATH: &str = "path";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_field_names_are_distinct() {
        let fields = [
            SUBSYSTEM,
            COMPONENT,
            OPERATION,
            QUERY,
            QUERY_INDEX,
            COLLECTION,
            PROVIDER,
            EVALUATOR,
            METRIC,
            DURATION_MS,
            RESULT_COUNT,
            TOP_K,
            QUERY_COUNT,
            FAILED_COUNT,
            ERROR_MSG,
            PATH,
        ];
        let unique: HashSet<&str> = fields.iter().copied().collect();
        assert_eq!(unique.len(), fields.len());
    }
}
