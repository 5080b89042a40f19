//! Centralized default constants for raglens.
//!
//! Crates and the command-line runner reference these constants instead of
//! defining their own magic numbers.

// =============================================================================
// EVALUATION
// =============================================================================

/// Evaluator provider used when the settings file does not name one.
pub const EVAL_PROVIDER: &str = "custom";

/// Metrics computed when the settings file does not list any.
pub const EVAL_METRICS: &[&str] = &["hit_rate", "mrr"];

/// Default golden test set location (relative to the working directory).
pub const GOLDEN_TEST_SET: &str = "tests/fixtures/golden_test_set.json";

// =============================================================================
// RETRIEVAL
// =============================================================================

/// Chunks requested per query.
pub const TOP_K: usize = 10;

/// Largest top-k accepted from user input.
pub const TOP_K_MAX: usize = 50;

/// Collection searched when none is given.
pub const COLLECTION: &str = "default";

/// Request timeout for the HTTP search service, in seconds.
pub const RETRIEVAL_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// ANSWER GENERATION
// =============================================================================

/// Number of leading chunks joined into an extractive answer.
pub const ANSWER_CHUNKS: usize = 3;

/// Maximum characters in an extractive answer.
pub const ANSWER_MAX_CHARS: usize = 1500;

// =============================================================================
// HISTORY
// =============================================================================

/// Append-only evaluation history log.
pub const HISTORY_PATH: &str = "logs/eval_history.jsonl";

/// Number of past runs shown by default.
pub const HISTORY_DISPLAY_LIMIT: usize = 10;

/// Timestamp format attached to history entries.
pub const HISTORY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Settings file read by the command-line runner.
pub const SETTINGS_PATH: &str = "config/settings.yaml";

/// Environment variable: force evaluation on/off.
pub const ENV_EVAL_ENABLED: &str = "RAGLENS_EVAL_ENABLED";

/// Environment variable: evaluator provider.
pub const ENV_EVAL_PROVIDER: &str = "RAGLENS_EVAL_PROVIDER";

/// Environment variable: comma-separated metric names.
pub const ENV_EVAL_METRICS: &str = "RAGLENS_EVAL_METRICS";

/// Environment variable: retrieval top-k.
pub const ENV_TOP_K: &str = "RAGLENS_TOP_K";

/// Environment variable: retrieval collection.
pub const ENV_COLLECTION: &str = "RAGLENS_COLLECTION";

/// Environment variable: HTTP search service URL.
pub const ENV_SEARCH_URL: &str = "RAGLENS_SEARCH_URL";
