//! # raglens-eval
//!
//! Retrieval quality evaluation for raglens.
//!
//! This crate provides:
//! - Retrieval metrics (hit rate, mean reciprocal rank)
//! - Disabled, custom and composite evaluators
//! - A provider registry that builds evaluators from settings
//! - A batch runner producing per-query and aggregate results
//! - Golden test set loading (JSON and JSONL)
//! - HTTP and recorded-result retrievers
//! - An append-only evaluation history log
//!
//! # Example
//!
//! ```rust,no_run
//! use raglens_core::Settings;
//! use raglens_eval::{connect_retriever, EvalRunner, EvaluatorFactory};
//!
//! #[tokio::main]
//! async fn main() -> raglens_core::Result<()> {
//!     let settings = Settings::load("config/settings.yaml")?;
//!     let evaluator = EvaluatorFactory::new().create_from_settings(&settings)?;
//!     let runner = EvalRunner::new(evaluator).with_retriever(connect_retriever(&settings));
//!
//!     let report = runner
//!         .run("tests/fixtures/golden_test_set.json", settings.retrieval.top_k, None)
//!         .await?;
//!     println!("{}", report.text_summary());
//!     Ok(())
//! }
//! ```

pub mod answer;
pub mod dataset;
pub mod evaluator;
pub mod factory;
pub mod history;
pub mod metrics;
pub mod report;
pub mod retriever;
pub mod runner;

pub use answer::ExtractiveAnswer;
pub use dataset::load_test_set;
pub use evaluator::{CompositeEvaluator, CustomEvaluator, NoneEvaluator};
pub use factory::{EvaluatorConstructor, EvaluatorFactory};
pub use history::{EvalHistory, HistoryEntry};
pub use metrics::{hit_rate, reciprocal_rank, Metric};
pub use report::EvalReport;
pub use retriever::{connect_retriever, HttpRetriever, StaticRetriever};
pub use runner::EvalRunner;
