//! The shipped golden test set, recorded results and settings work together.

use std::path::PathBuf;
use std::sync::Arc;

use raglens_core::Settings;
use raglens_eval::{load_test_set, EvalRunner, EvaluatorFactory, StaticRetriever};

const EPS: f64 = 1e-9;

fn workspace_file(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(relative)
}

#[test]
fn test_golden_test_set_loads() {
    let cases = load_test_set(workspace_file("tests/fixtures/golden_test_set.json")).unwrap();
    assert_eq!(cases.len(), 5);
    assert!(cases.iter().all(|c| c.has_ground_truth()));
    assert_eq!(cases[3].collection.as_deref(), Some("multimodal"));
}

#[test]
fn test_default_settings_file_parses() {
    let settings = Settings::from_file(workspace_file("config/settings.yaml")).unwrap();
    assert!(settings.evaluation.enabled);
    assert_eq!(settings.evaluation.provider, "custom");
    assert_eq!(settings.retrieval.top_k, 10);
    assert!(settings.retrieval.endpoint.is_none());
}

#[tokio::test]
async fn test_replay_recorded_results() {
    let settings = Settings::from_file(workspace_file("config/settings.yaml")).unwrap();
    let evaluator = EvaluatorFactory::new()
        .create_from_settings(&settings)
        .unwrap();
    let retriever =
        StaticRetriever::from_file(workspace_file("tests/fixtures/recorded_results.json"))
            .unwrap();

    let runner = EvalRunner::new(evaluator).with_retriever(Some(Arc::new(retriever)));
    let report = runner
        .run(
            workspace_file("tests/fixtures/golden_test_set.json"),
            settings.retrieval.top_k,
            Some(settings.retrieval.collection.as_str()),
        )
        .await
        .unwrap();

    assert_eq!(report.evaluator_name, "custom");
    assert_eq!(report.query_count, 5);
    // Two queries have no recorded results and fail input validation.
    assert_eq!(report.failed_queries(), 2);

    let first = &report.query_results[0].metrics;
    assert!((first["hit_rate"] - 1.0).abs() < EPS);
    assert!((first["mrr"] - 0.5).abs() < EPS);

    assert!((report.aggregate_metrics["hit_rate"] - 2.0 / 3.0).abs() < EPS);
    assert!((report.aggregate_metrics["mrr"] - 0.5).abs() < EPS);
}
