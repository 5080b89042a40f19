//! Golden test set loading.
//!
//! Accepted layouts:
//!
//! - `.json` with a top-level array of test cases
//! - `.json` with an object holding a `test_cases` array
//! - `.jsonl` with one test case per line (blank lines skipped)
//!
//! Each test case needs a string `query`; `expected_chunk_ids` and
//! `collection` are optional.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use raglens_core::logging::{COMPONENT, PATH, QUERY_COUNT, SUBSYSTEM};
use raglens_core::{Error, Result, TestCase};
use serde::Deserialize;
use tracing::field::display;
use tracing::info;

#[derive(Deserialize)]
#[serde(untagged)]
enum TestSetFile {
    Cases(Vec<TestCase>),
    Wrapped { test_cases: Vec<TestCase> },
}

/// Load a test set, choosing the layout from the file extension.
pub fn load_test_set(path: impl AsRef<Path>) -> Result<Vec<TestCase>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::TestSetLoad(format!(
            "test set not found: {}",
            path.display()
        )));
    }

    let is_jsonl = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));

    let cases = if is_jsonl {
        load_jsonl(path)?
    } else {
        load_json(path)?
    };

    info!(
        { SUBSYSTEM } = "eval",
        { COMPONENT } = "dataset",
        { PATH } = display(path.display()),
        { QUERY_COUNT } = cases.len(),
        "Loaded test set"
    );
    Ok(cases)
}

fn load_json(path: &Path) -> Result<Vec<TestCase>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::TestSetLoad(format!("failed to read {}: {}", path.display(), e)))?;
    parse_test_set(&content)
        .map_err(|e| Error::TestSetLoad(format!("malformed test set {}: {}", path.display(), e)))
}

/// Parse test cases from JSON text in either array or `test_cases` form.
pub fn parse_test_set(content: &str) -> std::result::Result<Vec<TestCase>, serde_json::Error> {
    let file: TestSetFile = serde_json::from_str(content)?;
    Ok(match file {
        TestSetFile::Cases(cases) => cases,
        TestSetFile::Wrapped { test_cases } => test_cases,
    })
}

fn load_jsonl(path: &Path) -> Result<Vec<TestCase>> {
    let file = File::open(path)
        .map_err(|e| Error::TestSetLoad(format!("failed to open {}: {}", path.display(), e)))?;
    let reader = BufReader::new(file);
    let mut cases = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            Error::TestSetLoad(format!("failed to read {}: {}", path.display(), e))
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let case: TestCase = serde_json::from_str(&line).map_err(|e| {
            Error::TestSetLoad(format!(
                "malformed test case at {}:{}: {}",
                path.display(),
                idx + 1,
                e
            ))
        })?;
        cases.push(case);
    }

    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "golden.json",
            r#"[
                {"query": "What is RRF?", "expected_chunk_ids": ["c1", "c2"]},
                {"query": "How are PDFs chunked?", "collection": "docs"}
            ]"#,
        );

        let cases = load_test_set(&path).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].query, "What is RRF?");
        assert_eq!(cases[0].expected_chunk_ids, vec!["c1", "c2"]);
        assert!(cases[1].expected_chunk_ids.is_empty());
        assert_eq!(cases[1].collection.as_deref(), Some("docs"));
    }

    #[test]
    fn test_load_json_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "golden.json",
            r#"{"description": "smoke", "test_cases": [{"query": "q1"}, {"query": "q2"}]}"#,
        );

        let cases = load_test_set(&path).unwrap();
        assert_eq!(
            cases.iter().map(|c| c.query.as_str()).collect::<Vec<_>>(),
            vec!["q1", "q2"]
        );
    }

    #[test]
    fn test_load_jsonl_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "golden.jsonl",
            "{\"query\": \"q1\", \"expected_chunk_ids\": [\"a\"]}\n\n   \n{\"query\": \"q2\"}\n",
        );

        let cases = load_test_set(&path).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].expected_chunk_ids, vec!["a"]);
    }

    #[test]
    fn test_load_jsonl_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "golden.jsonl", "{\"query\": \"q1\"}\n{\"oops\": 1}\n");

        let err = load_test_set(&path).unwrap_err();
        assert!(matches!(err, Error::TestSetLoad(_)));
        assert!(err.to_string().contains(":2:"), "{}", err);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_test_set(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::TestSetLoad(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_record_without_query_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "golden.json", r#"[{"expected_chunk_ids": ["c1"]}]"#);
        assert!(matches!(
            load_test_set(&path).unwrap_err(),
            Error::TestSetLoad(_)
        ));
    }

    #[test]
    fn test_malformed_json_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "golden.json", "{ not json");
        assert!(matches!(
            load_test_set(&path).unwrap_err(),
            Error::TestSetLoad(_)
        ));
    }

    #[test]
    fn test_empty_array_is_valid() {
        assert!(parse_test_set("[]").unwrap().is_empty());
    }
}
