//! Append-only evaluation history log.
//!
//! One JSON record per line: a `timestamp` followed by the report fields.
//! Unreadable lines are skipped on load so a partially written or hand-edited
//! file never hides the rest of the history.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use raglens_core::defaults::{HISTORY_PATH, HISTORY_TIMESTAMP_FORMAT};
use raglens_core::logging::{
    COMPONENT, ERROR_MSG, EVALUATOR, OPERATION, PATH, QUERY_COUNT, SUBSYSTEM,
};
use raglens_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::field::display;
use tracing::{info, warn};

use crate::report::EvalReport;

/// A persisted report with the time it was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Local time, `%Y-%m-%d %H:%M:%S`.
    pub timestamp: String,
    #[serde(flatten)]
    pub report: EvalReport,
}

impl HistoryEntry {
    /// Stamp `report` with the current local time.
    pub fn now(report: EvalReport) -> Self {
        Self {
            timestamp: chrono::Local::now()
                .format(HISTORY_TIMESTAMP_FORMAT)
                .to_string(),
            report,
        }
    }
}

/// JSONL history file.
#[derive(Debug, Clone)]
pub struct EvalHistory {
    path: PathBuf,
}

impl Default for EvalHistory {
    fn default() -> Self {
        Self::new(HISTORY_PATH)
    }
}

impl EvalHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Timestamp `report` and append it as one line.
    pub fn append(&self, report: &EvalReport) -> Result<HistoryEntry> {
        let entry = HistoryEntry::now(report.clone());
        self.append_entry(&entry)?;
        Ok(entry)
    }

    /// Append an already stamped entry.
    pub fn append_entry(&self, entry: &HistoryEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let line = serde_json::to_string(entry)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;

        info!(
            { SUBSYSTEM } = "history",
            { COMPONENT } = "eval_history",
            { OPERATION } = "append",
            { PATH } = display(self.path.display()),
            { EVALUATOR } = entry.report.evaluator_name.as_str(),
            { QUERY_COUNT } = entry.report.query_count,
            "Appended evaluation to history"
        );
        Ok(())
    }

    /// Every readable entry in file order. A missing file is an empty history.
    ///
    /// Lines are decoded one at a time, so a line that is not valid UTF-8 is
    /// skipped like any other malformed line.
    pub fn load(&self) -> Result<Vec<HistoryEntry>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Io(e)),
        };

        let mut entries = Vec::new();
        for (idx, raw) in bytes.split(|b| *b == b'\n').enumerate() {
            let line = match std::str::from_utf8(raw) {
                Ok(line) => line.trim(),
                Err(e) => {
                    self.skip_line(idx, &e);
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => self.skip_line(idx, &e),
            }
        }
        Ok(entries)
    }

    fn skip_line(&self, idx: usize, error: &dyn std::fmt::Display) {
        warn!(
            { SUBSYSTEM } = "history",
            { COMPONENT } = "eval_history",
            { PATH } = display(self.path.display()),
            line = idx + 1,
            { ERROR_MSG } = display(error),
            "Skipping malformed history line"
        );
    }

    /// The last `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let mut entries = self.load()?;
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.split_off(skip))
    }
}
