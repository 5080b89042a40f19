//! Retrieval quality metrics computed per query.
//!
//! Both metrics take the ranked list of retrieved identifiers (best first)
//! and the ground-truth identifiers for the query, and return a value in
//! `[0.0, 1.0]`. Empty ground truth scores 0.0 since nothing can be hit.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use raglens_core::{Error, MetricMap};
use serde::{Deserialize, Serialize};

/// Metrics computable without an LLM judge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// 1.0 if any ground-truth id was retrieved, else 0.0.
    HitRate,
    /// Reciprocal rank of the first retrieved ground-truth id.
    Mrr,
}

impl Metric {
    /// Every supported metric, in canonical order.
    pub const ALL: [Metric; 2] = [Metric::HitRate, Metric::Mrr];

    /// Metric key as it appears in metric maps and settings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HitRate => "hit_rate",
            Self::Mrr => "mrr",
        }
    }

    /// Supported metric names, in canonical order.
    pub fn supported_names() -> Vec<String> {
        Self::ALL.iter().map(|m| m.as_str().to_string()).collect()
    }

    /// Score `retrieved` against `ground_truth`.
    pub fn compute<R, G>(&self, retrieved: &[R], ground_truth: &[G]) -> f64
    where
        R: AsRef<str>,
        G: AsRef<str>,
    {
        match self {
            Self::HitRate => hit_rate(retrieved, ground_truth),
            Self::Mrr => reciprocal_rank(retrieved, ground_truth),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hit_rate" => Ok(Self::HitRate),
            "mrr" => Ok(Self::Mrr),
            _ => Err(Error::UnsupportedMetric {
                metrics: vec![s.to_string()],
                supported: Self::supported_names(),
            }),
        }
    }
}

fn truth_set<G: AsRef<str>>(ground_truth: &[G]) -> HashSet<&str> {
    ground_truth.iter().map(AsRef::as_ref).collect()
}

/// 1.0 if at least one retrieved id is in the ground truth, else 0.0.
pub fn hit_rate<R, G>(retrieved: &[R], ground_truth: &[G]) -> f64
where
    R: AsRef<str>,
    G: AsRef<str>,
{
    let truth = truth_set(ground_truth);
    if retrieved.iter().any(|id| truth.contains(id.as_ref())) {
        1.0
    } else {
        0.0
    }
}

/// `1 / position` of the first retrieved id that is in the ground truth
/// (1-indexed), or 0.0 when nothing matches.
///
/// With several ground-truth ids only the earliest match in `retrieved`
/// counts; matches further down the list do not change the score.
pub fn reciprocal_rank<R, G>(retrieved: &[R], ground_truth: &[G]) -> f64
where
    R: AsRef<str>,
    G: AsRef<str>,
{
    let truth = truth_set(ground_truth);
    retrieved
        .iter()
        .position(|id| truth.contains(id.as_ref()))
        .map(|idx| 1.0 / (idx + 1) as f64)
        .unwrap_or(0.0)
}

/// Compute each metric in `metrics` into a map keyed by metric name.
pub fn compute_all<R, G>(metrics: &[Metric], retrieved: &[R], ground_truth: &[G]) -> MetricMap
where
    R: AsRef<str>,
    G: AsRef<str>,
{
    metrics
        .iter()
        .map(|m| (m.as_str().to_string(), m.compute(retrieved, ground_truth)))
        .collect()
}
