//! Settings for evaluation runs.
//!
//! Settings are read from the project's YAML settings file (default
//! `config/settings.yaml`). The file usually carries many sections for the
//! wider RAG system; only `evaluation` and `retrieval` are consumed here and
//! everything else is ignored.
//!
//! ```yaml
//! evaluation:
//!   enabled: true
//!   provider: custom
//!   metrics: [hit_rate, mrr]
//! retrieval:
//!   top_k: 10
//!   collection: default
//!   endpoint: ${RAG_SEARCH_URL}
//! ```
//!
//! `${VAR}` references are substituted from the environment before parsing,
//! and `RAGLENS_*` variables override file values afterwards.

use std::env;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::field::display;
use tracing::{debug, info};

use crate::defaults;
use crate::error::{Error, Result};
use crate::logging::{PATH, SUBSYSTEM};

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("static pattern is valid"));

/// Evaluation gate and backend selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSettings {
    /// When false the disabled evaluator is used regardless of `provider`.
    #[serde(default)]
    pub enabled: bool,
    /// Registered evaluator provider name.
    #[serde(default = "EvaluationSettings::default_provider")]
    pub provider: String,
    /// Metric names to compute.
    #[serde(default = "EvaluationSettings::default_metrics")]
    pub metrics: Vec<String>,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: Self::default_provider(),
            metrics: Self::default_metrics(),
        }
    }
}

impl EvaluationSettings {
    fn default_provider() -> String {
        defaults::EVAL_PROVIDER.to_string()
    }

    fn default_metrics() -> Vec<String> {
        defaults::EVAL_METRICS.iter().map(|m| m.to_string()).collect()
    }
}

/// Retrieval parameters for evaluation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    #[serde(default = "RetrievalSettings::default_top_k")]
    pub top_k: usize,
    #[serde(default = "RetrievalSettings::default_collection")]
    pub collection: String,
    /// Base URL of an HTTP search service. None means no live retriever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "RetrievalSettings::default_timeout")]
    pub timeout_secs: u64,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: Self::default_top_k(),
            collection: Self::default_collection(),
            endpoint: None,
            timeout_secs: Self::default_timeout(),
        }
    }
}

impl RetrievalSettings {
    fn default_top_k() -> usize {
        defaults::TOP_K
    }

    fn default_collection() -> String {
        defaults::COLLECTION.to_string()
    }

    fn default_timeout() -> u64 {
        defaults::RETRIEVAL_TIMEOUT_SECS
    }
}

/// Top-level settings consumed by raglens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub evaluation: EvaluationSettings,
    #[serde(default)]
    pub retrieval: RetrievalSettings,
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file does
    /// not exist. Environment overrides are applied in both cases.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut settings = if path.exists() {
            info!(
                { SUBSYSTEM } = "config",
                { PATH } = display(path.display()),
                "Loading settings"
            );
            Self::from_file(path)?
        } else {
            debug!(
                { SUBSYSTEM } = "config",
                { PATH } = display(path.display()),
                "Settings file not found, using defaults"
            );
            Self::default()
        };
        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// Parse a YAML settings file without applying environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = substitute_env_vars(content);
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Apply `RAGLENS_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(enabled) = lookup(defaults::ENV_EVAL_ENABLED) {
            self.evaluation.enabled = matches!(
                enabled.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        if let Some(provider) = lookup(defaults::ENV_EVAL_PROVIDER) {
            self.evaluation.provider = provider.trim().to_string();
        }
        if let Some(metrics) = lookup(defaults::ENV_EVAL_METRICS) {
            self.evaluation.metrics = metrics
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(top_k) = lookup(defaults::ENV_TOP_K).and_then(|v| v.trim().parse().ok()) {
            self.retrieval.top_k = top_k;
        }
        if let Some(collection) = lookup(defaults::ENV_COLLECTION) {
            self.retrieval.collection = collection.trim().to_string();
        }
        if let Some(url) = lookup(defaults::ENV_SEARCH_URL) {
            let url = url.trim();
            self.retrieval.endpoint = (!url.is_empty()).then(|| url.to_string());
        }
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be at least 1".to_string()));
        }
        if self.evaluation.enabled && self.evaluation.provider.trim().is_empty() {
            return Err(Error::Config(
                "evaluation.provider cannot be empty when evaluation is enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Copy of these settings with evaluation forced on and the provider
    /// replaced. Metrics are kept.
    pub fn with_evaluation_override(&self, provider: impl Into<String>) -> Self {
        let mut settings = self.clone();
        settings.evaluation.enabled = true;
        settings.evaluation.provider = provider.into();
        settings
    }
}

/// Replace `${VAR}` references with environment values. Unset variables are
/// left as written.
fn substitute_env_vars(content: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
}
