//! Evaluator provider registry.
//!
//! Maps a lowercase provider name from settings (`evaluation.provider`) to a
//! constructor taking the configured metric names. The built-in `custom`
//! provider is registered by [`EvaluatorFactory::new`]; further backends are
//! added with [`EvaluatorFactory::register_provider`] without changing this
//! module.
//!
//! ```rust
//! use raglens_core::{EvaluationSettings, Evaluator};
//! use raglens_eval::factory::EvaluatorFactory;
//!
//! let factory = EvaluatorFactory::new();
//! let settings = EvaluationSettings {
//!     enabled: true,
//!     provider: "custom".to_string(),
//!     metrics: vec!["hit_rate".to_string(), "mrr".to_string()],
//! };
//! let evaluator = factory.create(&settings).unwrap();
//! assert_eq!(evaluator.name(), "custom");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use raglens_core::logging::{COMPONENT, PROVIDER, SUBSYSTEM};
use raglens_core::{Error, EvaluationSettings, Evaluator, Result, Settings};
use tracing::debug;
use tracing::field::{debug as debug_value, display};

use crate::evaluator::{CustomEvaluator, NoneEvaluator};

/// Builds an evaluator from the configured metric names.
pub type EvaluatorConstructor =
    Arc<dyn Fn(&[String]) -> Result<Box<dyn Evaluator>> + Send + Sync>;

/// Registry of evaluator providers.
#[derive(Clone)]
pub struct EvaluatorFactory {
    providers: HashMap<String, EvaluatorConstructor>,
}

impl Default for EvaluatorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EvaluatorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluatorFactory")
            .field("providers", &self.list_providers())
            .finish()
    }
}

impl EvaluatorFactory {
    /// Create a registry holding the built-in providers.
    pub fn new() -> Self {
        let mut factory = Self::empty();
        factory.register_provider(CustomEvaluator::NAME, |metrics: &[String]| {
            Ok(Box::new(CustomEvaluator::new(metrics)?) as Box<dyn Evaluator>)
        });
        factory
    }

    /// Create a registry with no providers.
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register a provider, replacing any existing entry with the same name.
    ///
    /// Names are stored lowercase.
    pub fn register_provider<F>(&mut self, name: impl AsRef<str>, constructor: F)
    where
        F: Fn(&[String]) -> Result<Box<dyn Evaluator>> + Send + Sync + 'static,
    {
        let name = name.as_ref().trim().to_lowercase();
        let replaced = self
            .providers
            .insert(name.clone(), Arc::new(constructor))
            .is_some();
        debug!(
            { SUBSYSTEM } = "eval",
            { COMPONENT } = "factory",
            { PROVIDER } = name.as_str(),
            replaced,
            "Registered evaluator provider"
        );
    }

    /// Whether a provider is registered under `name`.
    pub fn has_provider(&self, name: &str) -> bool {
        self.providers.contains_key(&name.trim().to_lowercase())
    }

    /// Registered provider names, sorted alphabetically.
    pub fn list_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Build the evaluator selected by `settings`.
    ///
    /// Disabled evaluation always yields [`NoneEvaluator`], even for an
    /// unknown provider. Otherwise an unregistered provider fails with
    /// [`Error::UnknownProvider`] and metric validation errors from the
    /// provider's constructor are returned unchanged.
    pub fn create(&self, settings: &EvaluationSettings) -> Result<Box<dyn Evaluator>> {
        if !settings.enabled {
            debug!(
                { SUBSYSTEM } = "eval",
                { COMPONENT } = "factory",
                "Evaluation disabled, using none evaluator"
            );
            return Ok(Box::new(NoneEvaluator::new()));
        }

        let provider = settings.provider.trim().to_lowercase();
        let constructor =
            self.providers
                .get(&provider)
                .ok_or_else(|| Error::UnknownProvider {
                    provider: settings.provider.clone(),
                    available: self.list_providers(),
                })?;

        debug!(
            { SUBSYSTEM } = "eval",
            { COMPONENT } = "factory",
            { PROVIDER } = display(&provider),
            metrics = debug_value(&settings.metrics),
            "Creating evaluator"
        );
        constructor(&settings.metrics)
    }

    /// Build the evaluator from the `evaluation` section of `settings`.
    pub fn create_from_settings(&self, settings: &Settings) -> Result<Box<dyn Evaluator>> {
        self.create(&settings.evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::CompositeEvaluator;

    fn settings(enabled: bool, provider: &str, metrics: &[&str]) -> EvaluationSettings {
        EvaluationSettings {
            enabled,
            provider: provider.to_string(),
            metrics: metrics.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn custom_constructor(metrics: &[String]) -> Result<Box<dyn Evaluator>> {
        Ok(Box::new(CustomEvaluator::new(metrics)?))
    }

    #[test]
    fn test_create_custom_evaluator() {
        let factory = EvaluatorFactory::new();
        let evaluator = factory
            .create(&settings(true, "custom", &["hit_rate", "mrr"]))
            .unwrap();
        assert_eq!(evaluator.name(), "custom");
    }

    #[test]
    fn test_provider_lookup_is_case_insensitive() {
        let factory = EvaluatorFactory::new();
        let evaluator = factory.create(&settings(true, " Custom ", &["mrr"])).unwrap();
        assert_eq!(evaluator.name(), "custom");
    }

    #[test]
    fn test_create_disabled_returns_none_evaluator() {
        let factory = EvaluatorFactory::new();
        let evaluator = factory
            .create(&settings(false, "custom", &["hit_rate"]))
            .unwrap();
        assert_eq!(evaluator.name(), NoneEvaluator::NAME);
    }

    #[test]
    fn test_create_disabled_ignores_invalid_provider() {
        let factory = EvaluatorFactory::new();
        let evaluator = factory
            .create(&settings(false, "does-not-exist", &["faithfulness"]))
            .unwrap();
        assert_eq!(evaluator.name(), NoneEvaluator::NAME);
    }

    #[test]
    fn test_create_unknown_provider_raises() {
        let factory = EvaluatorFactory::new();
        let err = factory
            .create(&settings(true, "unknown", &["hit_rate"]))
            .err()
            .unwrap();

        assert!(err.to_string().starts_with("Unsupported Evaluator provider"));
        match err {
            Error::UnknownProvider {
                provider,
                available,
            } => {
                assert_eq!(provider, "unknown");
                assert_eq!(available, vec!["custom"]);
            }
            other => panic!("Expected UnknownProvider, got {:?}", other),
        }
    }

    #[test]
    fn test_create_surfaces_unsupported_metric() {
        let factory = EvaluatorFactory::new();
        let err = factory
            .create(&settings(true, "custom", &["faithfulness"]))
            .err()
            .unwrap();
        assert!(matches!(err, Error::UnsupportedMetric { .. }));
    }

    #[test]
    fn test_register_provider_success() {
        let mut factory = EvaluatorFactory::new();
        factory.register_provider("fake", custom_constructor);

        assert!(factory.has_provider("fake"));
        assert!(factory.has_provider("FAKE"));
        let evaluator = factory.create(&settings(true, "fake", &["mrr"])).unwrap();
        assert_eq!(evaluator.name(), "custom");
    }

    #[test]
    fn test_register_provider_overwrites() {
        let mut factory = EvaluatorFactory::new();
        factory.register_provider("custom", |_metrics: &[String]| {
            Ok(Box::new(NoneEvaluator::new()) as Box<dyn Evaluator>)
        });

        let evaluator = factory.create(&settings(true, "custom", &["mrr"])).unwrap();
        assert_eq!(evaluator.name(), NoneEvaluator::NAME);
        assert_eq!(factory.list_providers(), vec!["custom"]);
    }

    /// Collects formatted log output for level assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs(level: tracing::Level, f: impl FnOnce()) -> String {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_register_provider_logs_at_debug() {
        let at_info = capture_logs(tracing::Level::INFO, || {
            EvaluatorFactory::new().register_provider("fake", custom_constructor);
        });
        assert!(!at_info.contains("Registered evaluator provider"), "{}", at_info);

        let at_debug = capture_logs(tracing::Level::DEBUG, || {
            EvaluatorFactory::new().register_provider("fake", custom_constructor);
        });
        let line = at_debug
            .lines()
            .find(|l| l.contains("Registered evaluator provider"))
            .unwrap();
        assert!(line.contains("DEBUG"), "{}", line);
        assert!(line.contains("fake"), "{}", line);
    }

    #[test]
    fn test_list_providers_sorted() {
        let mut factory = EvaluatorFactory::new();
        factory.register_provider("beta", custom_constructor);
        factory.register_provider("alpha", custom_constructor);

        assert_eq!(factory.list_providers(), vec!["alpha", "beta", "custom"]);
    }

    #[test]
    fn test_registries_are_independent() {
        let mut extended = EvaluatorFactory::new();
        extended.register_provider("extra", custom_constructor);

        let fresh = EvaluatorFactory::new();
        assert!(!fresh.has_provider("extra"));
        assert!(EvaluatorFactory::empty().list_providers().is_empty());
    }

    #[test]
    fn test_register_composite_provider() {
        let mut factory = EvaluatorFactory::new();
        factory.register_provider("composite", |metrics: &[String]| {
            let children: Vec<Box<dyn Evaluator>> = vec![
                Box::new(CustomEvaluator::new(metrics)?),
                Box::new(NoneEvaluator::new()),
            ];
            Ok(Box::new(CompositeEvaluator::new(children)?) as Box<dyn Evaluator>)
        });

        let evaluator = factory
            .create(&settings(true, "composite", &["hit_rate"]))
            .unwrap();
        assert_eq!(evaluator.name(), "composite(custom+none)");
    }

    #[test]
    fn test_create_from_settings() {
        let factory = EvaluatorFactory::new();
        let settings = Settings::default().with_evaluation_override("custom");
        let evaluator = factory.create_from_settings(&settings).unwrap();
        assert_eq!(evaluator.name(), "custom");
    }
}
