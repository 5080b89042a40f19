//! # raglens-core
//!
//! Core types, traits, and configuration for the raglens evaluation toolkit.
//!
//! This crate provides the data model exchanged between retrievers,
//! evaluators and the evaluation runner, the collaborator traits, the shared
//! error type, settings loading and default constants.

pub mod config;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use config::{EvaluationSettings, RetrievalSettings, Settings};
pub use error::{Error, ErrorKind, Result};
pub use models::*;
pub use traits::*;
