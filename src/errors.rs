// src/errors.rs

//! Crate-wide error taxonomy and helpers.
//!
//! The variants follow the failure classes of the build pipeline:
//! configuration problems are fatal at load time, missing inputs and
//! external-tool failures abort the running pipeline at the failing step,
//! and lint violations are carried in reports rather than errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteforgeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown pipeline: {0}")]
    UnknownPipeline(String),

    #[error("Cycle detected in pipeline aliases involving '{0}'")]
    PipelineCycle(String),

    #[error("Unknown step reference: {0}")]
    UnknownStep(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("external tool '{tool}' failed: {message}")]
    ToolFailure { tool: String, message: String },

    #[error("pipeline '{pipeline}' aborted at step '{step}': {source}")]
    StepFailed {
        pipeline: String,
        step: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SiteforgeError>;
