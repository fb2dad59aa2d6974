//! Error types for pageforge.
//!
//! Library crates use [`PageforgeError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all pageforge operations.
#[derive(Debug, thiserror::Error)]
pub enum PageforgeError {
    /// The input product record failed validation.
    #[error("malformed input: field `{field}` {reason}")]
    MalformedInput { field: String, reason: String },

    /// A strategy was requested for a page type the resolver does not know.
    #[error("unsupported page type: `{page_type}`")]
    UnsupportedPageType { page_type: String },

    /// A page render or step ran before the run state it needs was populated.
    #[error("missing dependency: `{consumer}` requires `{key}` in run state")]
    MissingDependency { consumer: String, key: String },

    /// A page-specific minimum content constraint is unmet.
    #[error(
        "insufficient content: `{page_type}` needs at least {required} {key}, got {actual}"
    )]
    InsufficientContent {
        page_type: String,
        key: String,
        required: usize,
        actual: usize,
    },

    /// A step tried to overwrite a run state key written earlier in the run.
    #[error("state conflict: `{key}` was already written during this run")]
    StateConflict { key: String },

    /// The step dependency table is inconsistent with the execution order.
    #[error("invalid pipeline plan: {message}")]
    InvalidPlan { message: String },

    /// Run-level failure wrapping the error of the step that aborted the run.
    #[error("step `{step}` failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: Box<PageforgeError>,
    },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON encoding/decoding error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PageforgeError>;

impl PageforgeError {
    /// Create a malformed-input error for `field`.
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing-dependency error; `consumer` is a page type or step name.
    pub fn missing(consumer: impl Into<String>, key: impl Into<String>) -> Self {
        Self::MissingDependency {
            consumer: consumer.into(),
            key: key.into(),
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a plan validation error from any displayable message.
    pub fn plan(msg: impl Into<String>) -> Self {
        Self::InvalidPlan {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap this error as the failure of pipeline step `step`.
    pub fn in_step(self, step: &'static str) -> Self {
        Self::Step {
            step,
            source: Box::new(self),
        }
    }

    /// The underlying contract violation, with any step wrappers removed.
    pub fn root_cause(&self) -> &PageforgeError {
        match self {
            Self::Step { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Name of the failed step, if this is a run-level failure.
    pub fn failed_step(&self) -> Option<&'static str> {
        match self {
            Self::Step { step, .. } => Some(*step),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PageforgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
