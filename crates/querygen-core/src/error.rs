//! Error types for querygen-core.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for querygen-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating, building or running an artifact.
#[derive(Debug, Error)]
pub enum Error {
    /// The source producer failed or its output could not be persisted.
    #[error("generation failed for '{name}': {message}")]
    Generation { name: String, message: String },

    /// The formatter exited unsuccessfully.
    #[error("formatting {} failed{}", path.display(), status_suffix(*code))]
    Format { path: PathBuf, code: Option<i32> },

    /// The formatter did not finish in time and was killed.
    #[error("formatting {} timed out after {}s", path.display(), timeout.as_secs_f64())]
    FormatTimeout { path: PathBuf, timeout: Duration },

    /// The build tool exited unsuccessfully.
    #[error("build of '{name}' failed{}", status_suffix(*code))]
    Build { name: String, code: Option<i32> },

    /// The build tool did not finish in time and was killed.
    #[error("build of '{name}' timed out after {}s", timeout.as_secs_f64())]
    BuildTimeout { name: String, timeout: Duration },

    /// An external tool could not be found or started.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// Failed to load dynamic library.
    #[error("failed to load library: {0}")]
    LibraryLoad(#[from] libloading::Error),

    /// The compiled artifact was loaded but could not be run.
    #[error("execution error: {0}")]
    Execution(String),

    /// Invalid configuration file or value.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn status_suffix(code: Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit status {}", code),
        None => " (terminated by signal)".to_string(),
    }
}

impl Error {
    /// Exit status reported by the failing tool, if any.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Format { code, .. } | Self::Build { code, .. } => *code,
            _ => None,
        }
    }

    /// Format the error together with a recovery hint, when one applies.
    pub fn with_hint(&self) -> String {
        let hint = match self {
            Self::Generation { .. } => Some("check the source producer and that the output directory is writable"),
            Self::Format { .. } => Some("run the formatter by hand on the generated file, or set `format.enabled = false`"),
            Self::Build { .. } => Some("inspect the build tool's stderr above; the generated source is left in place"),
            Self::FormatTimeout { .. } => Some("raise `format.timeout_secs` in querygen.toml"),
            Self::BuildTimeout { .. } => Some("raise `build.timeout_secs` in querygen.toml"),
            Self::ToolNotFound { .. } => Some("install the tool or point querygen.toml at it"),
            Self::LibraryLoad(_) => Some("make sure the build target produces a shared library in `paths.artifact_dir`"),
            Self::Config(_) => Some("see querygen.toml"),
            Self::Execution(_) | Self::Io(_) => None,
        };

        match hint {
            Some(hint) => format!("{}\n  hint: {}", self, hint),
            None => self.to_string(),
        }
    }
}
