//! Pipeline configuration, optionally loaded from `querygen.toml`.
//!
//! Every section and key is optional; anything left out falls back to the
//! defaults below, which match the stock storage engine checkout.
//!
//! ```toml
//! [paths]
//! engine_dir = "storage_engine"
//! generated_dir = "generated"
//! artifact_dir = "lib"
//!
//! [format]
//! enabled = true
//! program = "clang-format"
//! style = "llvm"
//!
//! [build]
//! program = "make"
//! args = ["-j4"]
//! timeout_secs = 600
//!
//! [execute]
//! init_symbol_prefix = "querygen_init_"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::paths::dylib_prefix;

/// File name looked up in the repository root.
pub const CONFIG_FILE_NAME: &str = "querygen.toml";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory layout.
    pub paths: PathsConfig,

    /// Formatter invocation.
    pub format: FormatConfig,

    /// Build tool invocation.
    pub build: BuildConfig,

    /// Artifact loading.
    pub execute: ExecuteConfig,
}

/// Locations relative to the repository root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Native build root, relative to the repository root.
    pub engine_dir: PathBuf,

    /// Generated source directory, relative to the build root.
    pub generated_dir: PathBuf,

    /// Where the build leaves shared libraries, relative to the build root.
    /// Defaults to the build root itself.
    pub artifact_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            engine_dir: PathBuf::from("storage_engine"),
            generated_dir: PathBuf::from("generated"),
            artifact_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    /// Skip formatting entirely when false.
    pub enabled: bool,

    pub program: String,

    /// Passed as `-style=<style>`.
    pub style: String,

    pub timeout_secs: Option<u64>,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "clang-format".to_string(),
            style: "llvm".to_string(),
            timeout_secs: None,
        }
    }
}

impl FormatConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub program: String,

    /// Extra arguments placed before the target name.
    pub args: Vec<String>,

    /// Kill the build after this many seconds. `None` waits forever.
    pub timeout_secs: Option<u64>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            program: "make".to_string(),
            args: Vec::new(),
            timeout_secs: Some(600),
        }
    }
}

impl BuildConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecuteConfig {
    /// File name prefix of built libraries (`lib` on Unix).
    pub library_prefix: String,

    /// Prefix of the module init symbol; the artifact name is appended.
    pub init_symbol_prefix: String,
}

impl Default for ExecuteConfig {
    fn default() -> Self {
        Self {
            library_prefix: dylib_prefix().to_string(),
            init_symbol_prefix: crate::template::INIT_SYMBOL_PREFIX.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        toml::from_str(&text).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load `querygen.toml` from the repository root, or use defaults if absent.
    pub fn discover(repo_root: impl AsRef<Path>) -> Result<Self> {
        let candidate = repo_root.as_ref().join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!("Loading configuration from {}", candidate.display());
            Self::load(candidate)
        } else {
            Ok(Self::default())
        }
    }
}
