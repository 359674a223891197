//! Repository root and configuration resolution shared by all commands.

use std::path::{Path, PathBuf};

use anyhow::Context;
use querygen_core::{EngineDirs, PipelineConfig};

/// Resolved settings for one CLI invocation.
pub struct Settings {
    pub repo_root: PathBuf,
    pub config: PipelineConfig,
    /// Print machine-readable JSON instead of progress lines.
    pub json: bool,
}

impl Settings {
    /// Resolve the repository root and load configuration.
    ///
    /// An explicit `config_path` must exist; otherwise `querygen.toml` in the
    /// repository root is used when present.
    pub fn load(
        root: Option<&Path>,
        config_path: Option<&Path>,
        no_format: bool,
        json: bool,
    ) -> anyhow::Result<Self> {
        let repo_root = match root {
            Some(root) => root.to_path_buf(),
            None => std::env::current_dir().context("Failed to determine current directory")?,
        };

        let mut config = match config_path {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::discover(&repo_root)?,
        };

        if no_format {
            config.format.enabled = false;
        }

        Ok(Self {
            repo_root,
            config,
            json,
        })
    }

    pub fn dirs(&self) -> EngineDirs {
        EngineDirs::with_config(&self.repo_root, &self.config.paths)
    }
}
