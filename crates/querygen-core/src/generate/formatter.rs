//! In-place source formatting.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::config::FormatConfig;
use crate::error::{Error, Result};
use crate::process::{self, ToolOutcome};
use crate::toolchain;

/// Runs `<program> -style=<style> -i <file>`.
#[derive(Debug, Clone)]
pub struct Formatter {
    program: PathBuf,
    style: String,
    timeout: Option<Duration>,
}

impl Formatter {
    pub fn new(program: impl Into<PathBuf>, style: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            style: style.into(),
            timeout: None,
        }
    }

    /// Build from configuration, resolving the program on `PATH`.
    ///
    /// Returns `None` when formatting is disabled.
    pub fn from_config(config: &FormatConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }

        let program = toolchain::find_tool(&config.program)?;
        if let Some(version) = toolchain::tool_version(&program) {
            tracing::debug!("Using formatter {}", version);
        }

        Ok(Some(Self {
            program,
            style: config.style.clone(),
            timeout: config.timeout(),
        }))
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Format `path` in place.
    pub fn format_in_place(&self, path: &Path) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(format!("-style={}", self.style))
            .arg("-i")
            .arg(path)
            .stdin(Stdio::null());

        let outcome = process::run(&mut cmd, self.timeout).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::ToolNotFound {
                tool: self.program.display().to_string(),
            },
            _ => Error::Io(e),
        })?;

        self.check(path, outcome)
    }

    fn check(&self, path: &Path, outcome: ToolOutcome) -> Result<()> {
        match outcome {
            ToolOutcome::Exited { status, .. } if status.success() => Ok(()),
            ToolOutcome::Exited { status, .. } => Err(Error::Format {
                path: path.to_path_buf(),
                code: status.code(),
            }),
            ToolOutcome::TimedOut { elapsed } => Err(Error::FormatTimeout {
                path: path.to_path_buf(),
                timeout: self.timeout.unwrap_or(elapsed),
            }),
        }
    }
}
