//! External tool discovery.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Resolve `program` on `PATH` (or check it directly if it is a path).
pub fn find_tool(program: &str) -> Result<PathBuf> {
    which::which(program).map_err(|_| Error::ToolNotFound {
        tool: program.to_string(),
    })
}

/// First line of `<tool> --version`, for diagnostics only.
pub fn tool_version(path: &Path) -> Option<String> {
    let output = Command::new(path)
        .arg("--version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
}
