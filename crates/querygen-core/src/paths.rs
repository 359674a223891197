//! Storage engine directory layout.
//!
//! Keeps the CLI, the generator and the build step agreeing on where
//! generated sources and compiled artifacts live.

use std::path::{Path, PathBuf};

use crate::config::PathsConfig;

/// Directory structure around the native storage engine.
///
/// ```text
/// <repo-root>/
/// └── storage_engine/      # build root, `make <name>` runs here
///     └── generated/       # <name>.cpp written by the generator
/// ```
///
/// Nothing is created on construction; the generator creates the output
/// directory on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineDirs {
    /// Repository root the other paths are resolved against.
    pub repo_root: PathBuf,

    /// Build root of the native engine.
    pub engine_dir: PathBuf,

    /// Output directory for generated sources.
    pub generated_dir: PathBuf,

    /// Directory the build tool leaves shared libraries in.
    pub artifact_dir: PathBuf,
}

impl EngineDirs {
    /// Resolve the layout with default relative locations.
    pub fn from_repo_root(repo_root: impl AsRef<Path>) -> Self {
        Self::with_config(repo_root, &PathsConfig::default())
    }

    /// Resolve the layout from configured relative (or absolute) locations.
    pub fn with_config(repo_root: impl AsRef<Path>, paths: &PathsConfig) -> Self {
        let repo_root = repo_root.as_ref().to_path_buf();
        let engine_dir = repo_root.join(&paths.engine_dir);
        let generated_dir = engine_dir.join(&paths.generated_dir);
        let artifact_dir = match &paths.artifact_dir {
            Some(dir) => engine_dir.join(dir),
            None => engine_dir.clone(),
        };

        Self {
            repo_root,
            engine_dir,
            generated_dir,
            artifact_dir,
        }
    }

    /// Path of the generated source for an artifact.
    pub fn source_path(&self, name: &str) -> PathBuf {
        self.generated_dir.join(format!("{}.cpp", name))
    }

    /// Path of the shared library the build produces for an artifact.
    pub fn library_path(&self, name: &str, prefix: &str) -> PathBuf {
        self.artifact_dir
            .join(format!("{}{}.{}", prefix, name, dylib_extension()))
    }
}

/// Platform-specific dynamic library extension.
pub fn dylib_extension() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        "dll"
    }
    #[cfg(target_os = "macos")]
    {
        "dylib"
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        "so"
    }
}

/// Platform-specific dynamic library prefix.
pub fn dylib_prefix() -> &'static str {
    #[cfg(target_os = "windows")]
    {
        ""
    }
    #[cfg(not(target_os = "windows"))]
    {
        "lib"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let dirs = EngineDirs::from_repo_root("/repo");

        assert_eq!(dirs.engine_dir, PathBuf::from("/repo/storage_engine"));
        assert_eq!(
            dirs.generated_dir,
            PathBuf::from("/repo/storage_engine/generated")
        );
        assert_eq!(dirs.artifact_dir, dirs.engine_dir);
        assert_eq!(
            dirs.source_path("t1"),
            PathBuf::from("/repo/storage_engine/generated/t1.cpp")
        );
    }

    #[test]
    fn test_configured_layout() {
        let paths = PathsConfig {
            engine_dir: PathBuf::from("native"),
            generated_dir: PathBuf::from("out/src"),
            artifact_dir: Some(PathBuf::from("lib")),
        };
        let dirs = EngineDirs::with_config("/repo", &paths);

        assert_eq!(dirs.generated_dir, PathBuf::from("/repo/native/out/src"));
        assert_eq!(dirs.artifact_dir, PathBuf::from("/repo/native/lib"));
    }

    #[test]
    fn test_library_path() {
        let dirs = EngineDirs::from_repo_root("/repo");
        let path = dirs.library_path("t1", "lib");
        let file = path.file_name().unwrap().to_string_lossy().into_owned();

        assert!(file.starts_with("libt1."));
        assert!(file.ends_with(dylib_extension()));
    }

    #[test]
    fn test_nothing_created() {
        let temp = tempfile::TempDir::new().expect("Failed to create temp dir");
        let dirs = EngineDirs::from_repo_root(temp.path());
        assert!(!dirs.engine_dir.exists());
    }
}
