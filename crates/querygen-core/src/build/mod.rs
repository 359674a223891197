//! Build invocation.
//!
//! Runs the engine's build tool with the artifact name as target. The build
//! root is handed to the child process as its working directory; the host
//! process never changes its own.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::artifact::ArtifactName;
use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::paths::EngineDirs;
use crate::process::{self, ToolOutcome};
use crate::toolchain;

/// Invokes `<program> [args..] <name>` from the engine build root.
#[derive(Debug, Clone)]
pub struct BuildInvoker {
    build_root: PathBuf,
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl BuildInvoker {
    pub fn new(build_root: impl Into<PathBuf>, program: impl Into<PathBuf>) -> Self {
        Self {
            build_root: build_root.into(),
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Build from configuration, resolving the build tool on `PATH`.
    pub fn from_config(dirs: &EngineDirs, config: &BuildConfig) -> Result<Self> {
        let program = toolchain::find_tool(&config.program)?;
        if let Some(version) = toolchain::tool_version(&program) {
            tracing::debug!("Using build tool {}", version);
        }

        Ok(Self {
            build_root: dirs.engine_dir.clone(),
            program,
            args: config.args.clone(),
            timeout: config.timeout(),
        })
    }

    /// Arguments placed before the target name.
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    /// Build target `name`.
    ///
    /// Standard output of the tool is discarded; standard error is passed
    /// through. Returns how long the build took.
    ///
    /// # Errors
    ///
    /// - [`Error::Build`] if the tool exits non-zero or is killed by a signal
    /// - [`Error::BuildTimeout`] if the configured timeout expires
    /// - [`Error::ToolNotFound`] if the tool cannot be started
    pub fn compile(&self, name: &ArtifactName) -> Result<Duration> {
        if !self.build_root.is_dir() {
            return Err(Error::Config(format!(
                "build root {} is not a directory",
                self.build_root.display()
            )));
        }

        tracing::info!("Building {} in {}", name, self.build_root.display());

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(name.as_str())
            .current_dir(&self.build_root)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());

        let outcome = process::run(&mut cmd, self.timeout).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::ToolNotFound {
                tool: self.program.display().to_string(),
            },
            _ => Error::Io(e),
        })?;

        match outcome {
            ToolOutcome::Exited { status, elapsed } if status.success() => {
                tracing::info!("Built {} in {:.2}s", name, elapsed.as_secs_f64());
                Ok(elapsed)
            }
            ToolOutcome::Exited { status, .. } => Err(Error::Build {
                name: name.to_string(),
                code: status.code(),
            }),
            ToolOutcome::TimedOut { elapsed } => Err(Error::BuildTimeout {
                name: name.to_string(),
                timeout: self.timeout.unwrap_or(elapsed),
            }),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    /// A build tool made of an inline shell script; the target name and any
    /// extra arguments arrive as `$@`.
    fn fake_make(temp: &TempDir, script: &str) -> BuildInvoker {
        BuildInvoker::new(temp.path(), "sh").with_args(["-c", script, "fake-make"])
    }

    #[test]
    fn test_target_and_working_dir() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let mut make = fake_make(&temp, "pwd > invoked.txt; echo \"$@\" >> invoked.txt");
        make.args.push("-j2".to_string());

        make.compile(&"t1".into()).unwrap();

        let log = fs::read_to_string(temp.path().join("invoked.txt")).unwrap();
        let mut lines = log.lines();
        let cwd = PathBuf::from(lines.next().unwrap());
        assert_eq!(
            cwd.canonicalize().unwrap(),
            temp.path().canonicalize().unwrap()
        );
        assert_eq!(lines.next(), Some("-j2 t1"));
    }

    #[test]
    fn test_failure_reports_name_and_status() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let err = fake_make(&temp, "exit 2")
            .compile(&"t1".into())
            .unwrap_err();

        match err {
            Error::Build { name, code } => {
                assert_eq!(name, "t1");
                assert_eq!(code, Some(2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_working_dir_unchanged() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let before = env::current_dir().unwrap();

        BuildInvoker::new(temp.path(), "true")
            .compile(&"t1".into())
            .unwrap();
        assert_eq!(env::current_dir().unwrap(), before);

        BuildInvoker::new(temp.path(), "false")
            .compile(&"t1".into())
            .unwrap_err();
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_timeout() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let timeout = Duration::from_millis(100);

        // `sleep 5`: the target name doubles as the duration.
        let err = BuildInvoker::new(temp.path(), "sleep")
            .with_timeout(Some(timeout))
            .compile(&"5".into())
            .unwrap_err();

        match err {
            Error::BuildTimeout { name, timeout: t } => {
                assert_eq!(name, "5");
                assert_eq!(t, timeout);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_timeout_stops_spawned_compilers() {
        let temp = TempDir::new().expect("Failed to create temp dir");

        // The nested shell stands in for a compiler forked by make.
        let err = fake_make(&temp, "sh -c \"sleep 1; touch late-$1\" cc \"$1\"; true")
            .with_timeout(Some(Duration::from_millis(200)))
            .compile(&"t1".into())
            .unwrap_err();
        assert!(matches!(err, Error::BuildTimeout { .. }));

        std::thread::sleep(Duration::from_millis(1500));
        assert!(!temp.path().join("late-t1").exists());
    }

    #[test]
    fn test_missing_build_root() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let err = BuildInvoker::new(temp.path().join("storage_engine"), "true")
            .compile(&"t1".into())
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_tool() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let err = BuildInvoker::new(temp.path(), "querygen-no-such-tool")
            .compile(&"t1".into())
            .unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }
}
