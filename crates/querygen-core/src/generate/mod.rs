//! Source generation.
//!
//! Asks a producer for native source, writes it to
//! `<generated_dir>/<name>.cpp` and formats it in place.

mod formatter;

pub use formatter::Formatter;

use std::error::Error as StdError;
use std::fs;
use std::path::PathBuf;

use crate::artifact::ArtifactName;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::paths::EngineDirs;

/// Writes producer output into the engine's generated-source directory.
#[derive(Debug, Clone)]
pub struct SourceGenerator {
    dirs: EngineDirs,
    formatter: Option<Formatter>,
}

impl SourceGenerator {
    /// Create a generator. Without a formatter the text is written as-is.
    pub fn new(dirs: EngineDirs, formatter: Option<Formatter>) -> Self {
        Self { dirs, formatter }
    }

    /// Create a generator from configuration, resolving the formatter.
    pub fn from_config(dirs: EngineDirs, config: &PipelineConfig) -> Result<Self> {
        Ok(Self::new(dirs, Formatter::from_config(&config.format)?))
    }

    pub fn dirs(&self) -> &EngineDirs {
        &self.dirs
    }

    /// Produce, persist and format the source for `name`.
    ///
    /// The producer is called exactly once. Any existing file is truncated.
    /// Returns the path of the written file.
    pub fn generate<F, E>(&self, producer: F, name: &ArtifactName) -> Result<PathBuf>
    where
        F: FnOnce() -> std::result::Result<String, E>,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let generation_error = |message: String| Error::Generation {
            name: name.to_string(),
            message,
        };

        let source = producer().map_err(|e| {
            let err: Box<dyn StdError + Send + Sync> = e.into();
            generation_error(error_chain(&*err))
        })?;

        fs::create_dir_all(&self.dirs.generated_dir).map_err(|e| {
            generation_error(format!(
                "cannot create {}: {}",
                self.dirs.generated_dir.display(),
                e
            ))
        })?;

        let path = self.dirs.source_path(name.as_str());
        fs::write(&path, source)
            .map_err(|e| generation_error(format!("cannot write {}: {}", path.display(), e)))?;

        tracing::info!("Generated {}", path.display());

        if let Some(formatter) = &self.formatter {
            formatter.format_in_place(&path)?;
            tracing::debug!("Formatted {} with {}", path.display(), formatter.program().display());
        }

        Ok(path)
    }
}

/// `outer: cause: root cause`, so wrapped io errors keep their reason.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tempfile::TempDir;

    fn text(s: &str) -> impl FnOnce() -> std::result::Result<String, Infallible> + '_ {
        move || Ok(s.to_string())
    }

    #[test]
    fn test_creates_output_dir() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let dirs = EngineDirs::from_repo_root(temp.path());
        assert!(!dirs.generated_dir.exists());

        let generator = SourceGenerator::new(dirs.clone(), None);
        let path = generator
            .generate(text("int main(){return 0;}"), &"t1".into())
            .unwrap();

        assert_eq!(path, dirs.generated_dir.join("t1.cpp"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "int main(){return 0;}");
    }

    #[test]
    fn test_existing_dir_is_fine() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let dirs = EngineDirs::from_repo_root(temp.path());
        fs::create_dir_all(&dirs.generated_dir).unwrap();

        let generator = SourceGenerator::new(dirs, None);
        assert!(generator.generate(text("int x;"), &"t1".into()).is_ok());
    }

    #[test]
    fn test_second_call_overwrites() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let generator = SourceGenerator::new(EngineDirs::from_repo_root(temp.path()), None);
        let name = ArtifactName::from("t1");

        generator
            .generate(text("int first_version_is_longer;"), &name)
            .unwrap();
        let path = generator.generate(text("int second;"), &name).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "int second;");
    }

    #[test]
    fn test_producer_called_once() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let generator = SourceGenerator::new(EngineDirs::from_repo_root(temp.path()), None);

        let mut calls = 0;
        generator
            .generate(
                || {
                    calls += 1;
                    Ok::<_, Infallible>(String::new())
                },
                &"t1".into(),
            )
            .unwrap();
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_producer_error() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let dirs = EngineDirs::from_repo_root(temp.path());
        let generator = SourceGenerator::new(dirs.clone(), None);

        let err = generator
            .generate(|| Err("no plan for query"), &"t1".into())
            .unwrap_err();

        match err {
            Error::Generation { name, message } => {
                assert_eq!(name, "t1");
                assert_eq!(message, "no plan for query");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dirs.source_path("t1").exists());
    }

    #[derive(Debug, thiserror::Error)]
    #[error("failed to read source query.cpp")]
    struct ReadSource(#[source] std::io::Error);

    #[test]
    fn test_producer_error_keeps_cause() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let generator = SourceGenerator::new(EngineDirs::from_repo_root(temp.path()), None);

        let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = generator
            .generate(|| Err::<String, _>(ReadSource(cause)), &"t1".into())
            .unwrap_err();

        match err {
            Error::Generation { message, .. } => {
                assert_eq!(message, "failed to read source query.cpp: no such file");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unwritable_output_dir() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let dirs = EngineDirs::from_repo_root(temp.path());
        // A file where the engine directory should be.
        fs::write(&dirs.engine_dir, "").unwrap();

        let generator = SourceGenerator::new(dirs, None);
        let err = generator.generate(text("int x;"), &"t1".into()).unwrap_err();
        assert!(matches!(err, Error::Generation { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_formatter_failure_leaves_file() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let dirs = EngineDirs::from_repo_root(temp.path());
        let generator = SourceGenerator::new(dirs.clone(), Some(Formatter::new("false", "llvm")));

        let err = generator.generate(text("int x;"), &"t1".into()).unwrap_err();
        assert!(matches!(err, Error::Format { code: Some(1), .. }));
        assert!(dirs.source_path("t1").exists());
    }
}
