//! Generate → build → execute.
//!
//! ```text
//! producer ──► SourceGenerator ──► <name>.cpp (formatted)
//!                                      │
//!                                      ▼
//!                                BuildInvoker ──► compiled artifact
//!                                      │
//!                                      ▼
//!                                  Executor(name)
//! ```
//!
//! Stages run strictly in order. The first failure stops the run and is
//! returned as-is; files already written or built stay on disk so a retry
//! can reuse them.

mod context;

pub use context::{PipelineCallback, PipelineReport, Stage, StageTiming};

use std::error::Error as StdError;
use std::path::Path;
use std::time::Instant;

use crate::artifact::ArtifactName;
use crate::build::BuildInvoker;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::execute::Executor;
use crate::generate::SourceGenerator;
use crate::paths::EngineDirs;

/// Drives one artifact through generation, build and execution.
pub struct Pipeline<X> {
    generator: SourceGenerator,
    builder: BuildInvoker,
    executor: X,
    callback: Option<Box<dyn PipelineCallback>>,
    state: Stage,
}

impl<X: Executor> Pipeline<X> {
    pub fn new(generator: SourceGenerator, builder: BuildInvoker, executor: X) -> Self {
        Self {
            generator,
            builder,
            executor,
            callback: None,
            state: Stage::Start,
        }
    }

    /// Assemble a pipeline for the engine under `repo_root`.
    ///
    /// Resolves the formatter and build tool up front, so a missing tool
    /// fails here rather than halfway through a run.
    pub fn from_config(repo_root: impl AsRef<Path>, config: &PipelineConfig, executor: X) -> Result<Self> {
        let dirs = EngineDirs::with_config(repo_root, &config.paths);
        let builder = BuildInvoker::from_config(&dirs, &config.build)?;
        let generator = SourceGenerator::from_config(dirs, config)?;
        Ok(Self::new(generator, builder, executor))
    }

    /// Set the callback for progress reporting.
    pub fn set_callback(&mut self, callback: impl PipelineCallback + 'static) {
        self.callback = Some(Box::new(callback));
    }

    /// Stage reached by the most recent run.
    pub fn state(&self) -> Stage {
        self.state
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    pub fn generator(&self) -> &SourceGenerator {
        &self.generator
    }

    pub fn builder(&self) -> &BuildInvoker {
        &self.builder
    }

    /// Generate the source for `name`, build it, and hand it to the executor.
    ///
    /// The executor is invoked exactly once, and only if generation and
    /// build both succeeded.
    pub fn compile_and_run<F, E>(&mut self, producer: F, name: &ArtifactName) -> Result<PipelineReport>
    where
        F: FnOnce() -> std::result::Result<String, E>,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        if !name.is_identifier() {
            tracing::warn!(
                "Artifact name '{}' is not a plain identifier; downstream tools may reject it",
                name
            );
        }

        self.state = Stage::Start;
        let mut stages = Vec::with_capacity(3);

        let start = self.enter(name, Stage::Generating);
        let source_path = self
            .generator
            .generate(producer, name)
            .map_err(|e| self.fail(name, e))?;
        stages.push(self.complete(name, start));

        let start = self.enter(name, Stage::Building);
        self.builder.compile(name).map_err(|e| self.fail(name, e))?;
        stages.push(self.complete(name, start));

        let start = self.enter(name, Stage::Executing);
        self.executor.execute(name).map_err(|e| self.fail(name, e))?;
        stages.push(self.complete(name, start));

        self.state = Stage::Done;

        Ok(PipelineReport {
            name: name.clone(),
            source_path,
            stages,
        })
    }

    fn enter(&mut self, name: &ArtifactName, stage: Stage) -> Instant {
        self.state = stage;
        tracing::debug!("{}: {}", name, stage);
        if let Some(ref callback) = self.callback {
            callback.on_stage_started(name, stage);
        }
        Instant::now()
    }

    fn complete(&self, name: &ArtifactName, start: Instant) -> StageTiming {
        let timing = StageTiming {
            stage: self.state,
            elapsed: start.elapsed(),
        };
        if let Some(ref callback) = self.callback {
            callback.on_stage_completed(name, timing.stage, timing.elapsed);
        }
        timing
    }

    fn fail(&mut self, name: &ArtifactName, error: Error) -> Error {
        let stage = self.state;
        self.state = Stage::Failed;
        tracing::warn!("{}: {} stage failed: {}", name, stage, error);
        if let Some(ref callback) = self.callback {
            callback.on_stage_failed(name, stage, &error);
        }
        error
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::convert::Infallible;
    use std::fs;
    use std::rc::Rc;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl PipelineCallback for Recorder {
        fn on_stage_started(&self, _name: &ArtifactName, stage: Stage) {
            self.events.borrow_mut().push(format!("start {}", stage));
        }

        fn on_stage_completed(&self, _name: &ArtifactName, stage: Stage, _elapsed: Duration) {
            self.events.borrow_mut().push(format!("done {}", stage));
        }

        fn on_stage_failed(&self, _name: &ArtifactName, stage: Stage, _error: &Error) {
            self.events.borrow_mut().push(format!("failed {}", stage));
        }
    }

    fn pipeline(
        temp: &TempDir,
        build_tool: &str,
        calls: Rc<RefCell<Vec<String>>>,
    ) -> Pipeline<impl Executor> {
        let dirs = EngineDirs::from_repo_root(temp.path());
        fs::create_dir_all(&dirs.engine_dir).unwrap();

        let executor = move |name: &ArtifactName| -> Result<()> {
            calls.borrow_mut().push(name.to_string());
            Ok(())
        };

        Pipeline::new(
            SourceGenerator::new(dirs.clone(), None),
            BuildInvoker::new(&dirs.engine_dir, build_tool),
            executor,
        )
    }

    #[test]
    fn test_stages_in_order() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let calls = Rc::new(RefCell::new(Vec::new()));
        let recorder = Recorder::default();

        let mut pipeline = pipeline(&temp, "true", calls.clone());
        pipeline.set_callback(recorder.clone());

        let report = pipeline
            .compile_and_run(|| Ok::<_, Infallible>("int x;".to_string()), &"t1".into())
            .unwrap();

        assert_eq!(pipeline.state(), Stage::Done);
        assert_eq!(*calls.borrow(), vec!["t1".to_string()]);
        assert_eq!(
            *recorder.events.borrow(),
            vec![
                "start generating",
                "done generating",
                "start building",
                "done building",
                "start executing",
                "done executing",
            ]
        );
        let stages: Vec<Stage> = report.stages.iter().map(|t| t.stage).collect();
        assert_eq!(stages, vec![Stage::Generating, Stage::Building, Stage::Executing]);
        assert!(report.source_path.ends_with("generated/t1.cpp"));
    }

    #[test]
    fn test_build_failure_stops_before_execution() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let calls = Rc::new(RefCell::new(Vec::new()));
        let recorder = Recorder::default();

        let mut pipeline = pipeline(&temp, "false", calls.clone());
        pipeline.set_callback(recorder.clone());

        let err = pipeline
            .compile_and_run(|| Ok::<_, Infallible>("int x;".to_string()), &"t1".into())
            .unwrap_err();

        assert!(matches!(err, Error::Build { ref name, code: Some(1) } if name == "t1"));
        assert_eq!(pipeline.state(), Stage::Failed);
        assert!(calls.borrow().is_empty());
        assert_eq!(recorder.events.borrow().last().unwrap(), "failed building");
        // The generated source is kept for the next attempt.
        assert!(pipeline.generator().dirs().source_path("t1").exists());
    }

    #[test]
    fn test_executor_error_passed_through() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let dirs = EngineDirs::from_repo_root(temp.path());
        fs::create_dir_all(&dirs.engine_dir).unwrap();

        let mut pipeline = Pipeline::new(
            SourceGenerator::new(dirs.clone(), None),
            BuildInvoker::new(&dirs.engine_dir, "true"),
            |_: &ArtifactName| -> Result<()> { Err(Error::Execution("segfault in run".to_string())) },
        );

        let err = pipeline
            .compile_and_run(|| Ok::<_, Infallible>(String::new()), &"t1".into())
            .unwrap_err();
        assert!(matches!(err, Error::Execution(ref msg) if msg == "segfault in run"));
        assert_eq!(pipeline.state(), Stage::Failed);
    }
}
