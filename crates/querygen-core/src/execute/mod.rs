//! Execution of compiled artifacts.
//!
//! The pipeline only needs something that takes an artifact name and loads
//! and runs it; [`Executor`] is that seam. [`DylibExecutor`] is the real
//! implementation, loading the shared library through the module table the
//! bridge template exports.

mod dylib;

pub use dylib::{DylibExecutor, ExecutionReport};

use crate::artifact::ArtifactName;
use crate::error::Result;

/// Loads a compiled artifact by name and runs it.
pub trait Executor {
    /// Load and run `name`. Errors are passed through the pipeline unchanged.
    fn execute(&mut self, name: &ArtifactName) -> Result<()>;
}

impl<F> Executor for F
where
    F: FnMut(&ArtifactName) -> Result<()>,
{
    fn execute(&mut self, name: &ArtifactName) -> Result<()> {
        self(name)
    }
}
