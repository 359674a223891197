//! Terminal progress output for pipeline runs.

use std::time::Duration;

use querygen_core::{ArtifactName, Error, PipelineCallback, Stage};

use crate::colors::{self, paint, Tone};

/// Prints one line per pipeline stage.
#[derive(Default)]
pub struct ProgressCallback;

impl PipelineCallback for ProgressCallback {
    fn on_stage_started(&self, name: &ArtifactName, stage: Stage) {
        let verb = match stage {
            Stage::Generating => "Generating",
            Stage::Building => "Building",
            Stage::Executing => "Executing",
            _ => return,
        };
        print!(
            "  {} {}... ",
            paint(Tone::Stage, format!("▶ {}", verb)),
            paint(Tone::Strong, name)
        );
        colors::flush_stdout();
    }

    fn on_stage_completed(&self, _name: &ArtifactName, _stage: Stage, elapsed: Duration) {
        println!(
            "{} {}",
            paint(Tone::Success, "✓"),
            paint(Tone::Muted, format!("{:.2}s", elapsed.as_secs_f64()))
        );
    }

    fn on_stage_failed(&self, _name: &ArtifactName, _stage: Stage, _error: &Error) {
        // The error itself is reported once by main.
        println!("{}", paint(Tone::Failure, "✗"));
    }
}
