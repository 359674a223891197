//! Pipeline stages, progress callbacks and run reports.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::artifact::ArtifactName;
use crate::error::Error;

/// Where a pipeline run is.
///
/// `Start → Generating → Building → Executing → Done`; a failing stage moves
/// to `Failed` and nothing after it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    Generating,
    Building,
    Executing,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Generating => "generating",
            Self::Building => "building",
            Self::Executing => "executing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Callback trait for pipeline progress reporting.
pub trait PipelineCallback {
    /// Called when a stage starts.
    fn on_stage_started(&self, name: &ArtifactName, stage: Stage);

    /// Called when a stage completes successfully.
    fn on_stage_completed(&self, _name: &ArtifactName, _stage: Stage, _elapsed: Duration) {}

    /// Called when a stage fails; the pipeline stops afterwards.
    fn on_stage_failed(&self, name: &ArtifactName, stage: Stage, error: &Error);
}

/// Time spent in one completed stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageTiming {
    pub stage: Stage,
    #[serde(rename = "elapsed_ms")]
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Summary of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub name: ArtifactName,
    pub source_path: PathBuf,
    pub stages: Vec<StageTiming>,
}

impl PipelineReport {
    pub fn total(&self) -> Duration {
        self.stages.iter().map(|t| t.elapsed).sum()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_json() {
        let report = PipelineReport {
            name: "t1".into(),
            source_path: PathBuf::from("storage_engine/generated/t1.cpp"),
            stages: vec![
                StageTiming {
                    stage: Stage::Generating,
                    elapsed: Duration::from_millis(5),
                },
                StageTiming {
                    stage: Stage::Building,
                    elapsed: Duration::from_millis(1200),
                },
            ],
        };

        assert_eq!(report.total(), Duration::from_millis(1205));

        let value: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(value["name"], "t1");
        assert_eq!(value["stages"][1]["stage"], "building");
        assert_eq!(value["stages"][1]["elapsed_ms"], 1200);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Executing.to_string(), "executing");
    }
}
