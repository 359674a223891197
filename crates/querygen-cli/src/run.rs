//! Run command: generate, build and execute an artifact.

use querygen_core::{ArtifactName, DylibExecutor, Pipeline};

use crate::colors::{paint, Tone};
use crate::progress::ProgressCallback;
use crate::settings::Settings;
use crate::source;

pub fn execute(settings: &Settings, name: &str, source_path: &str, bridge: bool) -> anyhow::Result<()> {
    let name = ArtifactName::from(name);
    let dirs = settings.dirs();

    let executor = DylibExecutor::new(dirs, settings.config.execute.clone());
    let mut pipeline = Pipeline::from_config(&settings.repo_root, &settings.config, executor)?;

    if !settings.json {
        println!("{} {}", paint(Tone::Strong, "Running"), name);
        pipeline.set_callback(ProgressCallback);
    }

    let producer = source::producer(
        source_path.to_string(),
        bridge.then(|| name.to_string()),
    );
    let report = pipeline.compile_and_run(producer, &name)?;
    let execution = pipeline.executor().last_report();

    if settings.json {
        let mut value = serde_json::to_value(&report)?;
        value["result"] = serde_json::to_value(execution)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "─".repeat(50));
    if let Some(execution) = execution {
        println!(
            "{} {}   {} {}",
            paint(Tone::Strong, "rows:"),
            execution.rows,
            paint(Tone::Strong, "fetch:"),
            execution.fetched
        );
    }
    println!(
        "{} {} in {:.2}s",
        paint(Tone::Success, "Completed"),
        name,
        report.total().as_secs_f64()
    );

    Ok(())
}
