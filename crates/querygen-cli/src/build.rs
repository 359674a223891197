//! Build command: run the build tool for a previously generated artifact.

use querygen_core::{ArtifactName, BuildInvoker};

use crate::colors::{paint, Tone};
use crate::settings::Settings;

pub fn execute(settings: &Settings, name: &str) -> anyhow::Result<()> {
    let name = ArtifactName::from(name);
    let dirs = settings.dirs();

    let source = dirs.source_path(name.as_str());
    if !source.exists() {
        tracing::warn!(
            "No generated source at {}; building '{}' anyway",
            source.display(),
            name
        );
    }

    let builder = BuildInvoker::from_config(&dirs, &settings.config.build)?;
    let elapsed = builder.compile(&name)?;

    if settings.json {
        println!(
            "{}",
            serde_json::json!({ "name": name, "elapsed_ms": elapsed.as_millis() as u64 })
        );
    } else {
        println!(
            "{} {} in {:.2}s",
            paint(Tone::Success, "Built"),
            name,
            elapsed.as_secs_f64()
        );
    }

    Ok(())
}
