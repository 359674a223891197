//! Generate command: write and format the source without building it.

use querygen_core::{ArtifactName, SourceGenerator};

use crate::settings::Settings;
use crate::source;

pub fn execute(settings: &Settings, name: &str, source_path: &str, bridge: bool) -> anyhow::Result<()> {
    let name = ArtifactName::from(name);
    let generator = SourceGenerator::from_config(settings.dirs(), &settings.config)?;

    let producer = source::producer(
        source_path.to_string(),
        bridge.then(|| name.to_string()),
    );
    let path = generator.generate(producer, &name)?;

    if settings.json {
        println!(
            "{}",
            serde_json::json!({ "name": name, "source_path": path })
        );
    } else {
        println!("Generated {}", path.display());
    }

    Ok(())
}
