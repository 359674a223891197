//! Source producers backed by files or stdin.

use std::fs;
use std::io::{self, Read};

use anyhow::Context;
use querygen_core::bridge_source;

/// Producer that reads `path` (`-` for stdin) when invoked, optionally
/// followed by the default bridge for `bridge_name`.
pub fn producer(
    path: String,
    bridge_name: Option<String>,
) -> impl FnOnce() -> anyhow::Result<String> {
    move || {
        let mut text = if path == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read source from stdin")?;
            buf
        } else {
            fs::read_to_string(&path).with_context(|| format!("Failed to read source {}", path))?
        };

        if let Some(name) = bridge_name {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&bridge_source(&name));
        }

        Ok(text)
    }
}
