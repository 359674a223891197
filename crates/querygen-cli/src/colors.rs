//! Styled terminal output. Plain text when stdout is not a terminal or
//! `NO_COLOR` is set.

use std::env;
use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::sync::OnceLock;

/// What a piece of output means; each maps to one ANSI style.
#[derive(Debug, Clone, Copy)]
pub enum Tone {
    /// Stage verbs ("Generating", ...).
    Stage,
    /// Artifact names and labels.
    Strong,
    Success,
    Failure,
    /// Timings.
    Muted,
}

impl Tone {
    fn code(self) -> &'static str {
        match self {
            Tone::Stage => "\x1b[36m",
            Tone::Strong => "\x1b[1m",
            Tone::Success => "\x1b[32m",
            Tone::Failure => "\x1b[31m",
            Tone::Muted => "\x1b[2m",
        }
    }
}

fn enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal())
}

/// `text` wrapped in the escape codes for `tone`.
pub fn paint(tone: Tone, text: impl Display) -> String {
    if enabled() {
        format!("{}{}\x1b[0m", tone.code(), text)
    } else {
        text.to_string()
    }
}

/// Flush stdout so a progress line without newline shows up immediately.
pub fn flush_stdout() {
    io::stdout().flush().ok();
}
