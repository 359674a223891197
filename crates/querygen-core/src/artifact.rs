//! Artifact names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier shared by the generated file, the build target and the
/// loadable module.
///
/// Names are not validated: an unsuitable name surfaces as a failure of
/// whichever external tool chokes on it first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactName(String);

impl ArtifactName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the name is a plain C identifier, which is safe as a file
    /// name, a make target and a symbol suffix alike.
    pub fn is_identifier(&self) -> bool {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
            _ => return false,
        }
        chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArtifactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ArtifactName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ArtifactName {
    fn from(name: String) -> Self {
        Self(name)
    }
}
