//! Fixture files for the in-memory wiki.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{WikiError, WikiResult};
use crate::model::{Document, DocumentZone, Revision, User};

/// Supported fixture formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixtureFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl FixtureFormat {
    /// Detects the format from a file path based on extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Detects the format from a file extension string.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "yml" | "yaml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl std::fmt::Display for FixtureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yaml => write!(f, "YAML"),
            Self::Json => write!(f, "JSON"),
        }
    }
}

/// The full contents of a wiki, as stored in a fixture file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiData {
    pub documents: Vec<Document>,
    pub zones: Vec<DocumentZone>,
    pub revisions: Vec<Revision>,
    pub users: Vec<User>,
}

impl WikiData {
    /// Parses fixture content in the given format.
    pub fn parse(content: &str, format: FixtureFormat) -> Result<Self, String> {
        match format {
            FixtureFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            FixtureFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    /// Loads a fixture file. The format follows the file extension.
    pub fn load(path: impl AsRef<Path>) -> WikiResult<Self> {
        let path = path.as_ref();
        let format = FixtureFormat::from_path(path)
            .ok_or_else(|| WikiError::fixture(path, "unsupported file extension"))?;
        let content = std::fs::read_to_string(path)?;

        Self::parse(&content, format).map_err(|reason| WikiError::fixture(path, reason))
    }
}
