//! Interpreter and environment validation settings.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_interpreter() -> String {
    "python3".to_string()
}

fn default_min_version() -> String {
    "3.8.0".to_string()
}

fn default_required_paths() -> Vec<String> {
    ["main.py", "requirements.txt", "static/index.html"]
        .iter()
        .map(|path| (*path).to_string())
        .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuntimeConfig {
    /// Interpreter executable used for version checks, pip and probes.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,

    /// Minimum accepted interpreter version (semver, e.g. `3.8.0`).
    #[serde(default = "default_min_version")]
    pub min_version: String,

    /// Paths, relative to the project root, that must exist before setup starts.
    #[serde(default = "default_required_paths")]
    pub required_paths: Vec<String>,
}

impl RuntimeConfig {
    /// Parse [`Self::min_version`].
    pub fn min_version(&self) -> Result<semver::Version, ConfigError> {
        semver::Version::parse(self.min_version.trim()).map_err(|error| {
            ConfigError::InvalidValue {
                field: "runtime.min_version".to_string(),
                reason: error.to_string(),
            }
        })
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            min_version: default_min_version(),
            required_paths: default_required_paths(),
        }
    }
}
