//! # safedocs-config
//!
//! Layered configuration loading for SafeDocs setup using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SAFEDOCS_SETUP_*` prefix, `__` as separator)
//! 2. Project-level `<root>/safedocs-setup.toml`
//! 3. User-level `~/.config/safedocs-setup/config.toml`
//! 4. Built-in defaults
//!
//! The loaded [`SetupConfig`] is immutable: the CLI builds it once and every
//! stage receives it by reference. Stages never read the process environment.
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SAFEDOCS_SETUP_RUNTIME__INTERPRETER` -> `runtime.interpreter`,
//! `SAFEDOCS_SETUP_APP__PORT` -> `app.port`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use safedocs_config::SetupConfig;
//!
//! let config = SetupConfig::load(Path::new(".")).expect("config");
//! println!("interpreter: {}", config.runtime.interpreter);
//! ```

mod app;
mod dependencies;
mod enhancements;
mod error;
mod probe;
mod runtime;
mod snapshot;

pub use app::{AppSettings, LayoutConfig};
pub use dependencies::{DependencyConfig, OptionalPackage, PackagePin};
pub use enhancements::{EnhancementConfig, EnhancementDescriptor};
pub use error::ConfigError;
pub use probe::ProbeConfig;
pub use runtime::RuntimeConfig;
pub use snapshot::SnapshotConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the project-local configuration.
pub const PROJECT_CONFIG_FILE: &str = "safedocs-setup.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SAFEDOCS_SETUP_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SetupConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub dependencies: DependencyConfig,
    #[serde(default)]
    pub enhancements: EnhancementConfig,
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

impl SetupConfig {
    /// Load configuration for `project_root` from all sources and validate it.
    pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(project_root).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer extra providers on top.
    #[must_use]
    pub fn figment(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = project_root.join(PROJECT_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Path to the user-global config file.
    #[must_use]
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("safedocs-setup").join("config.toml"))
    }

    /// Reject values that deserialize but cannot drive a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.runtime.min_version()?;

        if self.probe.ready_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "probe.ready_threshold".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.snapshot.backup_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "snapshot.backup_dir".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        let backup_dir = Path::new(&self.snapshot.backup_dir);
        for entry in &self.snapshot.entries {
            let path = Path::new(entry);
            if entry.trim().is_empty()
                || entry == "."
                || path.is_absolute()
                || entry.contains("..")
            {
                return Err(ConfigError::InvalidValue {
                    field: "snapshot.entries".to_string(),
                    reason: format!("'{entry}' must be a relative path inside the project"),
                });
            }
            if backup_dir.starts_with(path) {
                return Err(ConfigError::InvalidValue {
                    field: "snapshot.entries".to_string(),
                    reason: format!("'{entry}' contains the backup directory"),
                });
            }
        }

        for descriptor in &self.enhancements.modules {
            let names = std::iter::once(&descriptor.module)
                .chain(std::iter::once(&descriptor.class))
                .chain(descriptor.capabilities.iter());
            for name in names {
                if !is_identifier(name) {
                    return Err(ConfigError::InvalidValue {
                        field: format!("enhancements.modules.{}", descriptor.name),
                        reason: format!("'{name}' is not a valid Python identifier"),
                    });
                }
            }
        }

        if self.enhancements.descriptor(&self.probe.enhancement).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "probe.enhancement".to_string(),
                reason: format!(
                    "'{}' does not name a configured enhancement",
                    self.probe.enhancement
                ),
            });
        }

        Ok(())
    }
}

/// ASCII identifier check for names rendered into generated Python modules.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first == '_' || first.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
