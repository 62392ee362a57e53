use std::path::{Path, PathBuf};

use anyhow::Context;
use safedocs_config::SetupConfig;

/// The project root: `--root` when given, the current directory otherwise.
pub fn resolve_root(root_override: Option<&str>) -> anyhow::Result<PathBuf> {
    let root = match root_override {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir().context("failed to read current directory")?,
    };

    if !root.is_dir() {
        anyhow::bail!("invalid --root '{}': directory does not exist", root.display());
    }
    Ok(root)
}

/// Load and validate the setup configuration once for the whole run.
pub fn load_config(root: &Path) -> anyhow::Result<SetupConfig> {
    let config = SetupConfig::load(root)
        .with_context(|| format!("failed to load setup configuration for {}", root.display()))?;

    tracing::debug!(
        interpreter = %config.runtime.interpreter,
        backup_dir = %config.snapshot.backup_dir,
        enhancements = config.enhancements.modules.len(),
        "configuration loaded"
    );
    Ok(config)
}
