//! Configuration artifact and directory layout.
//!
//! The artifact is created once and never rewritten: an existing file is
//! treated as user-owned and only audited for missing keys.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write as _};
use std::path::Path;

use serde::Serialize;

use safedocs_config::{AppSettings, LayoutConfig};
use safedocs_core::StageStatus;

use crate::error::SetupError;
use crate::session::SetupSession;

#[derive(Debug, Clone, Serialize)]
pub struct MaterializeReport {
    pub artifact: String,
    /// `false` when an existing artifact was left in place.
    pub written: bool,
    pub missing_keys: Vec<String>,
    pub directories_created: Vec<String>,
    pub warnings: Vec<String>,
    pub status: StageStatus,
}

/// Serialize the full template as `KEY=VALUE` lines.
#[must_use]
pub fn render_artifact(settings: &AppSettings) -> String {
    let mut out = String::new();
    for (key, value) in settings.template_entries() {
        let _ = writeln!(out, "{key}={value}");
    }
    out
}

fn write_error(path: &Path, source: std::io::Error) -> SetupError {
    SetupError::ConfigurationWrite {
        path: path.to_path_buf(),
        source,
    }
}

/// Create the artifact if absent, then every layout directory.
pub fn materialize(
    session: &SetupSession,
    settings: &AppSettings,
    layout: &LayoutConfig,
) -> Result<MaterializeReport, SetupError> {
    let path = session.path(&settings.artifact);
    let mut warnings = Vec::new();

    let written = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(mut file) => {
            file.write_all(render_artifact(settings).as_bytes())
                .map_err(|error| write_error(&path, error))?;
            tracing::info!(artifact = %path.display(), "configuration written");
            true
        }
        Err(error) if error.kind() == ErrorKind::AlreadyExists => {
            tracing::info!(artifact = %path.display(), "configuration exists; left untouched");
            false
        }
        Err(error) => return Err(write_error(&path, error)),
    };

    let missing_keys = if written {
        Vec::new()
    } else {
        match audit(&path, settings) {
            Ok(missing) => missing,
            Err(reason) => {
                warnings.push(format!("cannot audit {}: {reason}", path.display()));
                Vec::new()
            }
        }
    };
    for key in &missing_keys {
        tracing::warn!(key = %key, "existing configuration lacks key");
        warnings.push(format!("{} lacks {key}", settings.artifact));
    }

    let mut directories_created = Vec::new();
    for relative in &layout.directories {
        let dir = session.path(relative);
        if dir.is_dir() {
            continue;
        }
        fs::create_dir_all(&dir).map_err(|error| write_error(&dir, error))?;
        tracing::debug!(dir = %dir.display(), "directory created");
        directories_created.push(relative.clone());
    }

    let status = if warnings.is_empty() {
        StageStatus::Completed
    } else {
        StageStatus::Degraded
    };

    Ok(MaterializeReport {
        artifact: settings.artifact.clone(),
        written,
        missing_keys,
        directories_created,
        warnings,
        status,
    })
}

/// Template keys the existing artifact does not define.
fn audit(path: &Path, settings: &AppSettings) -> Result<Vec<String>, dotenvy::Error> {
    let mut present = HashSet::new();
    for item in dotenvy::from_path_iter(path)? {
        let (key, _) = item?;
        present.insert(key);
    }

    Ok(settings
        .template_entries()
        .into_iter()
        .map(|(key, _)| key)
        .filter(|key| !present.contains(*key))
        .map(str::to_string)
        .collect())
}
