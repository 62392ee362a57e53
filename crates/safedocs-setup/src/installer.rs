//! Dependency manifest generation and package installation.
//!
//! Install failures never abort the pipeline: the pinned-set failure and each
//! optional-package failure are recorded as warnings and the next item is
//! still attempted.

use std::fmt::Write as _;
use std::fs;

use serde::Serialize;

use safedocs_config::DependencyConfig;
use safedocs_core::StageStatus;

use crate::error::SetupError;
use crate::package_manager::PackageManager;
use crate::session::SetupSession;

#[derive(Debug, Clone, Serialize)]
pub struct OptionalInstall {
    pub name: String,
    pub description: String,
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub manifest: String,
    pub pinned: usize,
    pub core_installed: bool,
    pub optional: Vec<OptionalInstall>,
    pub warnings: Vec<String>,
    pub status: StageStatus,
}

/// Render the manifest: pins in order, then optional packages commented out.
#[must_use]
pub fn render_manifest(config: &DependencyConfig) -> String {
    let mut out = String::from("# SafeDocs dependencies\n");
    for pin in &config.pins {
        let _ = writeln!(out, "{}=={}", pin.name, pin.version);
    }

    if !config.optional.is_empty() {
        out.push_str("\n# Optional enhancements (installed separately)\n");
        for package in &config.optional {
            let _ = writeln!(out, "# {}  # {}", package.name, package.description);
        }
    }
    out
}

/// Write the manifest, install the pinned set, then each optional package.
pub fn install(
    session: &SetupSession,
    config: &DependencyConfig,
    packages: &dyn PackageManager,
) -> Result<InstallReport, SetupError> {
    let manifest = session.path(&config.manifest);
    fs::write(&manifest, render_manifest(config))
        .map_err(|error| SetupError::io(&manifest, error))?;
    tracing::info!(manifest = %manifest.display(), pins = config.pins.len(), "manifest written");

    let mut warnings = Vec::new();

    let core_installed = match packages.install_manifest(&session.root, &manifest) {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(%error, "pinned dependencies failed; continuing with reduced functionality");
            warnings.push(error.to_string());
            false
        }
    };

    let mut optional = Vec::with_capacity(config.optional.len());
    for package in &config.optional {
        let result = packages.install_package(&session.root, &package.name);
        let error = match result {
            Ok(()) => {
                tracing::info!(package = %package.name, "optional package installed");
                None
            }
            Err(error) => {
                tracing::warn!(package = %package.name, %error, "optional package failed");
                warnings.push(error.to_string());
                Some(error.to_string())
            }
        };
        optional.push(OptionalInstall {
            name: package.name.clone(),
            description: package.description.clone(),
            installed: error.is_none(),
            error,
        });
    }

    let status = if warnings.is_empty() {
        StageStatus::Completed
    } else {
        StageStatus::Degraded
    };

    Ok(InstallReport {
        manifest: config.manifest.clone(),
        pinned: config.pins.len(),
        core_installed,
        optional,
        warnings,
        status,
    })
}
