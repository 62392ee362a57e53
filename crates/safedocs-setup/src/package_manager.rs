//! External package manager seam.

use std::path::Path;
use std::process::Command;

use crate::error::SetupError;
use crate::runtime::run_command;

/// Installs packages for the application. Any failure is reported as
/// [`SetupError::DependencyInstall`] (or [`SetupError::Runtime`] when the
/// package manager cannot be started); callers decide whether it is fatal.
pub trait PackageManager {
    /// Install the full pinned set from `manifest` in one invocation.
    fn install_manifest(&self, root: &Path, manifest: &Path) -> Result<(), SetupError>;

    /// Install a single package.
    fn install_package(&self, root: &Path, package: &str) -> Result<(), SetupError>;
}

/// `pip`, run as a module of the application's interpreter.
#[derive(Debug, Clone)]
pub struct Pip {
    interpreter: String,
}

impl Pip {
    #[must_use]
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }

    fn pip_install(&self, root: &Path, target: &str, args: &[&str]) -> Result<(), SetupError> {
        let output = run_command(
            Command::new(&self.interpreter)
                .current_dir(root)
                .args(["-m", "pip", "install"])
                .args(args),
        )?;

        if output.success {
            Ok(())
        } else {
            Err(SetupError::DependencyInstall {
                target: target.to_string(),
                reason: output.failure_summary(),
            })
        }
    }
}

impl PackageManager for Pip {
    fn install_manifest(&self, root: &Path, manifest: &Path) -> Result<(), SetupError> {
        let manifest_arg = manifest.to_string_lossy();
        self.pip_install(root, &manifest_arg, &["-r", &manifest_arg])
    }

    fn install_package(&self, root: &Path, package: &str) -> Result<(), SetupError> {
        self.pip_install(root, package, &[package])
    }
}
