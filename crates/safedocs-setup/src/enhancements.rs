//! Optional enhancement modules.
//!
//! Each configured enhancement is looked up on disk. Lookup yields
//! [`Capability::Present`] for a real module and [`Capability::Absent`] (a
//! [`NullEnhancement`]) otherwise; both implement [`Enhancement`], so callers
//! match on the tag instead of relying on import failures. Missing modules
//! get a generated stand-in file so the application itself can still import
//! them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use safedocs_config::{EnhancementConfig, EnhancementDescriptor};
use safedocs_core::{EnhancementState, IntegrationStatus, StageStatus};

use crate::error::{EnhancementError, SetupError};
use crate::runtime::Runtime;
use crate::session::SetupSession;
use crate::stub::{is_stub, not_installed_message, render_stub};

/// A callable enhancement surface.
pub trait Enhancement {
    fn name(&self) -> &str;

    /// Call `capability` with a single text argument.
    fn invoke(&self, capability: &str, input: &str) -> Result<String, EnhancementError>;
}

/// Stand-in for a missing enhancement. Every call fails with
/// [`EnhancementError::NotInstalled`], whatever the capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullEnhancement {
    name: String,
}

impl NullEnhancement {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Enhancement for NullEnhancement {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, capability: &str, _input: &str) -> Result<String, EnhancementError> {
        Err(EnhancementError::NotInstalled {
            enhancement: self.name.clone(),
            capability: capability.to_string(),
        })
    }
}

/// Handle to an installed module, invoked through the application interpreter.
pub struct ModuleEnhancement<'a> {
    descriptor: EnhancementDescriptor,
    package: String,
    root: PathBuf,
    runtime: &'a dyn Runtime,
}

impl ModuleEnhancement<'_> {
    /// Dotted import path of the module (`enhancements.entity_detector`).
    #[must_use]
    pub fn import_path(&self) -> String {
        format!("{}.{}", self.package, self.descriptor.module)
    }
}

impl Enhancement for ModuleEnhancement<'_> {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn invoke(&self, capability: &str, input: &str) -> Result<String, EnhancementError> {
        if !self.descriptor.capabilities.iter().any(|c| c == capability) {
            return Err(EnhancementError::UnknownCapability {
                enhancement: self.descriptor.name.clone(),
                capability: capability.to_string(),
            });
        }

        let code = format!(
            "import sys\nfrom {} import {}\nprint({}().{}(sys.argv[1]))",
            self.import_path(),
            self.descriptor.class,
            self.descriptor.class,
            capability
        );
        let invocation_error = |reason: String| EnhancementError::Invocation {
            enhancement: self.descriptor.name.clone(),
            capability: capability.to_string(),
            reason,
        };

        let output = self
            .runtime
            .run_snippet(&self.root, &code, &[input])
            .map_err(|error| invocation_error(error.to_string()))?;

        if output.success {
            return Ok(output.stdout.trim_end().to_string());
        }
        if output
            .stderr
            .contains(&not_installed_message(&self.descriptor.name))
        {
            return Err(EnhancementError::NotInstalled {
                enhancement: self.descriptor.name.clone(),
                capability: capability.to_string(),
            });
        }
        Err(invocation_error(output.failure_summary()))
    }
}

/// Tagged lookup result.
pub enum Capability<'a> {
    Present(ModuleEnhancement<'a>),
    Absent(NullEnhancement),
}

impl Capability<'_> {
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    #[must_use]
    pub fn enhancement(&self) -> &dyn Enhancement {
        match self {
            Self::Present(module) => module,
            Self::Absent(null) => null,
        }
    }
}

fn module_path(session: &SetupSession, config: &EnhancementConfig, module: &str) -> PathBuf {
    session.path(&config.dir).join(format!("{module}.py"))
}

fn import_package(config: &EnhancementConfig) -> String {
    config.dir.trim_matches('/').replace('/', ".")
}

/// Classify a module file; `None` only when nothing is on disk.
///
/// A file that exists but cannot be read counts as present.
fn inspect(path: &Path) -> Option<EnhancementState> {
    if let Err(error) = fs::symlink_metadata(path) {
        if error.kind() == io::ErrorKind::NotFound {
            return None;
        }
        tracing::warn!(path = %path.display(), %error, "cannot stat enhancement module; treating as present");
        return Some(EnhancementState::Present);
    }

    match fs::read(path) {
        Ok(bytes) if is_stub(&bytes) => Some(EnhancementState::Stub),
        Ok(_) => Some(EnhancementState::Present),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "cannot read enhancement module; treating as present");
            Some(EnhancementState::Present)
        }
    }
}

/// Look up one enhancement. Stand-ins count as absent.
#[must_use]
pub fn lookup<'a>(
    session: &SetupSession,
    config: &EnhancementConfig,
    descriptor: &EnhancementDescriptor,
    runtime: &'a dyn Runtime,
) -> Capability<'a> {
    let path = module_path(session, config, &descriptor.module);
    match inspect(&path) {
        Some(EnhancementState::Present) => Capability::Present(ModuleEnhancement {
            descriptor: descriptor.clone(),
            package: import_package(config),
            root: session.root.clone(),
            runtime,
        }),
        _ => Capability::Absent(NullEnhancement::new(descriptor.name.clone())),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleResolution {
    pub name: String,
    pub path: String,
    pub state: EnhancementState,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntegrationReport {
    pub status: IntegrationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnhancementReport {
    pub modules: Vec<ModuleResolution>,
    pub integration: IntegrationReport,
    pub warnings: Vec<String>,
    pub status: StageStatus,
}

/// Ensure every enhancement is importable, then run the integration hook once.
pub fn resolve(
    session: &SetupSession,
    config: &EnhancementConfig,
    runtime: &dyn Runtime,
) -> Result<EnhancementReport, SetupError> {
    let dir = session.path(&config.dir);
    fs::create_dir_all(&dir).map_err(|error| SetupError::io(&dir, error))?;

    let mut warnings = Vec::new();
    let mut modules = Vec::with_capacity(config.modules.len());
    for descriptor in &config.modules {
        let path = module_path(session, config, &descriptor.module);
        let state = match lookup(session, config, descriptor, runtime) {
            Capability::Present(module) => {
                tracing::info!(enhancement = %descriptor.name, import = %module.import_path(), "enhancement present");
                EnhancementState::Present
            }
            Capability::Absent(_) => {
                // Only a path with nothing on it gets a stand-in written.
                let state = match inspect(&path) {
                    Some(state) => state,
                    None => {
                        fs::write(&path, render_stub(descriptor))
                            .map_err(|error| SetupError::io(&path, error))?;
                        EnhancementState::Synthesized
                    }
                };
                tracing::warn!(enhancement = %descriptor.name, %state, "enhancement not installed; stand-in in place");
                warnings.push(format!(
                    "enhancement '{}' is not installed ({state})",
                    descriptor.name
                ));
                state
            }
        };

        modules.push(ModuleResolution {
            name: descriptor.name.clone(),
            path: path.to_string_lossy().to_string(),
            state,
        });
    }

    let integration = match run_integration_hook(session, config, runtime) {
        Ok(status) => IntegrationReport {
            status,
            detail: None,
        },
        Err(error) => {
            tracing::warn!(%error, "integration hook failed; continuing in standard mode");
            warnings.push(error.to_string());
            IntegrationReport {
                status: IntegrationStatus::Failed,
                detail: Some(error.to_string()),
            }
        }
    };
    if integration.status == IntegrationStatus::Partial {
        warnings.push("integration hook reported partial integration".to_string());
    }

    let status = if warnings.is_empty() {
        StageStatus::Completed
    } else {
        StageStatus::Degraded
    };

    Ok(EnhancementReport {
        modules,
        integration,
        warnings,
        status,
    })
}

const HOOK_MISSING: &str = "__safedocs_hook_missing__";
const HOOK_RESULT: &str = "__safedocs_hook_result__";

/// Call the integration hook, if the integration module defines one.
///
/// A missing module or hook means standard mode; a falsy return means partial
/// integration; anything the hook raises comes back as
/// [`SetupError::Integration`].
pub fn run_integration_hook(
    session: &SetupSession,
    config: &EnhancementConfig,
    runtime: &dyn Runtime,
) -> Result<IntegrationStatus, SetupError> {
    let path = module_path(session, config, &config.integration_module);
    if !path.is_file() {
        tracing::info!("no integration module; standard mode");
        return Ok(IntegrationStatus::StandardMode);
    }
    if inspect(&path) == Some(EnhancementState::Stub) {
        return Ok(IntegrationStatus::StandardMode);
    }

    let code = format!(
        "import importlib\n\
         module = importlib.import_module({module:?})\n\
         hook = getattr(module, {hook:?}, None)\n\
         if hook is None:\n    print({HOOK_MISSING:?})\n\
         else:\n    print({HOOK_RESULT:?}, bool(hook()))\n",
        module = format!("{}.{}", import_package(config), config.integration_module),
        hook = config.integration_hook,
    );

    let output = runtime
        .run_snippet(&session.root, &code, &[])
        .map_err(|error| SetupError::Integration(error.to_string()))?;
    if !output.success {
        return Err(SetupError::Integration(output.failure_summary()));
    }

    let status = output.stdout.lines().rev().find_map(|line| {
        let line = line.trim();
        if line == HOOK_MISSING {
            Some(IntegrationStatus::StandardMode)
        } else {
            match line.strip_prefix(HOOK_RESULT).map(str::trim) {
                Some("True") => Some(IntegrationStatus::Integrated),
                Some("False") => Some(IntegrationStatus::Partial),
                _ => None,
            }
        }
    });

    status.ok_or_else(|| {
        SetupError::Integration(format!(
            "unexpected hook output: {}",
            output.stdout.trim()
        ))
    })
}
