//! Environment validation. Fail-fast: the first violated precondition is returned.

use serde::Serialize;

use safedocs_config::RuntimeConfig;

use crate::error::{EnvironmentViolation, SetupError};
use crate::runtime::Runtime;
use crate::session::SetupSession;

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub interpreter_version: String,
    pub min_version: String,
    pub checked_paths: Vec<String>,
}

/// Check the interpreter version, then each required path in order.
pub fn validate(
    session: &SetupSession,
    config: &RuntimeConfig,
    runtime: &dyn Runtime,
) -> Result<ValidationReport, SetupError> {
    let required = config
        .min_version()
        .map_err(|error| EnvironmentViolation::Config(error.to_string()))?;

    let found = runtime
        .version()
        .map_err(|error| EnvironmentViolation::RuntimeUnavailable {
            interpreter: config.interpreter.clone(),
            reason: error.to_string(),
        })?;

    if found < required {
        return Err(EnvironmentViolation::RuntimeTooOld { found, required }.into());
    }
    tracing::info!(version = %found, "interpreter version accepted");

    for relative in &config.required_paths {
        let path = session.path(relative);
        if !path.exists() {
            return Err(EnvironmentViolation::MissingPath(path).into());
        }
    }

    Ok(ValidationReport {
        interpreter_version: found.to_string(),
        min_version: required.to_string(),
        checked_paths: config.required_paths.clone(),
    })
}
