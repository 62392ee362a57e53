use std::path::PathBuf;

use thiserror::Error;

/// Why the environment cannot host the application.
#[derive(Debug, Error)]
pub enum EnvironmentViolation {
    #[error("interpreter '{interpreter}' is unavailable: {reason}")]
    RuntimeUnavailable { interpreter: String, reason: String },
    #[error("interpreter version {found} is older than required {required}")]
    RuntimeTooOld {
        found: semver::Version,
        required: semver::Version,
    },
    #[error("required path is missing: {0}")]
    MissingPath(PathBuf),
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("environment check failed: {0}")]
    Environment(#[from] EnvironmentViolation),
    #[error("dependency install failed for '{target}': {reason}")]
    DependencyInstall { target: String, reason: String },
    #[error("integration hook failed: {0}")]
    Integration(String),
    #[error("cannot write configuration at '{path}': {source}")]
    ConfigurationWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot save failed at '{path}': {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("restore failed at '{path}': {reason}")]
    Restore { path: PathBuf, reason: String },
    #[error("cannot run '{program}': {source}")]
    Runtime {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot manifest is unreadable: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("io error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What the orchestrator does with an error a stage could not contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Record a warning and move on with reduced functionality.
    Degrade,
    /// Stop; nothing has been mutated so there is nothing to restore.
    AbortBeforeMutation,
    /// Stop and restore the session snapshot.
    AbortAndRestore,
    /// Stop with no further recovery.
    Fatal,
}

impl SetupError {
    #[must_use]
    pub const fn disposition(&self) -> Disposition {
        match self {
            Self::Environment(_) | Self::Snapshot { .. } => Disposition::AbortBeforeMutation,
            Self::DependencyInstall { .. } | Self::Integration(_) | Self::Runtime { .. } => {
                Disposition::Degrade
            }
            Self::ConfigurationWrite { .. } | Self::Manifest(_) | Self::Io { .. } => {
                Disposition::AbortAndRestore
            }
            Self::Restore { .. } => Disposition::Fatal,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// The error every capability call on an unavailable enhancement returns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnhancementError {
    #[error("enhancement not installed: {enhancement} (capability '{capability}')")]
    NotInstalled {
        enhancement: String,
        capability: String,
    },
    #[error("enhancement '{enhancement}' has no capability '{capability}'")]
    UnknownCapability {
        enhancement: String,
        capability: String,
    },
    #[error("enhancement '{enhancement}' failed in '{capability}': {reason}")]
    Invocation {
        enhancement: String,
        capability: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_error() -> std::io::Error {
        std::io::Error::other("boom")
    }

    #[test]
    fn pre_mutation_errors_abort_without_restore() {
        let env = SetupError::from(EnvironmentViolation::MissingPath(PathBuf::from("main.py")));
        assert_eq!(env.disposition(), Disposition::AbortBeforeMutation);

        let save = SetupError::Snapshot {
            path: PathBuf::from("backup"),
            source: io_error(),
        };
        assert_eq!(save.disposition(), Disposition::AbortBeforeMutation);
    }

    #[test]
    fn contained_errors_degrade() {
        let dep = SetupError::DependencyInstall {
            target: "spacy".to_string(),
            reason: "exit 1".to_string(),
        };
        assert_eq!(dep.disposition(), Disposition::Degrade);
        assert_eq!(
            SetupError::Integration("raised".to_string()).disposition(),
            Disposition::Degrade
        );
    }

    #[test]
    fn configuration_write_triggers_restore() {
        let error = SetupError::ConfigurationWrite {
            path: PathBuf::from(".env"),
            source: io_error(),
        };
        assert_eq!(error.disposition(), Disposition::AbortAndRestore);
    }

    #[test]
    fn restore_error_is_fatal() {
        let error = SetupError::Restore {
            path: PathBuf::from("static"),
            reason: "denied".to_string(),
        };
        assert_eq!(error.disposition(), Disposition::Fatal);
    }
}
