//! External interpreter seam.
//!
//! Every stage that needs the application's interpreter goes through the
//! [`Runtime`] trait so tests can substitute a fake. Invocations block until
//! the child exits and capture its output in full.

use std::path::Path;
use std::process::Command;

use safedocs_config::RuntimeConfig;

use crate::error::SetupError;

/// Captured result of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Last non-empty stderr line, or the exit code when stderr is empty.
    #[must_use]
    pub fn failure_summary(&self) -> String {
        self.stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map_or_else(
                || format!("exit={:?}", self.code),
                std::string::ToString::to_string,
            )
    }
}

pub trait Runtime {
    /// Interpreter version.
    fn version(&self) -> Result<semver::Version, SetupError>;

    /// Run `code` with `cwd` as working directory; `args` become `sys.argv[1..]`.
    fn run_snippet(
        &self,
        cwd: &Path,
        code: &str,
        args: &[&str],
    ) -> Result<CommandOutput, SetupError>;
}

/// The application's Python interpreter.
#[derive(Debug, Clone)]
pub struct PythonRuntime {
    interpreter: String,
}

impl PythonRuntime {
    #[must_use]
    pub fn new(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.interpreter.clone())
    }

    #[must_use]
    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }
}

impl Runtime for PythonRuntime {
    fn version(&self) -> Result<semver::Version, SetupError> {
        let output = run_command(Command::new(&self.interpreter).arg("--version"))?;
        // Python 2 and very old 3.x print the version on stderr.
        let text = format!("{}\n{}", output.stdout, output.stderr);
        parse_version(&text).ok_or_else(|| SetupError::Runtime {
            program: self.interpreter.clone(),
            source: std::io::Error::other(format!(
                "unrecognized version output: {}",
                text.trim()
            )),
        })
    }

    fn run_snippet(
        &self,
        cwd: &Path,
        code: &str,
        args: &[&str],
    ) -> Result<CommandOutput, SetupError> {
        run_command(
            Command::new(&self.interpreter)
                .current_dir(cwd)
                .arg("-c")
                .arg(code)
                .args(args),
        )
    }
}

/// Run a command to completion, capturing stdout and stderr.
pub fn run_command(command: &mut Command) -> Result<CommandOutput, SetupError> {
    let program = command.get_program().to_string_lossy().to_string();
    tracing::debug!(command = ?command, "running external command");

    let output = command
        .output()
        .map_err(|source| SetupError::Runtime { program, source })?;

    Ok(CommandOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Parse `Python 3.11.4`-style output into a semver version.
///
/// Two-part versions are padded (`3.12` -> `3.12.0`) and pre-release suffixes
/// are dropped (`3.13.0rc1` -> `3.13.0`).
#[must_use]
pub fn parse_version(text: &str) -> Option<semver::Version> {
    let token = text
        .split_whitespace()
        .find(|token| token.starts_with(|c: char| c.is_ascii_digit()))?;

    let mut parts = token.split('.').map(|part| {
        let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
        digits.parse::<u64>().ok()
    });

    let major = parts.next()??;
    let minor = parts.next().flatten().unwrap_or(0);
    let patch = parts.next().flatten().unwrap_or(0);
    Some(semver::Version::new(major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_python_version() {
        assert_eq!(
            parse_version("Python 3.11.4\n"),
            Some(semver::Version::new(3, 11, 4))
        );
    }

    #[test]
    fn pads_two_part_versions() {
        assert_eq!(
            parse_version("Python 3.12"),
            Some(semver::Version::new(3, 12, 0))
        );
    }

    #[test]
    fn drops_prerelease_suffix() {
        assert_eq!(
            parse_version("Python 3.13.0rc1"),
            Some(semver::Version::new(3, 13, 0))
        );
    }

    #[test]
    fn rejects_output_without_version() {
        assert_eq!(parse_version("command not found"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn failure_summary_prefers_last_stderr_line() {
        let output = CommandOutput {
            success: false,
            code: Some(1),
            stdout: String::new(),
            stderr: "Traceback (most recent call last):\n  ...\nImportError: no module\n\n"
                .to_string(),
        };
        assert_eq!(output.failure_summary(), "ImportError: no module");

        let silent = CommandOutput {
            success: false,
            code: Some(3),
            ..CommandOutput::default()
        };
        assert_eq!(silent.failure_summary(), "exit=Some(3)");
    }

    #[test]
    fn missing_interpreter_is_a_runtime_error() {
        let runtime = PythonRuntime::new("safedocs-no-such-interpreter-12345");
        assert!(matches!(
            runtime.version(),
            Err(SetupError::Runtime { .. })
        ));
    }
}
