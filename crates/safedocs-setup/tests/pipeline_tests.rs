//! End-to-end pipeline runs against a scratch project with fake external processes.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use safedocs_config::SetupConfig;
use safedocs_core::{EnhancementState, RestoreStatus, SetupOutcome, SetupState, StageStatus, Verdict};
use safedocs_setup::enhancements::{Capability, lookup};
use safedocs_setup::{
    CommandOutput, EnhancementError, Orchestrator, PackageManager, Runtime, SetupError,
    SetupOptions, SetupSession, StageObserver,
};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct FakeRuntime {
    version: semver::Version,
    /// Every snippet fails when set.
    broken: bool,
}

impl FakeRuntime {
    fn healthy() -> Self {
        Self {
            version: semver::Version::new(3, 11, 4),
            broken: false,
        }
    }

    fn broken() -> Self {
        Self {
            broken: true,
            ..Self::healthy()
        }
    }
}

impl Runtime for FakeRuntime {
    fn version(&self) -> Result<semver::Version, SetupError> {
        Ok(self.version.clone())
    }

    fn run_snippet(
        &self,
        _cwd: &Path,
        _code: &str,
        _args: &[&str],
    ) -> Result<CommandOutput, SetupError> {
        Ok(CommandOutput {
            success: !self.broken,
            code: Some(i32::from(self.broken)),
            stdout: String::new(),
            stderr: if self.broken {
                "ImportError: cannot import name".to_string()
            } else {
                String::new()
            },
        })
    }
}

#[derive(Default)]
struct FakePip {
    calls: RefCell<Vec<String>>,
    failing: Vec<&'static str>,
}

impl PackageManager for FakePip {
    fn install_manifest(&self, _root: &Path, _manifest: &Path) -> Result<(), SetupError> {
        self.calls.borrow_mut().push("-r".to_string());
        Ok(())
    }

    fn install_package(&self, _root: &Path, package: &str) -> Result<(), SetupError> {
        self.calls.borrow_mut().push(package.to_string());
        if self.failing.contains(&package) {
            return Err(SetupError::DependencyInstall {
                target: package.to_string(),
                reason: "no matching distribution found".to_string(),
            });
        }
        Ok(())
    }
}

/// Installs cleanly but deletes one backed-up entry from the snapshot.
struct BackupEatingPip {
    victim: &'static str,
}

impl PackageManager for BackupEatingPip {
    fn install_manifest(&self, root: &Path, _manifest: &Path) -> Result<(), SetupError> {
        fs::remove_dir_all(root.join("backup").join(self.victim)).expect("remove backup copy");
        Ok(())
    }

    fn install_package(&self, _root: &Path, _package: &str) -> Result<(), SetupError> {
        Ok(())
    }
}

#[derive(Default)]
struct RecordingObserver {
    started: RefCell<Vec<SetupState>>,
    finished: RefCell<Vec<(SetupState, StageStatus)>>,
}

impl StageObserver for RecordingObserver {
    fn stage_started(&self, state: SetupState) {
        self.started.borrow_mut().push(state);
    }

    fn stage_finished(&self, state: SetupState, status: StageStatus) {
        self.finished.borrow_mut().push((state, status));
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const ORIGINAL_REQUIREMENTS: &str = "fastapi\nuvicorn\n";

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, contents).expect("write");
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(
        &root.join("main.py"),
        "from fastapi import FastAPI\n\nclass FileProcessor: ...\n\napp = FastAPI()\n",
    );
    write(&root.join("requirements.txt"), ORIGINAL_REQUIREMENTS);
    write(&root.join("static/index.html"), "<html>SafeDocs</html>");
    dir
}

const FULL_RUN: [SetupState; 7] = [
    SetupState::Validating,
    SetupState::BackingUp,
    SetupState::InstallingDeps,
    SetupState::ResolvingEnhancements,
    SetupState::MaterializingConfig,
    SetupState::Probing,
    SetupState::Done,
];

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[test]
fn full_run_reaches_done_and_ready() {
    let dir = project();
    let root = dir.path();
    let config = SetupConfig::default();
    let runtime = FakeRuntime::healthy();
    let pip = FakePip::default();

    let report = Orchestrator::new(&config, &runtime, &pip).run(root, SetupOptions::default());

    assert_eq!(report.states, FULL_RUN.to_vec());
    assert_eq!(report.outcome, SetupOutcome::Ready);
    assert_eq!(report.outcome.exit_code(), 0);
    assert_eq!(
        report.readiness.as_ref().map(|r| r.verdict),
        Some(Verdict::Ready)
    );
    assert!(report.error.is_none());

    assert!(root.join("backup/snapshot.json").is_file());
    assert!(root.join(".env").is_file());
    assert!(root.join("storage/uploads").is_dir());
    assert!(root.join("enhancements/contextual_analyzer.py").is_file());
    assert!(
        fs::read_to_string(root.join("requirements.txt"))
            .expect("manifest")
            .starts_with("# SafeDocs dependencies\nfastapi==0.104.1\n")
    );
    assert_eq!(
        *pip.calls.borrow(),
        vec!["-r", "spacy", "transformers", "reportlab", "python-docx"]
    );
}

#[test]
fn observer_sees_every_stage() {
    let dir = project();
    let config = SetupConfig::default();
    let runtime = FakeRuntime::healthy();
    let pip = FakePip::default();
    let observer = RecordingObserver::default();

    let report = Orchestrator::new(&config, &runtime, &pip)
        .with_observer(&observer)
        .run(dir.path(), SetupOptions::default());

    assert_eq!(*observer.started.borrow(), report.states);
    let finished: Vec<SetupState> = observer.finished.borrow().iter().map(|(s, _)| *s).collect();
    assert_eq!(finished, FULL_RUN[..6].to_vec());
}

#[test]
fn missing_artifact_short_circuits_without_side_effects() {
    let dir = project();
    let root = dir.path();
    fs::remove_file(root.join("static/index.html")).expect("rm");
    let config = SetupConfig::default();
    let runtime = FakeRuntime::healthy();
    let pip = FakePip::default();

    let report = Orchestrator::new(&config, &runtime, &pip).run(root, SetupOptions::default());

    assert_eq!(report.states, vec![SetupState::Validating, SetupState::Failed]);
    assert_eq!(report.outcome, SetupOutcome::Aborted);
    assert_eq!(report.outcome.exit_code(), 2);
    assert!(report.restore.is_none());

    assert!(!root.join("backup").exists());
    assert!(pip.calls.borrow().is_empty());
    assert!(!root.join(".env").exists());
    assert!(!root.join("enhancements").exists());
    assert_eq!(
        fs::read_to_string(root.join("requirements.txt")).expect("read"),
        ORIGINAL_REQUIREMENTS
    );
}

#[test]
fn old_interpreter_aborts() {
    let dir = project();
    let config = SetupConfig::default();
    let runtime = FakeRuntime {
        version: semver::Version::new(3, 7, 17),
        broken: false,
    };

    let report =
        Orchestrator::new(&config, &runtime, &FakePip::default()).run(dir.path(), SetupOptions::default());

    assert_eq!(report.outcome, SetupOutcome::Aborted);
    assert!(
        report
            .error
            .as_deref()
            .is_some_and(|error| error.contains("older than required"))
    );
}

#[test]
fn optional_package_failure_does_not_stop_pipeline() {
    let dir = project();
    let config = SetupConfig::default();
    let runtime = FakeRuntime::healthy();
    let pip = FakePip {
        failing: vec!["transformers"],
        ..FakePip::default()
    };

    let report = Orchestrator::new(&config, &runtime, &pip).run(dir.path(), SetupOptions::default());

    assert_eq!(
        *pip.calls.borrow(),
        vec!["-r", "spacy", "transformers", "reportlab", "python-docx"]
    );
    assert_eq!(report.final_state(), Some(SetupState::Done));
    let install = report.install.as_ref().expect("install report");
    assert_eq!(install.status, StageStatus::Degraded);
    assert!(report.warnings.iter().any(|w| w.contains("transformers")));
}

#[test]
fn skip_deps_visits_stage_without_installing() {
    let dir = project();
    let config = SetupConfig::default();
    let runtime = FakeRuntime::healthy();
    let pip = FakePip::default();

    let report = Orchestrator::new(&config, &runtime, &pip).run(
        dir.path(),
        SetupOptions { skip_deps: true },
    );

    assert!(pip.calls.borrow().is_empty());
    assert!(report.install.is_none());
    let install_stage = report
        .stages
        .iter()
        .find(|record| record.stage == SetupState::InstallingDeps)
        .expect("stage recorded");
    assert_eq!(install_stage.status, StageStatus::Skipped);
    assert_eq!(
        fs::read_to_string(dir.path().join("requirements.txt")).expect("read"),
        ORIGINAL_REQUIREMENTS
    );
}

#[test]
fn failing_probes_degrade_but_finish() {
    let dir = project();
    let config = SetupConfig::default();
    let runtime = FakeRuntime::broken();

    let report =
        Orchestrator::new(&config, &runtime, &FakePip::default()).run(dir.path(), SetupOptions::default());

    let readiness = report.readiness.as_ref().expect("readiness");
    assert_eq!(readiness.passed, 1);
    assert_eq!(report.final_state(), Some(SetupState::Done));
    assert_eq!(report.outcome, SetupOutcome::Degraded);
    assert_eq!(report.outcome.exit_code(), 1);
}

#[test]
fn configuration_write_failure_rolls_back() {
    let dir = project();
    let root = dir.path();
    // A plain file where the layout expects a directory.
    write(&root.join("storage"), "blocked");
    let config = SetupConfig::default();
    let runtime = FakeRuntime::healthy();

    let report =
        Orchestrator::new(&config, &runtime, &FakePip::default()).run(root, SetupOptions::default());

    assert_eq!(
        report.states[report.states.len() - 4..].to_vec(),
        vec![
            SetupState::MaterializingConfig,
            SetupState::Failed,
            SetupState::Restoring,
            SetupState::Restored,
        ]
    );
    assert_eq!(report.outcome, SetupOutcome::RolledBack);
    assert_eq!(report.outcome.exit_code(), 2);
    assert!(report.readiness.is_none());

    let restore = report.restore.as_ref().expect("restore report");
    assert_eq!(restore.status, RestoreStatus::Restored);
    assert!(!root.join(".env").exists());
    assert!(!root.join("enhancements").exists());
    assert_eq!(
        fs::read_to_string(root.join("requirements.txt")).expect("read"),
        ORIGINAL_REQUIREMENTS
    );
}

#[test]
fn broken_snapshot_ends_in_restore_failed_without_retry() {
    let dir = project();
    let root = dir.path();
    write(&root.join("storage"), "blocked");
    let config = SetupConfig::default();
    let runtime = FakeRuntime::healthy();
    let pip = BackupEatingPip { victim: "static" };

    let report = Orchestrator::new(&config, &runtime, &pip).run(root, SetupOptions::default());

    assert_eq!(
        report.states[report.states.len() - 4..].to_vec(),
        vec![
            SetupState::MaterializingConfig,
            SetupState::Failed,
            SetupState::Restoring,
            SetupState::RestoreFailed,
        ]
    );
    assert_eq!(report.final_state(), Some(SetupState::RestoreFailed));
    assert_eq!(
        report
            .states
            .iter()
            .filter(|state| **state == SetupState::Restoring)
            .count(),
        1
    );
    assert_eq!(report.outcome, SetupOutcome::RestoreFailed);
    assert_eq!(report.outcome.exit_code(), 2);
    assert!(report.restore.is_none());
    assert!(report.readiness.is_none());
    let error = report.error.as_deref().expect("error recorded");
    assert!(error.contains("backup copy is missing"), "error: {error}");
}

#[test]
fn rerun_keeps_configuration_bytes() {
    let dir = project();
    let root = dir.path();
    let config = SetupConfig::default();
    let runtime = FakeRuntime::healthy();
    let pip = FakePip::default();
    let orchestrator = Orchestrator::new(&config, &runtime, &pip);

    orchestrator.run(root, SetupOptions::default());
    let first = fs::read(root.join(".env")).expect("first");
    let second_report = orchestrator.run(root, SetupOptions::default());
    let second = fs::read(root.join(".env")).expect("second");

    assert_eq!(first, second);
    let configuration = second_report.configuration.expect("configuration");
    assert!(!configuration.written);
    let states: Vec<EnhancementState> = second_report
        .enhancements
        .expect("enhancements")
        .modules
        .iter()
        .map(|m| m.state)
        .collect();
    assert!(states.iter().all(|state| *state == EnhancementState::Stub));
}

// ---------------------------------------------------------------------------
// Single-stage entry points
// ---------------------------------------------------------------------------

#[test]
fn restore_only_reports_absent_then_restored() {
    let dir = project();
    let root = dir.path();
    let config = SetupConfig::default();
    let runtime = FakeRuntime::healthy();
    let pip = FakePip::default();
    let orchestrator = Orchestrator::new(&config, &runtime, &pip);

    let absent = orchestrator.restore_only(root).expect("absent");
    assert_eq!(absent.status, RestoreStatus::Absent);

    orchestrator.run(root, SetupOptions::default());
    let restored = orchestrator.restore_only(root).expect("restored");
    assert_eq!(restored.status, RestoreStatus::Restored);
    assert!(!root.join(".env").exists());
    assert_eq!(
        fs::read_to_string(root.join("requirements.txt")).expect("read"),
        ORIGINAL_REQUIREMENTS
    );
}

#[test]
fn probe_only_touches_nothing() {
    let dir = project();
    let root = dir.path();
    let config = SetupConfig::default();
    let runtime = FakeRuntime::healthy();
    let pip = FakePip::default();

    let readiness = Orchestrator::new(&config, &runtime, &pip).probe_only(root);

    assert_eq!(readiness.total, 4);
    assert_eq!(readiness.verdict, Verdict::Ready);
    assert!(!root.join("backup").exists());
    assert!(!root.join(".env").exists());
}

// ---------------------------------------------------------------------------
// Stand-ins
// ---------------------------------------------------------------------------

#[test]
fn stand_in_capabilities_always_report_not_installed() {
    let dir = project();
    let root = dir.path();
    let config = SetupConfig::default();
    let runtime = FakeRuntime::healthy();
    Orchestrator::new(&config, &runtime, &FakePip::default()).run(root, SetupOptions::default());

    let session = SetupSession::new(root, &config.snapshot);
    for descriptor in &config.enhancements.modules {
        let capability = lookup(&session, &config.enhancements, descriptor, &runtime);
        assert!(matches!(capability, Capability::Absent(_)));
        for name in &descriptor.capabilities {
            for input in ["", "Договор аренды"] {
                let result = capability.enhancement().invoke(name, input);
                assert_eq!(
                    result,
                    Err(EnhancementError::NotInstalled {
                        enhancement: descriptor.name.clone(),
                        capability: name.clone(),
                    })
                );
            }
        }
    }
}
