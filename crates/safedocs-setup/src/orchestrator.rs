//! The staged setup pipeline.
//!
//! ```text
//! validating → backing_up → installing_deps → resolving_enhancements
//!            → materializing_config → probing → done
//! ```
//!
//! Errors a stage contains (failed installs, a raising integration hook) are
//! recorded as warnings and the pipeline moves on. A validation or backup
//! failure stops the run before anything is touched. A failed save stops
//! rather than degrades because, without a complete snapshot, the later
//! stages could not be rolled back. Any other error after the backup
//! restores the snapshot taken at `backing_up`.

use std::path::Path;

use serde::Serialize;

use safedocs_config::SetupConfig;
use safedocs_core::{ReadinessReport, SetupOutcome, SetupState, StageStatus, Verdict};

use crate::enhancements::{self, EnhancementReport};
use crate::error::{Disposition, SetupError};
use crate::installer::{self, InstallReport};
use crate::materialize::{self, MaterializeReport};
use crate::package_manager::PackageManager;
use crate::probe;
use crate::runtime::Runtime;
use crate::session::SetupSession;
use crate::snapshot::{RestoreReport, Snapshot, SnapshotStore};
use crate::validator::{self, ValidationReport};

#[derive(Debug, Clone, Copy, Default)]
pub struct SetupOptions {
    pub skip_deps: bool,
}

/// Receives stage boundaries as the pipeline runs.
pub trait StageObserver {
    fn stage_started(&self, _state: SetupState) {}
    fn stage_finished(&self, _state: SetupState, _status: StageStatus) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl StageObserver for Silent {}

#[derive(Debug, Clone, Serialize)]
pub struct StageRecord {
    pub stage: SetupState,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetupReport {
    pub root: String,
    /// Every state entered, in order.
    pub states: Vec<SetupState>,
    pub stages: Vec<StageRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<InstallReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhancements: Option<EnhancementReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<MaterializeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness: Option<ReadinessReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restore: Option<RestoreReport>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub outcome: SetupOutcome,
}

impl SetupReport {
    #[must_use]
    pub fn final_state(&self) -> Option<SetupState> {
        self.states.last().copied()
    }
}

pub struct Orchestrator<'a> {
    config: &'a SetupConfig,
    runtime: &'a dyn Runtime,
    packages: &'a dyn PackageManager,
    observer: &'a dyn StageObserver,
}

impl<'a> Orchestrator<'a> {
    #[must_use]
    pub fn new(
        config: &'a SetupConfig,
        runtime: &'a dyn Runtime,
        packages: &'a dyn PackageManager,
    ) -> Self {
        Self {
            config,
            runtime,
            packages,
            observer: &Silent,
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: &'a dyn StageObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Run the full pipeline against `root`.
    pub fn run(&self, root: &Path, options: SetupOptions) -> SetupReport {
        let session = SetupSession::new(root, &self.config.snapshot);
        let store = SnapshotStore::for_session(&session);
        let mut run = Run::start(&session, self.observer);

        let snapshot = match self.prepare(&session, &store, &mut run) {
            Ok(snapshot) => snapshot,
            Err(error) => return run.abort(&error),
        };

        match self.apply(&session, options, &mut run) {
            Ok(readiness) => run.done(readiness),
            Err(error) => run.roll_back(&error, &store, &snapshot, &session),
        }
    }

    /// Restore the most recent snapshot without running any stage.
    pub fn restore_only(&self, root: &Path) -> Result<RestoreReport, SetupError> {
        let session = SetupSession::new(root, &self.config.snapshot);
        SnapshotStore::for_session(&session).restore_latest(root)
    }

    /// Run the readiness probes only.
    #[must_use]
    pub fn probe_only(&self, root: &Path) -> ReadinessReport {
        let session = SetupSession::new(root, &self.config.snapshot);
        probe::probe(&session, self.config, self.runtime)
    }

    /// Validation and backup. Nothing under the project root is modified here.
    fn prepare(
        &self,
        session: &SetupSession,
        store: &SnapshotStore,
        run: &mut Run<'_>,
    ) -> Result<Snapshot, SetupError> {
        let validation = validator::validate(session, &self.config.runtime, self.runtime)?;
        run.validation = Some(validation);
        run.finish_stage(StageStatus::Completed, &[]);

        run.advance(SetupState::BackingUp);
        let snapshot = store
            .save(&session.root, &self.config.snapshot.entries)
            .map_err(|error| match error {
                SetupError::Snapshot { .. } => error,
                other => SetupError::Snapshot {
                    path: store.backup_root().to_path_buf(),
                    source: std::io::Error::other(other.to_string()),
                },
            })?;
        run.finish_stage(StageStatus::Completed, &[]);
        Ok(snapshot)
    }

    /// The mutating stages and the readiness probes.
    fn apply(
        &self,
        session: &SetupSession,
        options: SetupOptions,
        run: &mut Run<'_>,
    ) -> Result<ReadinessReport, SetupError> {
        run.advance(SetupState::InstallingDeps);
        if options.skip_deps {
            tracing::info!("dependency install skipped");
            run.finish_stage(StageStatus::Skipped, &[]);
        } else if let Some(report) =
            run.contain(installer::install(session, &self.config.dependencies, self.packages))?
        {
            run.finish_stage(report.status, &report.warnings);
            run.install = Some(report);
        }

        run.advance(SetupState::ResolvingEnhancements);
        if let Some(report) =
            run.contain(enhancements::resolve(session, &self.config.enhancements, self.runtime))?
        {
            run.finish_stage(report.status, &report.warnings);
            run.enhancements = Some(report);
        }

        run.advance(SetupState::MaterializingConfig);
        if let Some(report) = run.contain(materialize::materialize(
            session,
            &self.config.app,
            &self.config.layout,
        ))? {
            run.finish_stage(report.status, &report.warnings);
            run.configuration = Some(report);
        }

        run.advance(SetupState::Probing);
        let readiness = probe::probe(session, self.config, self.runtime);
        let status = match readiness.verdict {
            Verdict::Ready => StageStatus::Completed,
            Verdict::Degraded => StageStatus::Degraded,
        };
        let failed: Vec<String> = readiness
            .probes
            .iter()
            .filter(|result| !result.passed)
            .map(|result| format!("probe '{}' failed", result.name))
            .collect();
        run.finish_stage(status, &failed);
        Ok(readiness)
    }
}

/// Mutable bookkeeping for one pipeline run.
struct Run<'o> {
    root: String,
    state: SetupState,
    states: Vec<SetupState>,
    stages: Vec<StageRecord>,
    warnings: Vec<String>,
    validation: Option<ValidationReport>,
    install: Option<InstallReport>,
    enhancements: Option<EnhancementReport>,
    configuration: Option<MaterializeReport>,
    observer: &'o dyn StageObserver,
}

impl<'o> Run<'o> {
    fn start(session: &SetupSession, observer: &'o dyn StageObserver) -> Self {
        let state = SetupState::Validating;
        tracing::info!(root = %session.root.display(), %state, "setup started");
        observer.stage_started(state);
        Self {
            root: session.root.display().to_string(),
            state,
            states: vec![state],
            stages: Vec::new(),
            warnings: Vec::new(),
            validation: None,
            install: None,
            enhancements: None,
            configuration: None,
            observer,
        }
    }

    fn advance(&mut self, next: SetupState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {next}",
            self.state
        );
        tracing::info!(from = %self.state, to = %next, "state transition");
        self.state = next;
        self.states.push(next);
        self.observer.stage_started(next);
    }

    fn record(&mut self, status: StageStatus, error: Option<String>) {
        self.stages.push(StageRecord {
            stage: self.state,
            status,
            error,
        });
        self.observer.stage_finished(self.state, status);
    }

    fn finish_stage(&mut self, status: StageStatus, warnings: &[String]) {
        self.warnings.extend_from_slice(warnings);
        self.record(status, None);
    }

    /// Swallow errors that only degrade functionality.
    fn contain<T>(&mut self, result: Result<T, SetupError>) -> Result<Option<T>, SetupError> {
        let error = match result {
            Ok(value) => return Ok(Some(value)),
            Err(error) => error,
        };

        match error.disposition() {
            Disposition::Degrade => {
                tracing::warn!(stage = %self.state, %error, "stage failed; continuing");
                self.warnings.push(error.to_string());
                self.record(StageStatus::Failed, Some(error.to_string()));
                Ok(None)
            }
            // Past the backup every stop goes through the restore path.
            Disposition::AbortBeforeMutation
            | Disposition::AbortAndRestore
            | Disposition::Fatal => Err(error),
        }
    }

    fn fail(&mut self, error: &SetupError) {
        tracing::error!(stage = %self.state, %error, "stage failed");
        self.record(StageStatus::Failed, Some(error.to_string()));
        self.advance(SetupState::Failed);
    }

    /// Stop before any mutation; there is nothing to restore.
    fn abort(mut self, error: &SetupError) -> SetupReport {
        self.fail(error);
        self.into_report(None, None, Some(error.to_string()), SetupOutcome::Aborted)
    }

    fn roll_back(
        mut self,
        error: &SetupError,
        store: &SnapshotStore,
        snapshot: &Snapshot,
        session: &SetupSession,
    ) -> SetupReport {
        self.fail(error);
        self.advance(SetupState::Restoring);

        match store.restore(snapshot, &session.root) {
            Ok(restore) => {
                tracing::warn!(restored = restore.restored.len(), removed = restore.removed.len(), "rolled back to snapshot");
                self.record(StageStatus::Completed, None);
                self.advance(SetupState::Restored);
                self.into_report(
                    None,
                    Some(restore),
                    Some(error.to_string()),
                    SetupOutcome::RolledBack,
                )
            }
            Err(restore_error) => {
                tracing::error!(error = %restore_error, "restore failed; project may be partially restored");
                self.record(StageStatus::Failed, Some(restore_error.to_string()));
                self.advance(SetupState::RestoreFailed);
                self.into_report(
                    None,
                    None,
                    Some(format!("{error}; {restore_error}")),
                    SetupOutcome::RestoreFailed,
                )
            }
        }
    }

    fn done(mut self, readiness: ReadinessReport) -> SetupReport {
        self.advance(SetupState::Done);
        let outcome = SetupOutcome::from(readiness.verdict);
        tracing::info!(%outcome, passed = readiness.passed, total = readiness.total, "setup finished");
        self.into_report(Some(readiness), None, None, outcome)
    }

    fn into_report(
        self,
        readiness: Option<ReadinessReport>,
        restore: Option<RestoreReport>,
        error: Option<String>,
        outcome: SetupOutcome,
    ) -> SetupReport {
        SetupReport {
            root: self.root,
            states: self.states,
            stages: self.stages,
            validation: self.validation,
            install: self.install,
            enhancements: self.enhancements,
            configuration: self.configuration,
            readiness,
            restore,
            warnings: self.warnings,
            error,
            outcome,
        }
    }
}
