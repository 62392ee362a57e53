//! Status enums and the setup state machine.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! [`SetupState`] provides `allowed_next_states()` so the orchestrator can
//! refuse transitions the pipeline does not define.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SetupState
// ---------------------------------------------------------------------------

/// State of one setup run.
///
/// ```text
/// validating → backing_up → installing_deps → resolving_enhancements
///            → materializing_config → probing → done
///
/// any state except done → failed → restoring → restored
///                                            → restore_failed
/// ```
///
/// `failed` is also terminal when it is entered before anything was mutated
/// (validation or backup failure); the orchestrator then skips `restoring`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupState {
    Validating,
    BackingUp,
    InstallingDeps,
    ResolvingEnhancements,
    MaterializingConfig,
    Probing,
    Done,
    Failed,
    Restoring,
    Restored,
    RestoreFailed,
}

impl SetupState {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Validating => &[Self::BackingUp, Self::Failed],
            Self::BackingUp => &[Self::InstallingDeps, Self::Failed],
            Self::InstallingDeps => &[Self::ResolvingEnhancements, Self::Failed],
            Self::ResolvingEnhancements => &[Self::MaterializingConfig, Self::Failed],
            Self::MaterializingConfig => &[Self::Probing, Self::Failed],
            Self::Probing => &[Self::Done, Self::Failed],
            Self::Failed => &[Self::Restoring],
            Self::Restoring => &[Self::Restored, Self::RestoreFailed],
            Self::Done | Self::Restored | Self::RestoreFailed => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// States with no outgoing transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Restored | Self::RestoreFailed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::BackingUp => "backing_up",
            Self::InstallingDeps => "installing_deps",
            Self::ResolvingEnhancements => "resolving_enhancements",
            Self::MaterializingConfig => "materializing_config",
            Self::Probing => "probing",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Restoring => "restoring",
            Self::Restored => "restored",
            Self::RestoreFailed => "restore_failed",
        }
    }
}

impl fmt::Display for SetupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StageStatus
// ---------------------------------------------------------------------------

/// How a single stage ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Ran to completion with no contained failures.
    Completed,
    /// Ran to completion but contained at least one non-fatal failure.
    Degraded,
    /// Not run (e.g. `--skip-deps`).
    Skipped,
    /// Raised an error the stage could not contain.
    Failed,
}

impl StageStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Degraded => "degraded",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntryKind
// ---------------------------------------------------------------------------

/// Kind of one snapshot entry, recorded at save time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Regular file, copied verbatim.
    File,
    /// Directory, copied recursively and replaced wholesale on restore.
    Directory,
    /// Nothing existed at the path; restore removes whatever is there now.
    Absent,
}

impl EntryKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RestoreStatus
// ---------------------------------------------------------------------------

/// Result of a restore pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreStatus {
    /// Every snapshot entry was put back.
    Restored,
    /// No snapshot manifest exists; nothing was touched.
    Absent,
}

impl RestoreStatus {
    /// Exit code for a restore-only run.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Restored => 0,
            Self::Absent => 1,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Restored => "restored",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for RestoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EnhancementState
// ---------------------------------------------------------------------------

/// Resolution result for one enhancement module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhancementState {
    /// A real module is installed.
    Present,
    /// A stand-in from an earlier run is in place.
    Stub,
    /// The module was missing and a stand-in was written by this run.
    Synthesized,
}

impl EnhancementState {
    /// Whether calls into this enhancement can succeed.
    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Present)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Stub => "stub",
            Self::Synthesized => "synthesized",
        }
    }
}

impl fmt::Display for EnhancementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IntegrationStatus
// ---------------------------------------------------------------------------

/// Outcome of invoking the optional integration hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationStatus {
    /// Hook present and returned a truthy value.
    Integrated,
    /// Hook present but returned a falsy value.
    Partial,
    /// No integration module or no hook inside it.
    StandardMode,
    /// Hook raised; the error is reported, not propagated.
    Failed,
}

impl IntegrationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integrated => "integrated",
            Self::Partial => "partial",
            Self::StandardMode => "standard_mode",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for IntegrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Aggregate readiness judgment derived from probe results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Ready,
    Degraded,
}

impl Verdict {
    /// `Ready` iff at least `threshold` probes passed.
    #[must_use]
    pub const fn from_pass_count(passed: usize, threshold: usize) -> Self {
        if passed >= threshold {
            Self::Ready
        } else {
            Self::Degraded
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Degraded => "degraded",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SetupOutcome
// ---------------------------------------------------------------------------

/// Final result of a full pipeline run.
///
/// Exit codes: `0` ready, `1` degraded, `2` anything fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupOutcome {
    Ready,
    Degraded,
    /// Stopped before any mutation (validation or backup failure).
    Aborted,
    /// A stage failed and the snapshot was restored.
    RolledBack,
    RestoreFailed,
}

impl SetupOutcome {
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Ready => 0,
            Self::Degraded => 1,
            Self::Aborted | Self::RolledBack | Self::RestoreFailed => 2,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Degraded => "degraded",
            Self::Aborted => "aborted",
            Self::RolledBack => "rolled_back",
            Self::RestoreFailed => "restore_failed",
        }
    }
}

impl From<Verdict> for SetupOutcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Ready => Self::Ready,
            Verdict::Degraded => Self::Degraded,
        }
    }
}

impl fmt::Display for SetupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIPELINE: [SetupState; 7] = [
        SetupState::Validating,
        SetupState::BackingUp,
        SetupState::InstallingDeps,
        SetupState::ResolvingEnhancements,
        SetupState::MaterializingConfig,
        SetupState::Probing,
        SetupState::Done,
    ];

    #[test]
    fn pipeline_states_advance_in_order() {
        for pair in PIPELINE.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn pipeline_states_cannot_skip_ahead() {
        assert!(!SetupState::Validating.can_transition_to(SetupState::InstallingDeps));
        assert!(!SetupState::BackingUp.can_transition_to(SetupState::Probing));
        assert!(!SetupState::Probing.can_transition_to(SetupState::Validating));
    }

    #[test]
    fn every_non_done_pipeline_state_can_fail() {
        for state in &PIPELINE[..PIPELINE.len() - 1] {
            assert!(state.can_transition_to(SetupState::Failed), "{state}");
        }
        assert!(!SetupState::Done.can_transition_to(SetupState::Failed));
    }

    #[test]
    fn failure_path_ends_in_restore_result() {
        assert_eq!(
            SetupState::Failed.allowed_next_states(),
            &[SetupState::Restoring]
        );
        assert!(SetupState::Restoring.can_transition_to(SetupState::Restored));
        assert!(SetupState::Restoring.can_transition_to(SetupState::RestoreFailed));
        assert!(SetupState::Restored.is_terminal());
        assert!(SetupState::RestoreFailed.is_terminal());
        assert!(SetupState::Done.is_terminal());
    }

    #[test]
    fn verdict_threshold_is_inclusive() {
        assert_eq!(Verdict::from_pass_count(2, 2), Verdict::Ready);
        assert_eq!(Verdict::from_pass_count(4, 2), Verdict::Ready);
        assert_eq!(Verdict::from_pass_count(1, 2), Verdict::Degraded);
        assert_eq!(Verdict::from_pass_count(0, 2), Verdict::Degraded);
    }

    #[test]
    fn outcome_exit_codes() {
        assert_eq!(SetupOutcome::Ready.exit_code(), 0);
        assert_eq!(SetupOutcome::Degraded.exit_code(), 1);
        assert_eq!(SetupOutcome::Aborted.exit_code(), 2);
        assert_eq!(SetupOutcome::RolledBack.exit_code(), 2);
        assert_eq!(SetupOutcome::RestoreFailed.exit_code(), 2);
    }

    #[test]
    fn enums_serialize_snake_case() {
        let json = serde_json::to_string(&SetupState::ResolvingEnhancements).expect("serialize");
        assert_eq!(json, "\"resolving_enhancements\"");
        let json = serde_json::to_string(&IntegrationStatus::StandardMode).expect("serialize");
        assert_eq!(json, "\"standard_mode\"");
    }
}
