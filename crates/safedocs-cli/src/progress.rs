use std::cell::RefCell;

use indicatif::{ProgressBar, ProgressStyle};
use safedocs_core::{SetupState, StageStatus};
use safedocs_setup::StageObserver;

use crate::ui;

pub struct Progress {
    bar: Option<ProgressBar>,
}

impl Progress {
    #[must_use]
    pub fn spinner(message: &str) -> Self {
        if !ui::prefs().progress {
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        Self { bar: Some(bar) }
    }

    pub fn finish_ok(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message(message.to_string());
        }
    }

    pub fn finish_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    pub fn finish_err(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.abandon_with_message(message.to_string());
        }
    }
}

/// Human label for a pipeline state.
#[must_use]
pub const fn stage_label(state: SetupState) -> &'static str {
    match state {
        SetupState::Validating => "Validating environment",
        SetupState::BackingUp => "Backing up project files",
        SetupState::InstallingDeps => "Installing dependencies",
        SetupState::ResolvingEnhancements => "Resolving enhancements",
        SetupState::MaterializingConfig => "Writing configuration",
        SetupState::Probing => "Running readiness probes",
        SetupState::Done => "Done",
        SetupState::Failed => "Failed",
        SetupState::Restoring => "Restoring snapshot",
        SetupState::Restored => "Restored",
        SetupState::RestoreFailed => "Restore failed",
    }
}

/// One spinner per stage.
#[derive(Default)]
pub struct StageProgress {
    current: RefCell<Option<Progress>>,
}

impl StageObserver for StageProgress {
    fn stage_started(&self, state: SetupState) {
        if state.is_terminal() || state == SetupState::Failed {
            return;
        }
        if let Some(previous) = self.current.replace(Some(Progress::spinner(stage_label(state)))) {
            previous.finish_clear();
        }
    }

    fn stage_finished(&self, state: SetupState, status: StageStatus) {
        let Some(progress) = self.current.take() else {
            return;
        };
        let message = format!("{} ({status})", stage_label(state));
        match status {
            StageStatus::Failed => progress.finish_err(&message),
            StageStatus::Completed | StageStatus::Degraded | StageStatus::Skipped => {
                progress.finish_ok(&message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_is_inert_without_progress_prefs() {
        let progress = Progress::spinner("Validating environment");
        assert!(progress.bar.is_none());
        progress.finish_ok("done");
    }

    #[test]
    fn stage_observer_tracks_one_spinner_at_a_time() {
        let observer = StageProgress::default();
        observer.stage_started(SetupState::Validating);
        assert!(observer.current.borrow().is_some());

        observer.stage_finished(SetupState::Validating, StageStatus::Completed);
        assert!(observer.current.borrow().is_none());

        observer.stage_started(SetupState::Done);
        assert!(observer.current.borrow().is_none());
    }

    #[test]
    fn every_state_has_a_label() {
        assert_eq!(stage_label(SetupState::InstallingDeps), "Installing dependencies");
        assert_eq!(stage_label(SetupState::RestoreFailed), "Restore failed");
    }
}
