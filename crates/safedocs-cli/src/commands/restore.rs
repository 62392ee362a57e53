use std::path::Path;

use safedocs_config::SetupConfig;
use safedocs_core::RestoreStatus;
use safedocs_setup::{Orchestrator, Pip, PythonRuntime, RestoreReport};

use crate::cli::GlobalFlags;
use crate::output::{self, TableView};
use crate::progress::Progress;

/// Restore the last snapshot. A missing snapshot is reported, not an error.
pub fn handle(root: &Path, config: &SetupConfig, flags: &GlobalFlags) -> anyhow::Result<i32> {
    let runtime = PythonRuntime::from_config(&config.runtime);
    let pip = Pip::new(runtime.interpreter());
    let orchestrator = Orchestrator::new(config, &runtime, &pip);

    let spinner = Progress::spinner("Restoring snapshot");
    let report = match orchestrator.restore_only(root) {
        Ok(report) => report,
        Err(error) => {
            spinner.finish_err("Restore failed");
            return Err(error.into());
        }
    };
    spinner.finish_clear();

    if report.status == RestoreStatus::Absent {
        tracing::warn!(backup_root = %report.backup_root, "nothing restored");
    }
    output::output(&report, flags.format)?;
    Ok(report.status.exit_code())
}

impl TableView for RestoreReport {
    fn headers(&self) -> Vec<&'static str> {
        vec!["path", "status"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        if self.status == RestoreStatus::Absent {
            return vec![vec![self.backup_root.clone(), "absent".to_string()]];
        }

        self.restored
            .iter()
            .map(|path| vec![path.clone(), "restored".to_string()])
            .chain(
                self.removed
                    .iter()
                    .map(|path| vec![path.clone(), "removed".to_string()]),
            )
            .collect()
    }
}
