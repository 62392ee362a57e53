use std::path::Path;

use safedocs_config::SetupConfig;
use safedocs_core::Verdict;
use safedocs_setup::{Orchestrator, Pip, PythonRuntime};

use crate::cli::GlobalFlags;
use crate::output;
use crate::progress::Progress;

/// Run the readiness probes only. Exit `0` when ready, `1` when degraded.
pub fn handle(root: &Path, config: &SetupConfig, flags: &GlobalFlags) -> anyhow::Result<i32> {
    let runtime = PythonRuntime::from_config(&config.runtime);
    let pip = Pip::new(runtime.interpreter());
    let orchestrator = Orchestrator::new(config, &runtime, &pip);

    let spinner = Progress::spinner("Running readiness probes");
    let report = orchestrator.probe_only(root);
    spinner.finish_clear();

    output::output(&report, flags.format)?;
    Ok(match report.verdict {
        Verdict::Ready => 0,
        Verdict::Degraded => 1,
    })
}
