use std::path::Path;

use safedocs_config::SetupConfig;
use safedocs_setup::{Orchestrator, Pip, PythonRuntime, SetupOptions, SetupReport};

use crate::cli::GlobalFlags;
use crate::commands::readiness_rows;
use crate::output::{self, TableView};
use crate::progress::StageProgress;

/// Run the full pipeline. The exit code follows the outcome.
pub fn handle(
    root: &Path,
    config: &SetupConfig,
    flags: &GlobalFlags,
    skip_deps: bool,
) -> anyhow::Result<i32> {
    let runtime = PythonRuntime::from_config(&config.runtime);
    let pip = Pip::new(runtime.interpreter());
    let progress = StageProgress::default();

    let report = Orchestrator::new(config, &runtime, &pip)
        .with_observer(&progress)
        .run(root, SetupOptions { skip_deps });

    if let Some(error) = &report.error {
        tracing::error!(outcome = %report.outcome, %error, "setup did not complete");
    }
    output::output(&report, flags.format)?;
    Ok(report.outcome.exit_code())
}

impl TableView for SetupReport {
    fn headers(&self) -> Vec<&'static str> {
        vec!["item", "status", "detail"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        let mut rows: Vec<Vec<String>> = self
            .stages
            .iter()
            .map(|record| {
                vec![
                    record.stage.to_string(),
                    record.status.to_string(),
                    record.error.clone().unwrap_or_default(),
                ]
            })
            .collect();

        if let Some(enhancements) = &self.enhancements {
            rows.extend(enhancements.modules.iter().map(|module| {
                vec![
                    format!("enhancement {}", module.name),
                    module.state.to_string(),
                    String::new(),
                ]
            }));
            rows.push(vec![
                "integration".to_string(),
                enhancements.integration.status.to_string(),
                enhancements.integration.detail.clone().unwrap_or_default(),
            ]);
        }

        if let Some(readiness) = &self.readiness {
            rows.extend(readiness_rows(readiness));
        }

        rows.extend(
            self.warnings
                .iter()
                .map(|warning| vec!["warning".to_string(), String::new(), warning.clone()]),
        );
        rows.push(vec![
            "outcome".to_string(),
            self.outcome.to_string(),
            self.error.clone().unwrap_or_default(),
        ]);
        rows
    }
}
