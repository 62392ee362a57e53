//! Readiness smoke probes.
//!
//! Probes are independent and never error: anything that goes wrong inside a
//! probe is recorded as a failed [`ProbeResult`] with a short detail.

use safedocs_config::{EnhancementConfig, SetupConfig};
use safedocs_core::{ProbeResult, ReadinessReport};

use crate::runtime::Runtime;
use crate::session::SetupSession;

pub const ENTRY_MODULE: &str = "entry_module";
pub const ENHANCEMENT_CAPABILITY: &str = "enhancement_capability";
pub const DOCUMENT_PROCESSING: &str = "document_processing";
pub const UI_ASSET: &str = "ui_asset";

/// Run every probe and aggregate against the configured threshold.
#[must_use]
pub fn probe(session: &SetupSession, config: &SetupConfig, runtime: &dyn Runtime) -> ReadinessReport {
    let probes = vec![
        entry_module(session, &config.probe.entry_module, runtime),
        enhancement_capability(session, &config.enhancements, &config.probe.enhancement, runtime),
        document_processing(
            session,
            &config.probe.entry_module,
            &config.probe.document_symbol,
            runtime,
        ),
        ui_asset(session, &config.probe.ui_asset),
    ];

    for result in &probes {
        match &result.detail {
            None => tracing::info!(probe = %result.name, "probe passed"),
            Some(detail) => tracing::warn!(probe = %result.name, %detail, "probe failed"),
        }
    }

    let report = ReadinessReport::from_results(probes, config.probe.ready_threshold);
    tracing::info!(
        passed = report.passed,
        total = report.total,
        verdict = %report.verdict,
        "readiness"
    );
    report
}

/// Run `code` and turn a clean exit into a pass.
fn run_probe(name: &str, session: &SetupSession, code: &str, runtime: &dyn Runtime) -> ProbeResult {
    match runtime.run_snippet(&session.root, code, &[]) {
        Ok(output) if output.success => ProbeResult::pass(name),
        Ok(output) => ProbeResult::fail(name, output.failure_summary()),
        Err(error) => ProbeResult::fail(name, error.to_string()),
    }
}

fn entry_module(session: &SetupSession, module: &str, runtime: &dyn Runtime) -> ProbeResult {
    let code = format!("import importlib\nimportlib.import_module({module:?})");
    run_probe(ENTRY_MODULE, session, &code, runtime)
}

/// Construct the enhancement class. Stand-ins construct fine, so this passes
/// as long as the module is importable.
fn enhancement_capability(
    session: &SetupSession,
    config: &EnhancementConfig,
    name: &str,
    runtime: &dyn Runtime,
) -> ProbeResult {
    let Some(descriptor) = config.descriptor(name) else {
        return ProbeResult::fail(ENHANCEMENT_CAPABILITY, format!("unknown enhancement '{name}'"));
    };
    let package = config.dir.trim_matches('/').replace('/', ".");
    let code = format!(
        "from {package}.{} import {}\n{}()",
        descriptor.module, descriptor.class, descriptor.class
    );
    run_probe(ENHANCEMENT_CAPABILITY, session, &code, runtime)
}

fn document_processing(
    session: &SetupSession,
    module: &str,
    symbol: &str,
    runtime: &dyn Runtime,
) -> ProbeResult {
    let code = format!("from {module} import {symbol}");
    run_probe(DOCUMENT_PROCESSING, session, &code, runtime)
}

fn ui_asset(session: &SetupSession, asset: &str) -> ProbeResult {
    let path = session.path(asset);
    if path.is_file() {
        ProbeResult::pass(UI_ASSET)
    } else {
        ProbeResult::fail(UI_ASSET, format!("{} not found", path.display()))
    }
}
