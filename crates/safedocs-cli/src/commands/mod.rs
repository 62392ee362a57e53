pub mod restore;
pub mod setup;
pub mod test_only;

use safedocs_core::ReadinessReport;

use crate::output::TableView;

/// Probe rows followed by the verdict line.
fn readiness_rows(report: &ReadinessReport) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = report
        .probes
        .iter()
        .map(|probe| {
            vec![
                format!("probe {}", probe.name),
                if probe.passed { "pass" } else { "fail" }.to_string(),
                probe.detail.clone().unwrap_or_default(),
            ]
        })
        .collect();
    rows.push(vec![
        "verdict".to_string(),
        report.verdict.to_string(),
        format!("{}/{} passed, {} required", report.passed, report.total, report.threshold),
    ]);
    rows
}

impl TableView for ReadinessReport {
    fn headers(&self) -> Vec<&'static str> {
        vec!["item", "status", "detail"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        readiness_rows(self)
    }
}
