//! Readiness probe results and their aggregate verdict.

use serde::{Deserialize, Serialize};

use crate::enums::Verdict;

/// Outcome of a single smoke probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub name: String,
    pub passed: bool,
    /// Why the probe failed, when it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProbeResult {
    #[must_use]
    pub fn pass(name: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            detail: None,
        }
    }

    #[must_use]
    pub fn fail(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            detail: Some(detail.into()),
        }
    }
}

/// Probe results in execution order plus the derived verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub probes: Vec<ProbeResult>,
    pub passed: usize,
    pub total: usize,
    pub threshold: usize,
    pub verdict: Verdict,
}

impl ReadinessReport {
    #[must_use]
    pub fn from_results(probes: Vec<ProbeResult>, threshold: usize) -> Self {
        let passed = probes.iter().filter(|probe| probe.passed).count();
        let total = probes.len();
        Self {
            probes,
            passed,
            total,
            threshold,
            verdict: Verdict::from_pass_count(passed, threshold),
        }
    }

    /// Look up a probe by name.
    #[must_use]
    pub fn probe(&self, name: &str) -> Option<&ProbeResult> {
        self.probes.iter().find(|probe| probe.name == name)
    }
}
