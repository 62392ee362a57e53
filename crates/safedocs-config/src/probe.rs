//! Readiness probe settings.

use serde::{Deserialize, Serialize};

fn default_entry_module() -> String {
    "main".to_string()
}

fn default_enhancement() -> String {
    "contextual_analysis".to_string()
}

fn default_document_symbol() -> String {
    "FileProcessor".to_string()
}

fn default_ui_asset() -> String {
    "static/index.html".to_string()
}

/// At least this many probes must pass for a `ready` verdict.
const fn default_ready_threshold() -> usize {
    2
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProbeConfig {
    /// Module imported by the entry-module probe.
    #[serde(default = "default_entry_module")]
    pub entry_module: String,

    /// Logical name of the enhancement whose class the capability probe constructs.
    #[serde(default = "default_enhancement")]
    pub enhancement: String,

    /// Symbol imported from `entry_module` by the document-processing probe.
    #[serde(default = "default_document_symbol")]
    pub document_symbol: String,

    /// UI asset checked on disk, relative to the project root.
    #[serde(default = "default_ui_asset")]
    pub ui_asset: String,

    #[serde(default = "default_ready_threshold")]
    pub ready_threshold: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            entry_module: default_entry_module(),
            enhancement: default_enhancement(),
            document_symbol: default_document_symbol(),
            ui_asset: default_ui_asset(),
            ready_threshold: default_ready_threshold(),
        }
    }
}
