//! Optional enhancement modules and the integration hook.

use serde::{Deserialize, Serialize};

/// One optional enhancement module and the capability surface a stand-in must mirror.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnhancementDescriptor {
    /// Logical name, used in reports and probes.
    pub name: String,
    /// Module name inside the enhancements directory (without `.py`).
    pub module: String,
    /// Class exposing the capabilities.
    pub class: String,
    /// Method names on `class`.
    pub capabilities: Vec<String>,
}

impl EnhancementDescriptor {
    /// File name of the module inside the enhancements directory.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.py", self.module)
    }
}

fn default_dir() -> String {
    "enhancements".to_string()
}

fn default_modules() -> Vec<EnhancementDescriptor> {
    let descriptor = |name: &str, module: &str, class: &str, capabilities: &[&str]| {
        EnhancementDescriptor {
            name: name.to_string(),
            module: module.to_string(),
            class: class.to_string(),
            capabilities: capabilities.iter().map(|c| (*c).to_string()).collect(),
        }
    };

    vec![
        descriptor(
            "contextual_analysis",
            "contextual_analyzer",
            "ContextualAnalyzer",
            &["analyze_context", "score_clauses"],
        ),
        descriptor(
            "kz_legal_check",
            "kz_legal_checker",
            "KazakhstanLegalChecker",
            &["check_compliance", "find_violations"],
        ),
        descriptor(
            "entity_detection",
            "entity_detector",
            "EntityDetector",
            &["extract_entities"],
        ),
        descriptor(
            "document_export",
            "document_exporter",
            "DocumentExporter",
            &["export_pdf", "export_docx"],
        ),
    ]
}

fn default_integration_module() -> String {
    "integration".to_string()
}

fn default_integration_hook() -> String {
    "integrate_enhancements".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnhancementConfig {
    /// Directory holding enhancement modules, relative to the project root.
    #[serde(default = "default_dir")]
    pub dir: String,

    #[serde(default = "default_modules")]
    pub modules: Vec<EnhancementDescriptor>,

    /// Optional module providing the integration hook.
    #[serde(default = "default_integration_module")]
    pub integration_module: String,

    /// Function inside `integration_module` called once after resolution.
    #[serde(default = "default_integration_hook")]
    pub integration_hook: String,
}

impl EnhancementConfig {
    /// Find a descriptor by logical name.
    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<&EnhancementDescriptor> {
        self.modules.iter().find(|module| module.name == name)
    }
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            modules: default_modules(),
            integration_module: default_integration_module(),
            integration_hook: default_integration_hook(),
        }
    }
}
