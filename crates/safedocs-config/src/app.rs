//! Runtime settings handed to the document-analysis application.
//!
//! These values are materialized once into the application's `KEY=VALUE`
//! configuration artifact. Setup itself never enforces them; for example
//! `max_analysis_time` is read by the application, not by the orchestrator.

use serde::{Deserialize, Serialize};

fn default_artifact() -> String {
    ".env".to_string()
}

fn default_api_key() -> String {
    "your_gemini_api_key_here".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

/// 10 MiB.
const fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_upload_dir() -> String {
    "storage/uploads".to_string()
}

fn default_storage_dir() -> String {
    "storage".to_string()
}

fn default_analysis_depth() -> String {
    "deep".to_string()
}

fn default_export_format() -> String {
    "pdf".to_string()
}

const fn default_max_analysis_time() -> u64 {
    300
}

fn default_log_level() -> String {
    "INFO".to_string()
}

const fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct AppSettings {
    /// Configuration artifact path, relative to the project root.
    #[serde(default = "default_artifact")]
    pub artifact: String,

    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub debug: bool,

    /// Maximum upload size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,

    #[serde(default = "default_analysis_depth")]
    pub analysis_depth: String,
    #[serde(default = "enabled")]
    pub enable_contextual_analysis: bool,
    #[serde(default = "enabled")]
    pub enable_kz_legal_check: bool,
    #[serde(default = "enabled")]
    pub enable_entity_detection: bool,

    #[serde(default = "enabled")]
    pub enable_pdf_export: bool,
    #[serde(default = "enabled")]
    pub enable_docx_export: bool,
    #[serde(default = "default_export_format")]
    pub default_export_format: String,

    #[serde(default)]
    pub enable_virus_scan: bool,
    /// Seconds; enforced by the application.
    #[serde(default = "default_max_analysis_time")]
    pub max_analysis_time: u64,
    #[serde(default = "enabled")]
    pub rate_limit_enabled: bool,

    #[serde(default)]
    pub enable_analytics: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Python-style boolean literal, as read by the application's dotenv loader.
const fn flag(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

impl AppSettings {
    /// The full template in artifact order.
    #[must_use]
    pub fn template_entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("GEMINI_API_KEY", self.api_key.clone()),
            ("HOST", self.host.clone()),
            ("PORT", self.port.to_string()),
            ("DEBUG", flag(self.debug).to_string()),
            ("MAX_FILE_SIZE", self.max_file_size.to_string()),
            ("UPLOAD_DIR", self.upload_dir.clone()),
            ("STORAGE_DIR", self.storage_dir.clone()),
            ("ANALYSIS_DEPTH", self.analysis_depth.clone()),
            (
                "ENABLE_CONTEXTUAL_ANALYSIS",
                flag(self.enable_contextual_analysis).to_string(),
            ),
            (
                "ENABLE_KZ_LEGAL_CHECK",
                flag(self.enable_kz_legal_check).to_string(),
            ),
            (
                "ENABLE_ENTITY_DETECTION",
                flag(self.enable_entity_detection).to_string(),
            ),
            ("ENABLE_PDF_EXPORT", flag(self.enable_pdf_export).to_string()),
            ("ENABLE_DOCX_EXPORT", flag(self.enable_docx_export).to_string()),
            ("DEFAULT_EXPORT_FORMAT", self.default_export_format.clone()),
            ("ENABLE_VIRUS_SCAN", flag(self.enable_virus_scan).to_string()),
            ("MAX_ANALYSIS_TIME", self.max_analysis_time.to_string()),
            ("RATE_LIMIT_ENABLED", flag(self.rate_limit_enabled).to_string()),
            ("ENABLE_ANALYTICS", flag(self.enable_analytics).to_string()),
            ("LOG_LEVEL", self.log_level.clone()),
        ]
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            artifact: default_artifact(),
            api_key: default_api_key(),
            host: default_host(),
            port: default_port(),
            debug: false,
            max_file_size: default_max_file_size(),
            upload_dir: default_upload_dir(),
            storage_dir: default_storage_dir(),
            analysis_depth: default_analysis_depth(),
            enable_contextual_analysis: true,
            enable_kz_legal_check: true,
            enable_entity_detection: true,
            enable_pdf_export: true,
            enable_docx_export: true,
            default_export_format: default_export_format(),
            enable_virus_scan: false,
            max_analysis_time: default_max_analysis_time(),
            rate_limit_enabled: true,
            enable_analytics: false,
            log_level: default_log_level(),
        }
    }
}

fn default_directories() -> Vec<String> {
    [
        "storage",
        "storage/uploads",
        "storage/documents",
        "static",
        "logs",
        "exports",
    ]
    .iter()
    .map(|dir| (*dir).to_string())
    .collect()
}

/// Directory layout created (if absent) alongside the configuration artifact.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LayoutConfig {
    #[serde(default = "default_directories")]
    pub directories: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            directories: default_directories(),
        }
    }
}
