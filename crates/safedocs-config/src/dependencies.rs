//! Dependency manifest settings.

use serde::{Deserialize, Serialize};

/// One pinned `name==version` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PackagePin {
    pub name: String,
    pub version: String,
}

/// A package installed on a best-effort basis after the pinned set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OptionalPackage {
    pub name: String,
    pub description: String,
}

fn default_manifest() -> String {
    "requirements.txt".to_string()
}

fn default_pins() -> Vec<PackagePin> {
    [
        ("fastapi", "0.104.1"),
        ("uvicorn", "0.24.0"),
        ("python-multipart", "0.0.6"),
        ("pydantic", "2.5.0"),
        ("python-dotenv", "1.0.0"),
        ("PyPDF2", "3.0.1"),
        ("pytesseract", "0.3.10"),
        ("Pillow", "10.1.0"),
        ("aiofiles", "23.2.1"),
    ]
    .iter()
    .map(|(name, version)| PackagePin {
        name: (*name).to_string(),
        version: (*version).to_string(),
    })
    .collect()
}

fn default_optional() -> Vec<OptionalPackage> {
    [
        ("spacy", "entity detection"),
        ("transformers", "contextual analysis models"),
        ("reportlab", "PDF export"),
        ("python-docx", "DOCX export"),
    ]
    .iter()
    .map(|(name, description)| OptionalPackage {
        name: (*name).to_string(),
        description: (*description).to_string(),
    })
    .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DependencyConfig {
    /// Manifest path, relative to the project root. Always overwritten.
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// Pinned packages, written and installed in order.
    #[serde(default = "default_pins")]
    pub pins: Vec<PackagePin>,

    /// Packages attempted one by one after the pinned set.
    #[serde(default = "default_optional")]
    pub optional: Vec<OptionalPackage>,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            pins: default_pins(),
            optional: default_optional(),
        }
    }
}
