//! Snapshot (backup) settings.

use serde::{Deserialize, Serialize};

fn default_backup_dir() -> String {
    "backup".to_string()
}

fn default_entries() -> Vec<String> {
    ["main.py", "requirements.txt", "static", ".env", "enhancements"]
        .iter()
        .map(|entry| (*entry).to_string())
        .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnapshotConfig {
    /// Backup root, relative to the project root.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,

    /// Files and directories covered by the snapshot, relative to the project root.
    #[serde(default = "default_entries")]
    pub entries: Vec<String>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            backup_dir: default_backup_dir(),
            entries: default_entries(),
        }
    }
}
