use std::path::{Path, PathBuf};

use safedocs_config::SnapshotConfig;

/// Paths for one setup invocation. Read-only once created.
#[derive(Debug, Clone)]
pub struct SetupSession {
    pub root: PathBuf,
    pub backup_root: PathBuf,
}

impl SetupSession {
    #[must_use]
    pub fn new(root: &Path, snapshot: &SnapshotConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            backup_root: root.join(&snapshot.backup_dir),
        }
    }

    /// Resolve a project-relative path.
    #[must_use]
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}
