//! Copy-based snapshot of a fixed set of project paths.
//!
//! The backup root mirrors the covered entries and holds a `snapshot.json`
//! manifest. The manifest is removed at the start of [`SnapshotStore::save`]
//! and written last, so an interrupted save leaves no manifest and a later
//! restore reports the snapshot as absent instead of applying a partial copy.
//! Copies are not transactional: a crash during restore can leave the project
//! partially restored.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use safedocs_core::{EntryKind, RestoreStatus};

use crate::error::SetupError;
use crate::session::SetupSession;

pub const MANIFEST_FILE: &str = "snapshot.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Path relative to the project root.
    pub path: String,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub created_at: DateTime<Utc>,
    pub entries: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    pub status: RestoreStatus,
    pub backup_root: String,
    pub restored: Vec<String>,
    pub removed: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    backup_root: PathBuf,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(backup_root: impl Into<PathBuf>) -> Self {
        Self {
            backup_root: backup_root.into(),
        }
    }

    #[must_use]
    pub fn for_session(session: &SetupSession) -> Self {
        Self::new(session.backup_root.clone())
    }

    #[must_use]
    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    fn manifest_path(&self) -> PathBuf {
        self.backup_root.join(MANIFEST_FILE)
    }

    /// Copy each named path under `root` into the backup root.
    ///
    /// Re-running overwrites the previous backup: stale copies of an entry are
    /// removed before the entry is copied again.
    pub fn save(&self, root: &Path, names: &[String]) -> Result<Snapshot, SetupError> {
        let save_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| SetupError::Snapshot { path, source }
        };

        fs::create_dir_all(&self.backup_root).map_err(save_err(&self.backup_root))?;
        let manifest = self.manifest_path();
        remove_path(&manifest).map_err(save_err(&manifest))?;

        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let source = root.join(name);
            let target = self.backup_root.join(name);
            remove_path(&target).map_err(save_err(&target))?;

            let kind = match fs::symlink_metadata(&source) {
                Ok(metadata) if metadata.is_dir() => {
                    copy_tree(&source, &target).map_err(save_err(&source))?;
                    EntryKind::Directory
                }
                Ok(_) => {
                    copy_file(&source, &target).map_err(save_err(&source))?;
                    EntryKind::File
                }
                Err(error) if error.kind() == ErrorKind::NotFound => EntryKind::Absent,
                Err(error) => return Err(save_err(&source)(error)),
            };

            tracing::debug!(entry = %name, %kind, "snapshot entry saved");
            entries.push(SnapshotEntry {
                path: name.clone(),
                kind,
            });
        }

        let snapshot = Snapshot {
            created_at: Utc::now(),
            entries,
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&manifest, json).map_err(save_err(&manifest))?;

        tracing::info!(
            backup_root = %self.backup_root.display(),
            entries = snapshot.entries.len(),
            "snapshot saved"
        );
        Ok(snapshot)
    }

    /// Read the manifest, if a complete snapshot exists.
    pub fn load(&self) -> Result<Option<Snapshot>, SetupError> {
        let manifest = self.manifest_path();
        match fs::read_to_string(&manifest) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(SetupError::io(manifest, error)),
        }
    }

    /// Restore from the manifest on disk; reports `absent` when there is none.
    pub fn restore_latest(&self, root: &Path) -> Result<RestoreReport, SetupError> {
        match self.load() {
            Ok(Some(snapshot)) => self.restore(&snapshot, root),
            Ok(None) => {
                tracing::warn!(backup_root = %self.backup_root.display(), "no snapshot to restore");
                Ok(self.report(RestoreStatus::Absent))
            }
            Err(error) => Err(SetupError::Restore {
                path: self.manifest_path(),
                reason: error.to_string(),
            }),
        }
    }

    /// Put every snapshot entry back under `root`.
    ///
    /// Directories are replaced, never merged: the live directory is removed
    /// before the backup copy is written in its place.
    pub fn restore(&self, snapshot: &Snapshot, root: &Path) -> Result<RestoreReport, SetupError> {
        let restore_err = |path: &Path| {
            let path = path.to_path_buf();
            move |error: std::io::Error| SetupError::Restore {
                path,
                reason: error.to_string(),
            }
        };

        let mut report = self.report(RestoreStatus::Restored);
        for entry in &snapshot.entries {
            let target = root.join(&entry.path);
            let backup = self.backup_root.join(&entry.path);

            match entry.kind {
                EntryKind::File => {
                    if fs::symlink_metadata(&backup).is_err() {
                        return Err(SetupError::Restore {
                            path: backup,
                            reason: "backup copy is missing".to_string(),
                        });
                    }
                    remove_path(&target).map_err(restore_err(&target))?;
                    copy_file(&backup, &target).map_err(restore_err(&backup))?;
                    report.restored.push(entry.path.clone());
                }
                EntryKind::Directory => {
                    if !backup.is_dir() {
                        return Err(SetupError::Restore {
                            path: backup,
                            reason: "backup copy is missing".to_string(),
                        });
                    }
                    remove_path(&target).map_err(restore_err(&target))?;
                    copy_tree(&backup, &target).map_err(restore_err(&backup))?;
                    report.restored.push(entry.path.clone());
                }
                EntryKind::Absent => {
                    if fs::symlink_metadata(&target).is_ok() {
                        remove_path(&target).map_err(restore_err(&target))?;
                        report.removed.push(entry.path.clone());
                    }
                }
            }
        }

        tracing::info!(
            restored = report.restored.len(),
            removed = report.removed.len(),
            "snapshot restored"
        );
        Ok(report)
    }

    fn report(&self, status: RestoreStatus) -> RestoreReport {
        RestoreReport {
            status,
            backup_root: self.backup_root.to_string_lossy().to_string(),
            restored: Vec::new(),
            removed: Vec::new(),
        }
    }
}

/// Remove a file, symlink or directory tree. Missing paths are fine.
fn remove_path(path: &Path) -> std::io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
        Err(error) => Err(error),
    }
}

fn copy_tree(src: &Path, dst: &Path) -> std::io::Result<()> {
    let metadata = fs::symlink_metadata(src)?;

    if metadata.is_dir() {
        fs::create_dir_all(dst)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_tree(&entry.path(), &dst.join(entry.file_name()))?;
        }
        fs::set_permissions(dst, metadata.permissions())?;
        return Ok(());
    }

    copy_file(src, dst)
}

/// Copy one file (or symlink) keeping permissions and modification time.
fn copy_file(src: &Path, dst: &Path) -> std::io::Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }

    let metadata = fs::symlink_metadata(src)?;

    #[cfg(unix)]
    if metadata.file_type().is_symlink() {
        remove_path(dst)?;
        let target = fs::read_link(src)?;
        return std::os::unix::fs::symlink(target, dst);
    }

    fs::copy(src, dst)?;
    if let Ok(modified) = metadata.modified() {
        if let Err(error) = fs::File::open(dst).and_then(|file| file.set_modified(modified)) {
            tracing::debug!(path = %dst.display(), %error, "could not preserve modification time");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, contents).expect("write");
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| (*item).to_string()).collect()
    }

    #[test]
    fn save_records_kinds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        write(&root.join("main.py"), "print('hi')");
        write(&root.join("static/index.html"), "<html>");

        let store = SnapshotStore::new(root.join("backup"));
        let snapshot = store
            .save(root, &names(&["main.py", "static", ".env"]))
            .expect("save");

        let kinds: Vec<(&str, EntryKind)> = snapshot
            .entries
            .iter()
            .map(|entry| (entry.path.as_str(), entry.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("main.py", EntryKind::File),
                ("static", EntryKind::Directory),
                (".env", EntryKind::Absent),
            ]
        );
        assert!(root.join("backup/static/index.html").is_file());
        assert!(root.join("backup").join(MANIFEST_FILE).is_file());
    }

    #[test]
    fn resave_overwrites_previous_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        write(&root.join("static/old.css"), "old");

        let store = SnapshotStore::new(root.join("backup"));
        store.save(root, &names(&["static"])).expect("first save");

        fs::remove_file(root.join("static/old.css")).expect("rm");
        write(&root.join("static/new.css"), "new");
        store.save(root, &names(&["static"])).expect("second save");

        assert!(!root.join("backup/static/old.css").exists());
        assert!(root.join("backup/static/new.css").is_file());
    }

    #[test]
    fn restore_without_manifest_reports_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path().join("backup"));

        let report = store.restore_latest(dir.path()).expect("no-op");
        assert_eq!(report.status, RestoreStatus::Absent);
        assert!(report.restored.is_empty());
    }

    #[test]
    fn restore_removes_entries_absent_at_save_time() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        let store = SnapshotStore::new(root.join("backup"));
        let snapshot = store.save(root, &names(&[".env"])).expect("save");

        write(&root.join(".env"), "PORT=1");
        let report = store.restore(&snapshot, root).expect("restore");

        assert!(!root.join(".env").exists());
        assert_eq!(report.removed, vec![".env".to_string()]);
    }

    #[test]
    fn restore_replaces_file_turned_into_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        write(&root.join("main.py"), "original");
        let store = SnapshotStore::new(root.join("backup"));
        let snapshot = store.save(root, &names(&["main.py"])).expect("save");

        fs::remove_file(root.join("main.py")).expect("rm");
        write(&root.join("main.py/inner"), "junk");
        store.restore(&snapshot, root).expect("restore");

        assert_eq!(
            fs::read_to_string(root.join("main.py")).expect("read"),
            "original"
        );
    }

    #[test]
    fn restore_fails_when_backup_copy_vanished() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        write(&root.join("static/index.html"), "<html>");
        let store = SnapshotStore::new(root.join("backup"));
        let snapshot = store.save(root, &names(&["static"])).expect("save");

        fs::remove_dir_all(root.join("backup/static")).expect("rm backup");
        let error = store.restore(&snapshot, root).expect_err("must fail");
        assert!(matches!(error, SetupError::Restore { .. }));
        // The live directory is left alone when its backup copy is gone.
        assert!(root.join("static/index.html").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn copy_preserves_modification_time() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        let source = root.join("main.py");
        write(&source, "x");
        let past = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        fs::File::options()
            .write(true)
            .open(&source)
            .and_then(|file| file.set_modified(past))
            .expect("set mtime");

        copy_file(&source, &root.join("copy.py")).expect("copy");
        let copied = fs::metadata(root.join("copy.py"))
            .and_then(|m| m.modified())
            .expect("mtime");
        assert_eq!(copied, past);
    }

    #[test]
    fn corrupt_manifest_is_a_restore_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        write(&root.join("backup").join(MANIFEST_FILE), "{not json");
        let store = SnapshotStore::new(root.join("backup"));

        assert!(matches!(
            store.restore_latest(root),
            Err(SetupError::Restore { .. })
        ));
    }
}
