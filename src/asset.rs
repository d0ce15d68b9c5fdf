//! Temporary assets with tracked lifecycles.
//!
//! Every file the pipeline puts on temporary storage is wrapped in a
//! [`TempAsset`] so the cleanup phase can prove the invariant: each
//! asset created during a run reaches `Deleted` before cleanup
//! returns, success or failure.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Lifecycle flag of a temporary asset.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AssetLifecycle {
    /// Path allocated for this run; the producing phase may not have
    /// written the file yet.
    Created,
    /// The consuming phase has read the file.
    Consumed,
    /// The file (if it ever existed) has been removed from storage.
    Deleted,
}

/// A filesystem path owned by one pipeline run.
#[derive(Debug)]
pub struct TempAsset {
    path: PathBuf,
    lifecycle: AssetLifecycle,
}

impl TempAsset {
    /// Allocate an asset at `path`. The file itself is written by the
    /// producing phase (host export, or the external tool).
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lifecycle: AssetLifecycle::Created,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lifecycle(&self) -> AssetLifecycle {
        self.lifecycle
    }

    /// Record that the consuming phase has read this file.
    pub fn mark_consumed(&mut self) {
        if self.lifecycle == AssetLifecycle::Created {
            self.lifecycle = AssetLifecycle::Consumed;
        }
    }

    /// Whether a non-empty file currently exists at the path.
    pub fn is_non_empty_file(&self) -> bool {
        fs::metadata(&self.path).map(|m| m.is_file() && m.len() > 0).unwrap_or(false)
    }

    /// Remove the file from storage. Idempotent: deleting an asset
    /// whose file never existed (or was already deleted) succeeds.
    pub fn delete(&mut self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        self.lifecycle = AssetLifecycle::Deleted;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_transitions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut asset = TempAsset::new(dir.path().join("input.obj"));
        assert_eq!(asset.lifecycle(), AssetLifecycle::Created);
        assert!(!asset.is_non_empty_file());

        fs::write(asset.path(), "v 0 0 0\n").expect("write");
        assert!(asset.is_non_empty_file());

        asset.mark_consumed();
        assert_eq!(asset.lifecycle(), AssetLifecycle::Consumed);

        asset.delete().expect("delete");
        assert_eq!(asset.lifecycle(), AssetLifecycle::Deleted);
        assert!(!asset.path().exists());
    }

    #[test]
    fn delete_tolerates_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut asset = TempAsset::new(dir.path().join("never-written.obj"));
        asset.delete().expect("first delete");
        asset.delete().expect("second delete");
        assert_eq!(asset.lifecycle(), AssetLifecycle::Deleted);
    }

    #[test]
    fn consumed_then_deleted_stays_deleted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut asset = TempAsset::new(dir.path().join("out.obj"));
        asset.delete().expect("delete");
        asset.mark_consumed();
        assert_eq!(asset.lifecycle(), AssetLifecycle::Deleted);
    }
}
