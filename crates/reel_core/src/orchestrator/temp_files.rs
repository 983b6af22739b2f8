//! Registry of a session's intermediate files.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

/// Paths a session created, or is about to create, on disk.
///
/// Paths are registered before the first byte is written so partially
/// written files are removed too. Everything still registered is deleted
/// by [`TempFiles::cleanup`] and again when the registry is dropped.
#[derive(Debug, Default)]
pub struct TempFiles {
    paths: Mutex<BTreeSet<PathBuf>>,
}

impl TempFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path for removal and return it.
    pub fn register(&self, path: impl Into<PathBuf>) -> PathBuf {
        let path = path.into();
        self.paths.lock().insert(path.clone());
        path
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.lock().contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.lock().is_empty()
    }

    /// Delete every registered path.
    ///
    /// Files that never got created are skipped. Returns the paths that were
    /// actually removed; paths that failed to delete stay registered.
    pub async fn cleanup(&self) -> Vec<PathBuf> {
        let mut removed = Vec::new();
        for path in self.take() {
            let result = tokio::fs::remove_file(&path).await;
            self.settle(path, result, &mut removed);
        }
        removed
    }

    /// Blocking variant of [`TempFiles::cleanup`] for use outside a runtime.
    fn cleanup_blocking(&self) -> Vec<PathBuf> {
        let mut removed = Vec::new();
        for path in self.take() {
            let result = std::fs::remove_file(&path);
            self.settle(path, result, &mut removed);
        }
        removed
    }

    fn take(&self) -> Vec<PathBuf> {
        std::mem::take(&mut *self.paths.lock())
            .into_iter()
            .collect()
    }

    fn settle(&self, path: PathBuf, result: io::Result<()>, removed: &mut Vec<PathBuf>) {
        match result {
            Ok(()) => removed.push(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!("Failed to remove {}: {}", path.display(), e);
                self.paths.lock().insert(path);
            }
        }
    }
}

impl Drop for TempFiles {
    // Runs after a panic or an early return too. Usually empty by now.
    fn drop(&mut self) {
        let removed = self.cleanup_blocking();
        if !removed.is_empty() {
            tracing::debug!("Removed {} leftover temp files on drop", removed.len());
        }
    }
}
