//! Concurrent file dispatch: one worker per discovered VCL file
//!
//! This module implements the fan-out/fan-in used by `upload` and `diff`:
//! 1. Walks the root directory and keeps the paths the filter accepts
//! 2. Spawns one task per file (optionally capped by a semaphore)
//! 3. Each task sends exactly one result into a channel sized to the file count
//! 4. Waits for every task, then drains the channel in arrival order
//!
//! The discovered file list is owned by a [`DispatchSession`] and consumed by
//! [`DispatchSession::dispatch`], so nothing carries over between invocations.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::client::ConfigService;
use crate::filter::PathFilter;
use crate::operations::{FileOperation, FileOperationResult, LocalFile};

/// Files discovered under one root, ready to be dispatched
#[derive(Debug, Clone)]
pub struct DispatchSession {
    root: PathBuf,
    files: Vec<LocalFile>,
}

impl DispatchSession {
    /// Recursively collect the files under `root` that `filter` accepts
    ///
    /// Symlinks are not followed. Walk errors are logged and skipped;
    /// collection is best-effort.
    #[must_use]
    pub fn discover(root: &Path, filter: &PathFilter) -> Self {
        let mut files = Vec::new();

        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(root = %root.display(), error = %err, "error walking directory");
                    continue;
                }
            };

            if entry.file_type().is_file() && filter.accepts(entry.path()) {
                files.push(LocalFile::new(entry.into_path()));
            }
        }

        debug!(
            root = %root.display(),
            files = ?files.iter().map(|f| f.path.display().to_string()).collect::<Vec<_>>(),
            length = files.len(),
            "aggregated files"
        );

        Self {
            root: root.to_path_buf(),
            files,
        }
    }

    /// Root directory that was walked
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Discovered files, in walk order
    #[must_use]
    pub fn files(&self) -> &[LocalFile] {
        &self.files
    }

    /// Number of discovered files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing was discovered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Run `operation` on every file concurrently and collect the results
    ///
    /// Results come back in completion order, not discovery order. `limit`
    /// caps the number of workers running at once, clamped to
    /// `1..=Semaphore::MAX_PERMITS`; `None` launches them all.
    pub async fn dispatch(
        self,
        service: Arc<dyn ConfigService>,
        operation: FileOperation,
        version: u32,
        limit: Option<usize>,
    ) -> Vec<FileOperationResult> {
        let expected = self.files.len();
        if expected == 0 {
            return Vec::new();
        }

        let (tx, mut rx) = mpsc::channel(expected);
        let limiter = limit
            .map(|n| Arc::new(Semaphore::new(n.clamp(1, Semaphore::MAX_PERMITS))));
        let mut workers = JoinSet::new();

        for file in self.files {
            let tx = tx.clone();
            let service = Arc::clone(&service);
            let limiter = limiter.clone();

            let _ = workers.spawn(async move {
                // Held until the worker finishes
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };

                let result = operation.run(service.as_ref(), version, &file).await;
                if tx.send(result).await.is_err() {
                    warn!(path = %file.path.display(), "result channel closed before send");
                }
            });
        }
        drop(tx);

        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "file worker did not complete");
            }
        }

        let mut results = Vec::with_capacity(expected);
        while let Some(result) = rx.recv().await {
            results.push(result);
        }

        debug!(expected, received = results.len(), "drained result channel");
        results
    }
}
