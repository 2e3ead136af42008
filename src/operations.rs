//! Per-file operations plugged into the dispatcher, plus the direct
//! (non-dispatched) list and delete calls.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::client::{ConfigService, VclFile};
use crate::error::{CliError, Result};
use crate::version::ensure_inactive;

/// A discovered local VCL file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    /// Path as found by the walk
    pub path: PathBuf,
    /// Remote name: the file name up to its first `.`
    pub name: String,
}

impl LocalFile {
    /// Wrap a path, deriving its logical name
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        let name = logical_name(&path);
        Self { path, name }
    }

    /// Read the file's content; never cached
    ///
    /// # Errors
    ///
    /// Returns [`CliError::FileError`] if the file cannot be read as UTF-8 text.
    pub async fn read(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CliError::FileError {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }
}

/// `vcl/includes/backends.vcl` → `backends`
#[must_use]
pub fn logical_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy())
        .and_then(|f| f.split('.').next().map(str::to_string))
        .unwrap_or_default()
}

/// What a worker produced for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOperationResult {
    /// Local path the worker was given
    pub path: PathBuf,
    /// Logical name used remotely
    pub name: String,
    /// Remote content on success, error description on failure
    pub outcome: std::result::Result<String, String>,
}

impl FileOperationResult {
    fn ok(file: &LocalFile, content: String) -> Self {
        Self {
            path: file.path.clone(),
            name: file.name.clone(),
            outcome: Ok(content),
        }
    }

    fn failed(file: &LocalFile, error: String) -> Self {
        Self {
            path: file.path.clone(),
            name: file.name.clone(),
            outcome: Err(error),
        }
    }

    /// Whether the operation failed
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    /// Remote content or error text
    #[must_use]
    pub fn content(&self) -> &str {
        match &self.outcome {
            Ok(content) | Err(content) => content,
        }
    }
}

/// Behaviour run once per discovered file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    /// Create the remote file, falling back to update
    Upload,
    /// Fetch the remote file so it can be compared locally
    FetchForDiff,
}

impl FileOperation {
    /// Run against one file; failures are captured, never returned
    pub async fn run(
        self,
        service: &dyn ConfigService,
        version: u32,
        file: &LocalFile,
    ) -> FileOperationResult {
        match self {
            Self::Upload => upload(service, version, file).await,
            Self::FetchForDiff => fetch_for_diff(service, version, file).await,
        }
    }
}

async fn upload(service: &dyn ConfigService, version: u32, file: &LocalFile) -> FileOperationResult {
    let content = match file.read().await {
        Ok(content) => content,
        Err(err) => return FileOperationResult::failed(file, format!("get local vcl error: {err}")),
    };

    match service.create_file(version, &file.name, &content).await {
        Ok(created) => FileOperationResult::ok(file, created.content),
        Err(create_err) => {
            debug!(name = %file.name, version, error = %create_err, "create failed, trying update");
            match service.update_file(version, &file.name, &content).await {
                Ok(updated) => FileOperationResult::ok(file, updated.content),
                Err(update_err) => FileOperationResult::failed(file, format!("error: {update_err}")),
            }
        }
    }
}

async fn fetch_for_diff(
    service: &dyn ConfigService,
    version: u32,
    file: &LocalFile,
) -> FileOperationResult {
    debug!(path = %file.path.display(), name = %file.name, "fetching remote vcl");
    match service.get_file(version, &file.name).await {
        Ok(remote) => FileOperationResult::ok(file, remote.content),
        Err(err) => {
            debug!(name = %file.name, error = %err, "error retrieving vcl file");
            FileOperationResult::failed(file, format!("error: {err}"))
        }
    }
}

/// Remote VCL files for `version`, sorted by name
///
/// # Errors
///
/// Surfaces the API error.
pub async fn list_files(service: &dyn ConfigService, version: u32) -> Result<Vec<VclFile>> {
    let mut files = service.list_files(version).await?;
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Delete one named remote file from an inactive version
///
/// # Errors
///
/// [`CliError::MissingArgument`] for an empty name, [`CliError::VersionActive`],
/// or the API error.
pub async fn delete_file(service: &dyn ConfigService, version: u32, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CliError::MissingArgument(
            "a VCL name is required, e.g. --name test_file".to_string(),
        ));
    }

    ensure_inactive(service, version).await?;
    service.delete_file(version, name).await
}
