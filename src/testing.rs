//! In-memory `ConfigService` used by unit tests

#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::client::{ConfigService, ServiceVersion, ValidationReport, VclFile, VersionSettings};
use crate::error::{CliError, Result};

/// Every call made against the double, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListVersions,
    GetVersion(u32),
    CloneVersion(u32),
    ActivateVersion(u32),
    ValidateVersion(u32),
    GetSettings(u32),
    ListFiles(u32),
    GetFile(u32, String),
    CreateFile(u32, String),
    UpdateFile(u32, String),
    DeleteFile(u32, String),
}

#[derive(Debug, Default)]
struct State {
    versions: Vec<ServiceVersion>,
    files: BTreeMap<(u32, String), String>,
    calls: Vec<Call>,
}

#[derive(Debug, Default)]
pub struct MemoryService {
    state: Mutex<State>,
}

fn not_found(what: &str) -> CliError {
    CliError::ApiError {
        status: 404,
        message: format!("Record not found: {what}"),
    }
}

impl MemoryService {
    /// Service whose versions are `(number, active)` pairs, in the given order
    pub fn with_versions(versions: &[(u32, bool)]) -> Self {
        let service = Self::default();
        service.state.lock().unwrap().versions = versions
            .iter()
            .map(|&(number, active)| ServiceVersion {
                number,
                active,
                locked: active,
            })
            .collect();
        service
    }

    pub fn put_file(&self, version: u32, name: &str, content: &str) {
        let _ = self
            .state
            .lock()
            .unwrap()
            .files
            .insert((version, name.to_string()), content.to_string());
    }

    pub fn file(&self, version: u32, name: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(&(version, name.to_string()))
            .cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matches(c)).count()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn version(&self, number: u32) -> Result<ServiceVersion> {
        self.state
            .lock()
            .unwrap()
            .versions
            .iter()
            .find(|v| v.number == number)
            .copied()
            .ok_or_else(|| not_found(&format!("version {number}")))
    }

    fn writable(&self, number: u32) -> Result<()> {
        if self.version(number)?.locked {
            return Err(CliError::ApiError {
                status: 400,
                message: format!("Version {number} is locked"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ConfigService for MemoryService {
    fn service_id(&self) -> &str {
        "memory"
    }

    async fn list_versions(&self) -> Result<Vec<ServiceVersion>> {
        self.record(Call::ListVersions);
        Ok(self.state.lock().unwrap().versions.clone())
    }

    async fn get_version(&self, version: u32) -> Result<ServiceVersion> {
        self.record(Call::GetVersion(version));
        self.version(version)
    }

    async fn clone_version(&self, version: u32) -> Result<ServiceVersion> {
        self.record(Call::CloneVersion(version));
        let _ = self.version(version)?;
        let mut state = self.state.lock().unwrap();
        let number = state.versions.iter().map(|v| v.number).max().unwrap_or(0) + 1;
        let copied: Vec<_> = state
            .files
            .iter()
            .filter(|((v, _), _)| *v == version)
            .map(|((_, name), content)| ((number, name.clone()), content.clone()))
            .collect();
        state.files.extend(copied);
        let cloned = ServiceVersion {
            number,
            active: false,
            locked: false,
        };
        state.versions.push(cloned);
        Ok(cloned)
    }

    async fn activate_version(&self, version: u32) -> Result<ServiceVersion> {
        self.record(Call::ActivateVersion(version));
        let _ = self.version(version)?;
        let mut state = self.state.lock().unwrap();
        for v in &mut state.versions {
            v.active = v.number == version;
            if v.active {
                v.locked = true;
            }
        }
        Ok(ServiceVersion {
            number: version,
            active: true,
            locked: true,
        })
    }

    async fn validate_version(&self, version: u32) -> Result<ValidationReport> {
        self.record(Call::ValidateVersion(version));
        let _ = self.version(version)?;
        Ok(ValidationReport {
            status: "ok".to_string(),
            msg: None,
            errors: Vec::new(),
        })
    }

    async fn get_settings(&self, version: u32) -> Result<VersionSettings> {
        self.record(Call::GetSettings(version));
        let _ = self.version(version)?;
        Ok(VersionSettings {
            default_host: Some("example.com".to_string()),
            default_ttl: 3600,
        })
    }

    async fn list_files(&self, version: u32) -> Result<Vec<VclFile>> {
        self.record(Call::ListFiles(version));
        let _ = self.version(version)?;
        // Reverse key order so callers have to sort
        Ok(self
            .state
            .lock()
            .unwrap()
            .files
            .iter()
            .rev()
            .filter(|((v, _), _)| *v == version)
            .map(|((_, name), content)| VclFile {
                name: name.clone(),
                content: content.clone(),
                main: false,
            })
            .collect())
    }

    async fn get_file(&self, version: u32, name: &str) -> Result<VclFile> {
        self.record(Call::GetFile(version, name.to_string()));
        self.file(version, name)
            .map(|content| VclFile {
                name: name.to_string(),
                content,
                main: false,
            })
            .ok_or_else(|| not_found(name))
    }

    async fn create_file(&self, version: u32, name: &str, content: &str) -> Result<VclFile> {
        self.record(Call::CreateFile(version, name.to_string()));
        self.writable(version)?;
        if self.file(version, name).is_some() {
            return Err(CliError::ApiError {
                status: 409,
                message: "Duplicate record".to_string(),
            });
        }
        self.put_file(version, name, content);
        Ok(VclFile {
            name: name.to_string(),
            content: content.to_string(),
            main: false,
        })
    }

    async fn update_file(&self, version: u32, name: &str, content: &str) -> Result<VclFile> {
        self.record(Call::UpdateFile(version, name.to_string()));
        self.writable(version)?;
        if self.file(version, name).is_none() {
            return Err(not_found(name));
        }
        self.put_file(version, name, content);
        Ok(VclFile {
            name: name.to_string(),
            content: content.to_string(),
            main: false,
        })
    }

    async fn delete_file(&self, version: u32, name: &str) -> Result<()> {
        self.record(Call::DeleteFile(version, name.to_string()));
        self.writable(version)?;
        self.state
            .lock()
            .unwrap()
            .files
            .remove(&(version, name.to_string()))
            .map(|_| ())
            .ok_or_else(|| not_found(name))
    }
}
