//! Remote Configuration Service abstraction
//!
//! The core talks to the CDN only through [`ConfigService`]. Production code
//! uses [`HttpConfigService`]; tests substitute an in-memory double.

use async_trait::async_trait;

use crate::error::Result;

pub mod http;
pub mod types;

pub use http::HttpConfigService;
pub use types::{ServiceVersion, ValidationReport, VclFile, VersionSettings};

/// Operations the CDN exposes for one service
///
/// Every method targets the service the implementation was constructed
/// for; callers never pass the service ID around.
#[async_trait]
pub trait ConfigService: Send + Sync {
    /// Service this client is bound to
    fn service_id(&self) -> &str;

    /// All versions of the service, in whatever order the API returns them
    async fn list_versions(&self) -> Result<Vec<ServiceVersion>>;

    /// A single version's status
    async fn get_version(&self, version: u32) -> Result<ServiceVersion>;

    /// Copy `version` into a brand-new inactive version
    async fn clone_version(&self, version: u32) -> Result<ServiceVersion>;

    /// Make `version` the active version
    async fn activate_version(&self, version: u32) -> Result<ServiceVersion>;

    /// Ask the service to validate `version`
    async fn validate_version(&self, version: u32) -> Result<ValidationReport>;

    /// Settings for `version`
    async fn get_settings(&self, version: u32) -> Result<VersionSettings>;

    /// VCL files stored under `version`
    async fn list_files(&self, version: u32) -> Result<Vec<VclFile>>;

    /// A single VCL file
    async fn get_file(&self, version: u32, name: &str) -> Result<VclFile>;

    /// Create a VCL file; fails if it already exists
    async fn create_file(&self, version: u32, name: &str, content: &str) -> Result<VclFile>;

    /// Replace the content of an existing VCL file
    async fn update_file(&self, version: u32, name: &str, content: &str) -> Result<VclFile>;

    /// Remove a VCL file
    async fn delete_file(&self, version: u32, name: &str) -> Result<()>;
}
