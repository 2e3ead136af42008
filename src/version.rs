//! Service version resolution
//!
//! The Fastly API returns versions in no particular order, so "latest" always
//! means the numerically highest version across the full list. Active
//! versions are never the target of a mutation: uploads either clone a fresh
//! version or are refused.

use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::client::{ConfigService, ServiceVersion};
use crate::error::{CliError, Result};

/// A version given on the command line: a number or `latest`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelector {
    /// The numerically highest version
    Latest,
    /// A specific version number
    Number(u32),
}

impl FromStr for VersionSelector {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") {
            return Ok(Self::Latest);
        }
        parse_version(s).map(Self::Number)
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Parse a numeric version string
///
/// # Errors
///
/// Returns [`CliError::InvalidArgument`] for anything that is not a positive integer.
pub fn parse_version(s: &str) -> Result<u32> {
    s.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| CliError::InvalidArgument(format!("'{s}' is not a valid service version")))
}

/// The highest-numbered version entry of the service
///
/// # Errors
///
/// Surfaces the API error directly, or [`CliError::NoVersions`] for an empty list.
pub async fn latest_version_entry(service: &dyn ConfigService) -> Result<ServiceVersion> {
    let versions = service.list_versions().await?;
    debug!(count = versions.len(), "listed service versions");

    versions
        .into_iter()
        .max_by_key(|v| v.number)
        .ok_or_else(|| CliError::NoVersions {
            service_id: service.service_id().to_string(),
        })
}

/// The highest version number of the service
///
/// This version isn't necessarily the active one.
///
/// # Errors
///
/// See [`latest_version_entry`].
pub async fn latest_version(service: &dyn ConfigService) -> Result<u32> {
    latest_version_entry(service).await.map(|v| v.number)
}

/// Turn a selector into a concrete version number
///
/// # Errors
///
/// Fails only when `latest` has to be looked up and the lookup fails.
pub async fn resolve_selector(service: &dyn ConfigService, selector: VersionSelector) -> Result<u32> {
    match selector {
        VersionSelector::Number(n) => Ok(n),
        VersionSelector::Latest => latest_version(service).await,
    }
}

/// Refuse to mutate an active version
///
/// # Errors
///
/// Returns [`CliError::VersionActive`] if `version` is active, or the API error.
pub async fn ensure_inactive(service: &dyn ConfigService, version: u32) -> Result<()> {
    let status = service.get_version(version).await?;
    if status.active {
        return Err(CliError::VersionActive { version });
    }
    Ok(())
}

/// Upload target options, in precedence order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadTarget {
    /// Clone this version and upload to the clone
    pub clone_from: Option<u32>,
    /// Upload to this (inactive) version
    pub version: Option<u32>,
    /// Upload to the latest version (must be inactive)
    pub latest: bool,
}

impl UploadTarget {
    /// Reject contradictory options before any network call
    ///
    /// # Errors
    ///
    /// Returns [`CliError::ConflictingOptions`] if both `clone_from` and `version` are set.
    pub fn check(&self) -> Result<()> {
        if self.clone_from.is_some() && self.version.is_some() {
            return Err(CliError::ConflictingOptions {
                first: "--clone",
                second: "--version",
            });
        }
        Ok(())
    }
}

/// Where an acquired version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    /// Freshly cloned from an explicitly requested version
    ClonedFrom(u32),
    /// Freshly cloned from the latest version
    ClonedFromLatest(u32),
    /// An existing inactive version the user asked for
    Explicit,
    /// The existing latest version, which was inactive
    Latest,
}

/// Version that file mutations will target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquiredVersion {
    /// Target version number
    pub number: u32,
    /// How it was chosen
    pub source: VersionSource,
}

impl AcquiredVersion {
    /// Version this one was cloned from, if any
    #[must_use]
    pub const fn cloned_from(&self) -> Option<u32> {
        match self.source {
            VersionSource::ClonedFrom(v) | VersionSource::ClonedFromLatest(v) => Some(v),
            VersionSource::Explicit | VersionSource::Latest => None,
        }
    }
}

impl fmt::Display for AcquiredVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            VersionSource::ClonedFrom(from) => write!(
                f,
                "Successfully created new version {} from existing version {from}",
                self.number
            ),
            VersionSource::ClonedFromLatest(from) => write!(
                f,
                "Successfully created new version {} from latest version {from}",
                self.number
            ),
            VersionSource::Explicit => write!(f, "Uploading to specified version {}", self.number),
            VersionSource::Latest => write!(f, "Uploading to latest version {}", self.number),
        }
    }
}

/// Decide which version an upload writes to
///
/// First match wins:
/// 1. `clone_from`: clone that version
/// 2. `version`: use it unchanged if inactive
/// 3. `latest`: use the latest version unchanged if inactive
/// 4. otherwise clone the latest version
///
/// # Errors
///
/// [`CliError::ConflictingOptions`] (no network call is made),
/// [`CliError::VersionActive`], or any API error.
pub async fn acquire_target_version(
    service: &dyn ConfigService,
    target: &UploadTarget,
) -> Result<AcquiredVersion> {
    target.check()?;

    if let Some(from) = target.clone_from {
        let cloned = clone_from(service, from).await?;
        return Ok(AcquiredVersion {
            number: cloned.number,
            source: VersionSource::ClonedFrom(from),
        });
    }

    if let Some(version) = target.version {
        ensure_inactive(service, version).await?;
        debug!(version, "using specified inactive version");
        return Ok(AcquiredVersion {
            number: version,
            source: VersionSource::Explicit,
        });
    }

    let latest = latest_version(service).await?;

    if target.latest {
        ensure_inactive(service, latest).await?;
        debug!(version = latest, "using latest inactive version");
        return Ok(AcquiredVersion {
            number: latest,
            source: VersionSource::Latest,
        });
    }

    let cloned = clone_from(service, latest).await?;
    Ok(AcquiredVersion {
        number: cloned.number,
        source: VersionSource::ClonedFromLatest(latest),
    })
}

async fn clone_from(service: &dyn ConfigService, version: u32) -> Result<ServiceVersion> {
    let cloned = service.clone_version(version).await?;
    info!(from = version, to = cloned.number, "cloned service version");
    Ok(cloned)
}
