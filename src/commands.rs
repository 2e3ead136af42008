//! Command handlers
//!
//! Each handler writes its user-facing output to `out` and returns an error
//! only for failures that should change the exit code. Per-file failures
//! during `upload` and `diff` are reported inline and summarized instead.

use console::style;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

use crate::client::{ConfigService, HttpConfigService};
use crate::config::Config;
use crate::dispatch::DispatchSession;
use crate::error::Result;
use crate::filter::PathFilter;
use crate::operations::{self, FileOperation};
use crate::report::{ReportMode, Reporter, Summary};
use crate::version::{
    acquire_target_version, latest_version, resolve_selector, UploadTarget, VersionSelector,
};

/// Resolved configuration plus the service client every command talks to
pub struct Context {
    /// Effective configuration
    pub config: Config,
    /// Client bound to `config`'s service
    pub service: Arc<dyn ConfigService>,
}

impl Context {
    /// Build a context backed by the Fastly HTTP API
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed.
    pub fn new(config: Config) -> Result<Self> {
        let service = HttpConfigService::new(&config)?;
        Ok(Self::with_service(config, Arc::new(service)))
    }

    /// Build a context around an existing service client
    #[must_use]
    pub fn with_service(config: Config, service: Arc<dyn ConfigService>) -> Self {
        Self { config, service }
    }

    fn service(&self) -> &dyn ConfigService {
        self.service.as_ref()
    }

    /// `version` if given, else the latest version (announced to the user)
    async fn version_or_latest(&self, version: Option<u32>, out: &mut dyn Write) -> Result<u32> {
        if let Some(version) = version {
            return Ok(version);
        }

        let latest = latest_version(self.service()).await?;
        writeln!(
            out,
            "You didn't provide a specific service version, so we'll use the latest one: {}",
            style(latest).yellow()
        )?;
        Ok(latest)
    }

    async fn process_files(
        &self,
        operation: FileOperation,
        mode: ReportMode,
        version: u32,
        out: &mut dyn Write,
    ) -> Result<Summary> {
        let filter = PathFilter::from_config(&self.config);
        let session = DispatchSession::discover(&self.config.directory, &filter);

        if session.is_empty() {
            writeln!(
                out,
                "{} No VCL files found under {}",
                style("⚠").yellow(),
                self.config.directory.display()
            )?;
        }

        let results = session
            .dispatch(
                Arc::clone(&self.service),
                operation,
                version,
                self.config.concurrency,
            )
            .await;

        let mut reporter = Reporter::new(out, mode, self.config.debug);
        for result in results {
            let _ = reporter.handle(result, version).await?;
        }
        reporter.finish()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("service", &self.service.service_id())
            .finish()
    }
}

/// List the remote VCL files of a version
///
/// # Errors
///
/// Surfaces version resolution and API errors.
pub async fn list(ctx: &Context, version: Option<u32>, out: &mut dyn Write) -> Result<()> {
    let version = ctx.version_or_latest(version, out).await?;
    let files = operations::list_files(ctx.service(), version).await?;

    writeln!(
        out,
        "VCL files found for service version: {}",
        style(version).yellow()
    )?;
    for file in &files {
        writeln!(out, "  * {}", file.name)?;
    }
    Ok(())
}

/// Compare local files with a remote version
///
/// # Errors
///
/// Surfaces version resolution errors; per-file problems are only reported.
pub async fn diff(ctx: &Context, version: Option<u32>, out: &mut dyn Write) -> Result<Summary> {
    let version = ctx.version_or_latest(version, out).await?;
    ctx.process_files(FileOperation::FetchForDiff, ReportMode::Diff, version, out)
        .await
}

/// Upload local files to the version `target` selects
///
/// # Errors
///
/// Surfaces option conflicts, active-version refusals and version resolution
/// errors; per-file problems are only reported.
pub async fn upload(ctx: &Context, target: &UploadTarget, out: &mut dyn Write) -> Result<Summary> {
    let acquired = acquire_target_version(ctx.service(), target).await?;
    if acquired.cloned_from().is_some() {
        writeln!(out, "{}", style(&acquired).green())?;
    } else {
        debug!(target = %acquired, "upload target resolved");
    }

    ctx.process_files(
        FileOperation::Upload,
        ReportMode::Upload,
        acquired.number,
        out,
    )
    .await
}

/// Delete a named file from an inactive version
///
/// # Errors
///
/// Surfaces a missing name, an active version, or the API error.
pub async fn delete(
    ctx: &Context,
    name: &str,
    version: Option<u32>,
    out: &mut dyn Write,
) -> Result<()> {
    let version = ctx.version_or_latest(version, out).await?;
    operations::delete_file(ctx.service(), version, name).await?;

    writeln!(
        out,
        "{} The file '{}' was deleted from version '{}'",
        style("✓").green(),
        style(name).green(),
        style(version).yellow()
    )?;
    Ok(())
}

/// Report whether a version is active
///
/// # Errors
///
/// Surfaces version resolution and API errors.
pub async fn status(ctx: &Context, selector: VersionSelector, out: &mut dyn Write) -> Result<()> {
    let version = resolve_selector(ctx.service(), selector).await?;
    let entry = ctx.service().get_version(version).await?;
    let state = if entry.active {
        "already activated"
    } else {
        "not activated"
    };

    writeln!(
        out,
        "Service '{}' version '{}' is '{}'",
        style(ctx.service().service_id()).yellow(),
        style(version).yellow(),
        style(state).cyan()
    )?;
    Ok(())
}

/// Print a version's default host and TTL
///
/// # Errors
///
/// Surfaces version resolution and API errors.
pub async fn settings(ctx: &Context, selector: VersionSelector, out: &mut dyn Write) -> Result<()> {
    let version = resolve_selector(ctx.service(), selector).await?;
    let settings = ctx.service().get_settings(version).await?;

    writeln!(
        out,
        "Default Host: {}",
        settings.default_host.as_deref().unwrap_or("")
    )?;
    writeln!(out, "Default TTL: {} (seconds)", settings.default_ttl)?;
    Ok(())
}

/// Activate a version
///
/// # Errors
///
/// Surfaces the API error.
pub async fn activate(ctx: &Context, version: u32, out: &mut dyn Write) -> Result<()> {
    let activated = ctx.service().activate_version(version).await?;

    writeln!(
        out,
        "Service '{}' now has version '{}' activated",
        style(ctx.service().service_id()).yellow(),
        style(activated.number).green()
    )?;
    Ok(())
}

/// Validate a version, printing any messages the service returns
///
/// # Errors
///
/// Surfaces the API error. An invalid version is reported, not returned.
pub async fn validate(ctx: &Context, version: u32, out: &mut dyn Write) -> Result<bool> {
    let report = ctx.service().validate_version(version).await?;
    let valid = report.is_valid();

    let verdict = if valid {
        style("true").green()
    } else {
        style("false").red()
    };
    writeln!(
        out,
        "Service '{}' valid? {verdict}",
        style(ctx.service().service_id()).yellow()
    )?;
    for message in report.messages() {
        writeln!(out, "\t{message}")?;
    }
    Ok(valid)
}

/// Print the CLI version
///
/// # Errors
///
/// Fails if the output cannot be written.
pub fn version(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{} {}", crate::NAME, crate::VERSION)?;
    Ok(())
}
