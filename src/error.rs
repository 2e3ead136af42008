//! Error types and handling for vclsync
//!
//! Provides structured error types for all CLI operations. Configuration
//! errors are raised before any network call; remote and local errors carry
//! enough context to be printed as-is.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vclsync operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Comprehensive error types for vclsync operations
#[derive(Error, Debug)]
pub enum CliError {
    // ═══════════════════════════════════════════════════════════════
    // Configuration & Input Errors
    // ═══════════════════════════════════════════════════════════════
    /// Invalid input argument (e.g. a non-numeric version)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing required argument
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// Two mutually exclusive options were both supplied
    #[error("Please do not provide both {first} and {second}")]
    ConflictingOptions {
        /// First option name
        first: &'static str,
        /// Second option name
        second: &'static str,
    },

    /// API token is missing
    #[error("Missing Fastly API token. Pass --token or set FASTLY_API_TOKEN")]
    MissingToken,

    /// Service ID is missing
    #[error("Missing Fastly service id. Pass --service or set FASTLY_SERVICE_ID")]
    MissingServiceId,

    /// Failed to read configuration file
    #[error("Failed to read config from {path}: {reason}")]
    ConfigRead {
        /// Config file path
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ═══════════════════════════════════════════════════════════════
    // Remote Service Errors
    // ═══════════════════════════════════════════════════════════════
    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Error response from the Fastly API
    #[error("Fastly API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// Invalid API response format
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Refused to mutate an active service version
    #[error("Sorry, version {version} is already activated")]
    VersionActive {
        /// The active version number
        version: u32,
    },

    /// The service reported no versions at all
    #[error("Service {service_id} has no versions")]
    NoVersions {
        /// Service that was queried
        service_id: String,
    },

    // ═══════════════════════════════════════════════════════════════
    // Local I/O Errors
    // ═══════════════════════════════════════════════════════════════
    /// File operation failed
    #[error("File operation failed: {path}: {reason}")]
    FileError {
        /// Offending path
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════
    // Other Errors
    // ═══════════════════════════════════════════════════════════════
    /// Writing user-facing output failed (closed pipe, full disk)
    #[error("Failed to write output: {0}")]
    Output(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Get the exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_)
            | Self::MissingArgument(_)
            | Self::ConflictingOptions { .. }
            | Self::MissingToken
            | Self::MissingServiceId
            | Self::ConfigRead { .. }
            | Self::InvalidConfig(_) => 2,
            Self::Http(_)
            | Self::ApiError { .. }
            | Self::InvalidResponse(_)
            | Self::VersionActive { .. }
            | Self::NoVersions { .. } => 4,
            Self::FileError { .. } => 5,
            Self::Output(_) | Self::Internal(_) => 1,
        }
    }

    /// Whether the error was detected before talking to the remote service
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        self.exit_code() == 2
    }
}

impl From<reqwest::Error> for CliError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            Self::ApiError {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Http(err.to_string())
        }
    }
}

/// Bare I/O errors only come from writing output; local file reads map
/// their errors to [`CliError::FileError`] with the path attached.
impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Output(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_eof() {
            Self::InvalidResponse(format!("JSON syntax error: {err}"))
        } else {
            Self::InvalidResponse(err.to_string())
        }
    }
}
