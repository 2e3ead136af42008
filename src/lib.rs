#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

//! ## Architecture
//!
//! - **[`error`]** - Error types and exit codes
//! - **[`config`]** - Configuration file, environment and flag resolution
//! - **[`client`]** - The [`client::ConfigService`] trait and its Fastly HTTP implementation
//! - **[`filter`]** - Which local paths count as VCL files
//! - **[`version`]** - Latest-version lookup and upload target selection
//! - **[`dispatch`]** - Concurrent per-file workers and result collection
//! - **[`operations`]** - Upload, fetch, list and delete
//! - **[`report`]** - Rendering results and comparing with `diff`
//! - **[`commands`]** - Command handlers wired to [`cli`]

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod operations;
pub mod report;
pub mod version;

#[cfg(test)]
mod testing;

/// Error type alias for convenience
pub use error::{CliError, Result};

/// Configuration type alias for convenience
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = "vclsync";
