//! Command-line interface argument parsing
//!
//! Defines all CLI commands and their arguments using Clap. Environment
//! fallbacks are resolved here; the rest of the crate only sees [`Config`].
//!
//! [`Config`]: crate::config::Config

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ConfigOverrides;
use crate::version::{parse_version, VersionSelector};

/// vclsync - keep local VCL files in step with a Fastly service
#[derive(Parser, Debug)]
#[command(name = "vclsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sync local VCL files with versioned Fastly service configuration")]
#[command(long_about = concat!(
    "vclsync (v", env!("CARGO_PKG_VERSION"), ")\n",
    "List, diff, upload and delete VCL files for a Fastly service version,\n",
    "and inspect, validate or activate service versions.\n\n",
    "Uploads never touch an active version: by default the latest version is\n",
    "cloned first and files are uploaded to the clone."
))]
pub struct Cli {
    /// Fastly API token
    #[arg(long, global = true, env = "FASTLY_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Fastly service ID
    #[arg(long, global = true, env = "FASTLY_SERVICE_ID")]
    pub service: Option<String>,

    /// Directory searched (recursively) for VCL files
    #[arg(long = "dir", global = true, env = "VCL_DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Regex a path must match to be processed [default: match everything]
    #[arg(long = "match", global = true, env = "VCL_MATCH_DIRECTORY")]
    pub match_pattern: Option<String>,

    /// Regex that excludes matching paths [default: ^____]
    #[arg(long = "skip", global = true, env = "VCL_SKIP_DIRECTORY")]
    pub skip_pattern: Option<String>,

    /// Fastly API URL [default: https://api.fastly.com]
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Maximum files processed at once [default: no limit]
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Show diff output and debug logs
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the VCL files stored in a service version
    ///
    /// Examples:
    ///   vclsync list
    ///   vclsync list --version 12
    #[command(display_order = 1)]
    List {
        /// Service version to list [default: latest]
        #[arg(long, value_parser = version_arg)]
        version: Option<u32>,
    },

    /// Compare local VCL files with a service version
    ///
    /// Examples:
    ///   vclsync diff
    ///   vclsync --debug diff --version 12
    #[command(display_order = 2)]
    Diff {
        /// Service version to compare against [default: latest]
        #[arg(long, value_parser = version_arg)]
        version: Option<u32>,
    },

    /// Upload local VCL files to an inactive service version
    ///
    /// Without options the latest version is cloned and the clone receives
    /// the files.
    ///
    /// Examples:
    ///   vclsync upload
    ///   vclsync upload --clone 10
    ///   vclsync upload --version 13
    ///   vclsync upload --latest
    #[command(display_order = 3)]
    Upload {
        /// Clone this version and upload to the clone
        #[arg(long, value_parser = version_arg, conflicts_with = "version")]
        clone: Option<u32>,

        /// Upload to this non-active version
        #[arg(long, value_parser = version_arg)]
        version: Option<u32>,

        /// Upload to the latest version (must not be active)
        #[arg(long)]
        latest: bool,
    },

    /// Delete a VCL file from a service version
    ///
    /// Examples:
    ///   vclsync delete --name test_file --version 13
    #[command(display_order = 4)]
    Delete {
        /// Name of the VCL file (without extension)
        #[arg(long, required = true)]
        name: String,

        /// Service version to delete from [default: latest]
        #[arg(long, value_parser = version_arg)]
        version: Option<u32>,
    },

    /// Show whether a service version is active
    ///
    /// Examples:
    ///   vclsync status latest
    #[command(display_order = 5)]
    Status {
        /// Version number or 'latest'
        #[arg(value_parser = selector_arg)]
        version: VersionSelector,
    },

    /// Show the default host and TTL of a service version
    ///
    /// Examples:
    ///   vclsync settings 12
    #[command(display_order = 6)]
    Settings {
        /// Version number or 'latest'
        #[arg(value_parser = selector_arg)]
        version: VersionSelector,
    },

    /// Activate a service version
    #[command(display_order = 7)]
    Activate {
        /// Version number to activate
        #[arg(value_parser = version_arg)]
        version: u32,
    },

    /// Validate a service version
    #[command(display_order = 8)]
    Validate {
        /// Version number to validate
        #[arg(value_parser = version_arg)]
        version: u32,
    },

    /// Print the CLI version
    #[command(display_order = 9)]
    Version,
}

fn version_arg(s: &str) -> Result<u32, String> {
    parse_version(s).map_err(|e| e.to_string())
}

fn selector_arg(s: &str) -> Result<VersionSelector, String> {
    s.parse().map_err(|e: crate::error::CliError| e.to_string())
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Values that override the config file
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            token: self.token.clone(),
            service_id: self.service.clone(),
            directory: self.directory.clone(),
            match_pattern: self.match_pattern.clone(),
            skip_pattern: self.skip_pattern.clone(),
            api_url: self.api_url.clone(),
            concurrency: self.concurrency,
            debug: self.debug,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from([
            "vclsync", "upload", "--latest", "--token", "t", "--service", "s", "--dir", "vcl",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.token.as_deref(), Some("t"));
        assert_eq!(overrides.service_id.as_deref(), Some("s"));
        assert_eq!(overrides.directory, Some(PathBuf::from("vcl")));
        assert!(matches!(
            cli.command,
            Commands::Upload {
                clone: None,
                version: None,
                latest: true
            }
        ));
    }

    #[test]
    fn clone_and_version_conflict() {
        let err = Cli::try_parse_from(["vclsync", "upload", "--clone", "3", "--version", "4"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn non_numeric_version_is_rejected() {
        assert!(Cli::try_parse_from(["vclsync", "diff", "--version", "abc"]).is_err());
        assert!(Cli::try_parse_from(["vclsync", "activate", "latest"]).is_err());
    }

    #[test]
    fn status_accepts_latest() {
        let cli = Cli::try_parse_from(["vclsync", "status", "latest"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Status {
                version: VersionSelector::Latest
            }
        ));
    }

    #[test]
    fn delete_requires_name() {
        assert!(Cli::try_parse_from(["vclsync", "delete"]).is_err());
    }
}
