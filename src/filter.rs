//! Path filtering for local VCL discovery
//!
//! A path is eligible when all of these hold:
//! 1. it does not contain the version-control marker (`.git`)
//! 2. it contains the VCL extension marker (`.vcl`)
//! 3. it matches the user's match pattern
//! 4. it does not match the user's skip pattern
//!
//! A pattern that fails to compile falls back to that matcher's default
//! (match everything / the `^____` sentinel) and logs a warning; filtering never
//! fails the command.

use regex::Regex;
use std::path::Path;
use tracing::warn;

use crate::config::{Config, DEFAULT_MATCH_PATTERN, DEFAULT_SKIP_PATTERN};

/// Paths containing this are version-control metadata
pub const VCS_MARKER: &str = ".git";

/// Paths must contain this to be considered VCL
pub const VCL_EXTENSION_MARKER: &str = ".vcl";

/// Compiled include/exclude rules, immutable once built
///
/// A missing matcher means "match everything" for the include side and
/// "skip nothing" for the exclude side.
#[derive(Debug, Clone)]
pub struct PathFilter {
    match_regex: Option<Regex>,
    skip_regex: Option<Regex>,
}

impl PathFilter {
    /// Compile match and skip patterns
    #[must_use]
    pub fn new(match_pattern: &str, skip_pattern: &str) -> Self {
        Self {
            match_regex: compile_or_default("match", match_pattern, DEFAULT_MATCH_PATTERN),
            skip_regex: compile_or_default("skip", skip_pattern, DEFAULT_SKIP_PATTERN),
        }
    }

    /// Build the filter from resolved configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.match_pattern, &config.skip_pattern)
    }

    /// Whether `path` should be processed
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        valid_path_defaults(&path)
            && self.match_regex.as_ref().is_none_or(|re| re.is_match(&path))
            && !self.skip_regex.as_ref().is_some_and(|re| re.is_match(&path))
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_PATTERN, DEFAULT_SKIP_PATTERN)
    }
}

fn valid_path_defaults(path: &str) -> bool {
    !path.contains(VCS_MARKER) && path.contains(VCL_EXTENSION_MARKER)
}

fn compile_or_default(kind: &str, pattern: &str, default: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!(kind, pattern, error = %err, "invalid {kind} pattern, using default '{default}'");
            Regex::new(default).ok()
        }
    }
}
