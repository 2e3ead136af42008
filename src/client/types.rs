//! Request/response types for the Fastly configuration API

use serde::{Deserialize, Serialize};

/// A numbered snapshot of a service's configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceVersion {
    /// Version number, assigned by the service and never reused
    pub number: u32,
    /// Whether this version is serving production traffic
    #[serde(default)]
    pub active: bool,
    /// Whether the version has been locked against edits
    #[serde(default)]
    pub locked: bool,
}

/// A named VCL file stored under a service version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VclFile {
    /// Logical name (file name without extension)
    pub name: String,
    /// VCL source
    #[serde(default)]
    pub content: String,
    /// Whether this is the main VCL for the version
    #[serde(default)]
    pub main: bool,
}

/// Per-version settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSettings {
    /// Host header used when none is present on the request
    #[serde(rename = "general.default_host", default)]
    pub default_host: Option<String>,
    /// Default object TTL in seconds
    #[serde(rename = "general.default_ttl", default)]
    pub default_ttl: u64,
}

/// Outcome of validating a service version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// `"ok"` when the version is valid
    pub status: String,
    /// Summary message, usually present on failure
    #[serde(default)]
    pub msg: Option<String>,
    /// Detailed errors
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

impl ValidationReport {
    /// Whether the service considered the version valid
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }

    /// Human readable messages, summary first
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.msg
            .iter()
            .cloned()
            .chain(self.errors.iter().map(|e| match e {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            }))
            .filter(|m| !m.is_empty())
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn version_decodes_with_missing_flags() {
        let v: ServiceVersion = serde_json::from_str(r#"{"number": 7}"#).unwrap();
        assert_eq!(v.number, 7);
        assert!(!v.active);
    }

    #[test]
    fn settings_use_dotted_field_names() {
        let s: VersionSettings = serde_json::from_str(
            r#"{"general.default_host": "example.com", "general.default_ttl": 3600, "service_id": "x"}"#,
        )
        .unwrap();
        assert_eq!(s.default_host.as_deref(), Some("example.com"));
        assert_eq!(s.default_ttl, 3600);
    }

    #[test]
    fn validation_messages_include_summary_and_errors() {
        let report: ValidationReport = serde_json::from_str(
            r#"{"status": "error", "msg": "Syntax error", "errors": ["line 3", {"line": 4}]}"#,
        )
        .unwrap();
        assert!(!report.is_valid());
        assert_eq!(
            report.messages(),
            vec!["Syntax error".to_string(), "line 3".to_string(), r#"{"line":4}"#.to_string()]
        );
    }
}
