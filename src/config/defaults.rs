//! Default configuration values

/// Default Fastly API base URL
pub fn default_api_url() -> String {
    "https://api.fastly.com".to_string()
}

/// Default request timeout in seconds
pub const fn default_timeout() -> u64 {
    30
}

/// Default directory walked for VCL files
pub fn default_directory() -> std::path::PathBuf {
    std::path::PathBuf::from(".")
}

/// Default match pattern (the empty regex matches every path)
pub const DEFAULT_MATCH_PATTERN: &str = "";

/// Default skip pattern (no real directory starts with four underscores)
pub const DEFAULT_SKIP_PATTERN: &str = "^____";

/// Connect timeout for the HTTP client in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
