//! Credentials for the Fastly API

use serde::{Deserialize, Serialize};
use std::fmt;

/// API token plus the service it is used against
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Fastly API token
    #[serde(default)]
    pub token: String,

    /// Fastly service ID
    #[serde(default)]
    pub service_id: String,
}

impl Credentials {
    /// Check if a token is configured
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.token.trim().is_empty()
    }

    /// Check if a service ID is configured
    #[must_use]
    pub fn has_service(&self) -> bool {
        !self.service_id.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("service_id", &self.service_id)
            .finish()
    }
}
