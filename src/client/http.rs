//! JSON REST implementation of [`ConfigService`] for the Fastly API

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use super::types::{ServiceVersion, ValidationReport, VclFile, VersionSettings};
use super::ConfigService;
use crate::config::{Config, DEFAULT_CONNECT_TIMEOUT_SECS};
use crate::error::{CliError, Result};

/// Header carrying the API token
const AUTH_HEADER: &str = "Fastly-Key";

/// HTTP client bound to a single Fastly service
pub struct HttpConfigService {
    client: Client,
    base_url: String,
    token: String,
    service_id: String,
}

impl HttpConfigService {
    /// Build a client from resolved configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .tcp_nodelay(true)
            .user_agent(concat!("vclsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CliError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(
            client,
            &config.api_url,
            &config.auth.token,
            config.service_id(),
        ))
    }

    /// Wrap an existing reqwest client
    #[must_use]
    pub fn with_client(client: Client, api_url: &str, token: &str, service_id: &str) -> Self {
        Self {
            client,
            base_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            service_id: service_id.to_string(),
        }
    }

    fn versions_url(&self) -> String {
        format!("{}/service/{}/version", self.base_url, self.service_id)
    }

    fn version_url(&self, version: u32, suffix: &str) -> String {
        format!("{}/{version}{suffix}", self.versions_url())
    }

    fn file_url(&self, version: u32, name: &str) -> String {
        self.version_url(version, &format!("/vcl/{}", urlencoding::encode(name)))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(AUTH_HEADER, &self.token)
            .header("Accept", "application/json")
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = check(request.send().await?).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl fmt::Debug for HttpConfigService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConfigService")
            .field("base_url", &self.base_url)
            .field("service_id", &self.service_id)
            .finish_non_exhaustive()
    }
}

/// Turn a non-2xx response into [`CliError::ApiError`]
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(CliError::ApiError {
        status: status.as_u16(),
        message: api_message(&body),
    })
}

/// Pull `msg`/`detail` out of an error body, falling back to the raw text
fn api_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        msg: Option<String>,
        detail: Option<String>,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            msg: Some(msg),
            detail: Some(detail),
        }) if !detail.is_empty() => format!("{msg}: {detail}"),
        Ok(ErrorBody { msg: Some(msg), .. }) => msg,
        Ok(ErrorBody {
            detail: Some(detail),
            ..
        }) => detail,
        _ => body.trim().to_string(),
    }
}

#[async_trait]
impl ConfigService for HttpConfigService {
    fn service_id(&self) -> &str {
        &self.service_id
    }

    async fn list_versions(&self) -> Result<Vec<ServiceVersion>> {
        self.send(self.request(Method::GET, &self.versions_url()))
            .await
    }

    async fn get_version(&self, version: u32) -> Result<ServiceVersion> {
        self.send(self.request(Method::GET, &self.version_url(version, "")))
            .await
    }

    async fn clone_version(&self, version: u32) -> Result<ServiceVersion> {
        self.send(self.request(Method::PUT, &self.version_url(version, "/clone")))
            .await
    }

    async fn activate_version(&self, version: u32) -> Result<ServiceVersion> {
        self.send(self.request(Method::PUT, &self.version_url(version, "/activate")))
            .await
    }

    async fn validate_version(&self, version: u32) -> Result<ValidationReport> {
        self.send(self.request(Method::GET, &self.version_url(version, "/validate")))
            .await
    }

    async fn get_settings(&self, version: u32) -> Result<VersionSettings> {
        self.send(self.request(Method::GET, &self.version_url(version, "/settings")))
            .await
    }

    async fn list_files(&self, version: u32) -> Result<Vec<VclFile>> {
        self.send(self.request(Method::GET, &self.version_url(version, "/vcl")))
            .await
    }

    async fn get_file(&self, version: u32, name: &str) -> Result<VclFile> {
        self.send(self.request(Method::GET, &self.file_url(version, name)))
            .await
    }

    async fn create_file(&self, version: u32, name: &str, content: &str) -> Result<VclFile> {
        let request = self
            .request(Method::POST, &self.version_url(version, "/vcl"))
            .form(&[("name", name), ("content", content)]);
        self.send(request).await
    }

    async fn update_file(&self, version: u32, name: &str, content: &str) -> Result<VclFile> {
        let request = self
            .request(Method::PUT, &self.file_url(version, name))
            .form(&[("content", content)]);
        self.send(request).await
    }

    async fn delete_file(&self, version: u32, name: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, &self.file_url(version, name))
            .send()
            .await?;
        let _ = check(response).await?;
        Ok(())
    }
}
