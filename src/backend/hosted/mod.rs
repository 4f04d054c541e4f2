//! Client for the hosted backend-as-a-service.
//!
//! Tables are reached through the PostgREST API under `/rest/v1/` and images
//! through the storage API under `/storage/v1/`. Every request carries the
//! project's anonymous key both as `apikey` and as a bearer token.

mod storage;
mod tables;

pub use storage::HostedBucket;
pub use tables::HostedStore;

use reqwest::{Client, Method, RequestBuilder, Response};
use url::Url;

use crate::errors::{WallError, WallResult};

#[derive(Clone)]
pub struct HostedClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl HostedClient {
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("Invalid backend URL '{}': {}", base_url, e))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Backend URL must use http or https: {}", base_url);
        }
        if api_key.trim().is_empty() {
            anyhow::bail!("Backend API key is empty");
        }

        let http = Client::builder()
            .user_agent(concat!("memory-wall/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    pub(crate) fn rest(&self, method: Method, table: &str) -> RequestBuilder {
        self.request(method, &format!("/rest/v1/{}", table))
    }

    pub(crate) fn storage(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, &format!("/storage/v1/{}", path))
    }
}

/// Turns a non-success response into [`WallError::Backend`].
pub(crate) async fn check(response: Response) -> WallResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|_| String::from("<unreadable body>"));
    Err(WallError::Backend {
        status: status.as_u16(),
        message,
    })
}
