//! reqwest-backed hub client

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use hp_core::Credentials;
use reqwest::{header, Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};

/// Transport seam used by the contract runner
#[async_trait]
pub trait HubApi: Send + Sync {
    /// Base URL without a trailing slash
    fn base_url(&self) -> &str;

    /// Make an authenticated GET request to `path`
    async fn get(&self, path: &str) -> ClientResult<ApiResponse>;

    /// Make an authenticated PUT request (no body) to `path`
    async fn put(&self, path: &str) -> ClientResult<ApiResponse>;

    /// Absolute URL for `path`, used in reports
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }
}

/// Response from a hub call
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
    pub raw_body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Look up a top-level field of a JSON object body
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.as_ref().and_then(|b| b.get(name))
    }
}

/// HTTP client for one hub
#[derive(Clone)]
pub struct HubClient {
    client: Client,
    base_url: String,
    authorization: String,
}

impl HubClient {
    /// Create a client with the given per-request timeout
    pub fn new(base_url: &str, credentials: &Credentials, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ClientError::Build { source })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: credentials.authorization_header(),
        })
    }

    async fn parse_response(url: &str, response: Response) -> ClientResult<ApiResponse> {
        let status = response.status();
        let raw_body = response
            .text()
            .await
            .map_err(|e| ClientError::from_reqwest(url, e))?;
        let body = serde_json::from_str(&raw_body).ok();

        trace!("{} -> {} {}", url, status, raw_body);

        Ok(ApiResponse {
            status,
            body,
            raw_body,
        })
    }
}

#[async_trait]
impl HubApi for HubClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str) -> ClientResult<ApiResponse> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, &self.authorization)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(&url, e))?;
        Self::parse_response(&url, response).await
    }

    async fn put(&self, path: &str) -> ClientResult<ApiResponse> {
        let url = self.url(path);
        debug!("PUT {}", url);

        let response = self
            .client
            .put(&url)
            .header(header::AUTHORIZATION, &self.authorization)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(&url, e))?;
        Self::parse_response(&url, response).await
    }
}
