//! HTTP client for the Tistory skin service.
//!
//! Authentication is the blog's `TSSESSION` cookie, taken from the manifest's
//! `ts_session` field.

use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::SkinService;
use crate::models::{RemoteCredentials, SkinSession};

/// Handshake endpoint, relative to the blog URL.
pub const PREPARE_PATH: &str = "/manage/design/skin/prepare.json";

/// Session cookie name expected by the service.
pub const SESSION_COOKIE: &str = "TSSESSION";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: session token missing or expired")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),
}

/// HTTP client for one blog's skin service.
#[derive(Debug, Clone)]
pub struct SkinClient {
    base_url: String,
    session_token: String,
    client: Client,
}

impl SkinClient {
    pub fn new(credentials: &RemoteCredentials) -> Self {
        Self::with_client(Client::new(), credentials)
    }

    /// Reuse an existing connection pool.
    pub fn with_client(client: Client, credentials: &RemoteCredentials) -> Self {
        Self {
            base_url: credentials.site_url.trim_end_matches('/').to_string(),
            session_token: credentials.session_token.clone(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request carrying the session cookie.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, &url).header(
            header::COOKIE,
            format!("{}={}", SESSION_COOKIE, self.session_token),
        )
    }

    /// Handle response, converting HTTP errors to ClientError.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Unauthorized),
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            }
        }
    }
}

impl SkinService for SkinClient {
    async fn prepare(&self) -> Result<SkinSession, ClientError> {
        tracing::debug!(url = %self.base_url, "Requesting skin handshake");
        let response = self
            .request(reqwest::Method::GET, PREPARE_PATH)
            .send()
            .await?;
        self.handle_response(response).await
    }
}
