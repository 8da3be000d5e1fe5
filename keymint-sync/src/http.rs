//! HTTP remote document provider.
//!
//! Talks to any endpoint that serves the document on GET and accepts a
//! full replacement on PUT (object stores, paste services, a tiny CRUD
//! endpoint). A 404 on fetch means the document does not exist yet.

use crate::remote::RemoteDocument;
use crate::{SyncError, SyncResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Configuration for the HTTP remote.
#[derive(Debug, Clone)]
pub struct HttpRemoteConfig {
    /// Full URL of the document.
    pub url: String,
    /// Optional bearer token sent with every request.
    pub bearer_token: Option<String>,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl HttpRemoteConfig {
    /// Creates a config for the given URL with a 10 second timeout and
    /// no authentication.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            bearer_token: None,
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

/// Remote document served over HTTP.
pub struct HttpRemote {
    client: Client,
    config: HttpRemoteConfig,
}

impl HttpRemote {
    /// Creates a provider from the given config.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Fetch`] if the HTTP client cannot be built.
    pub fn new(config: HttpRemoteConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SyncError::Fetch(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.bearer_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl RemoteDocument for HttpRemote {
    fn describe(&self) -> String {
        self.config.url.clone()
    }

    async fn fetch(&self) -> SyncResult<Option<String>> {
        let response = self
            .authorize(self.client.get(&self.config.url))
            .send()
            .await
            .map_err(|e| SyncError::Fetch(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(SyncError::Fetch(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let content = response
            .text()
            .await
            .map_err(|e| SyncError::Fetch(e.to_string()))?;
        Ok(Some(content))
    }

    async fn replace(&self, content: &str) -> SyncResult<()> {
        let response = self
            .authorize(self.client.put(&self.config.url))
            .header(reqwest::header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(content.to_string())
            .send()
            .await
            .map_err(|e| SyncError::Push(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SyncError::Push(format!(
                "unexpected status {}",
                response.status()
            )));
        }
        Ok(())
    }
}
