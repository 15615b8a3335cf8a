//! The transport seam: "execute one HTTP request, get back status + body".
//!
//! The engine only ever talks to the server through [`Transport`], so tests
//! script responses without a network and the production [`HttpTransport`]
//! stays a thin reqwest wrapper. One transport may be shared by any number
//! of sessions; shutting it down invalidates all of them.

use crate::errors::AutomationError;
use async_trait::async_trait;
use serde_json::Value;
use std::borrow::Cow;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WireRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

impl WireRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body),
        }
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            url: url.into(),
            body: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl WireResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text for error messages; lossy on purpose.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: WireRequest) -> Result<WireResponse, AutomationError>;

    /// Best-effort teardown. Called when session reconciliation fails and
    /// when a driver is shut down explicitly.
    async fn shutdown(&self) {}
}

/// Production transport over reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, AutomationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AutomationError::Transport(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: WireRequest) -> Result<WireResponse, AutomationError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.client.request(method, &request.url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await.map_err(|e| {
            AutomationError::Transport(format!(
                "{} {} failed: {e}",
                request.method.as_str(),
                request.url
            ))
        })?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                AutomationError::Transport(format!(
                    "reading response body from {} failed: {e}",
                    request.url
                ))
            })?
            .to_vec();
        Ok(WireResponse { status, body })
    }

    async fn shutdown(&self) {
        // reqwest closes pooled connections on drop; nothing else to tear down.
        debug!("HTTP transport shut down");
    }
}
