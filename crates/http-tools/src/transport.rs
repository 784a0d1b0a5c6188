//! Outbound HTTP boundary.
//!
//! The dispatcher only ever hands a fully-resolved [`PreparedRequest`] to an [`HttpTransport`]
//! and gets back status + bytes. The default implementation uses `reqwest`; tests plug in their
//! own.

use crate::error::{HttpToolsError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// A concrete request derived from an operation and an argument bag.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub operation: String,
    pub method: Method,
    /// Final URL, query string included.
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl PreparedRequest {
    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What came back over the wire, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute one request.
    ///
    /// Non-success statuses are *not* errors at this layer; only failures to complete the
    /// exchange are.
    async fn send(&self, request: &PreparedRequest, timeout: Option<Duration>)
    -> Result<RawResponse>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: &PreparedRequest,
        timeout: Option<Duration>,
    ) -> Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());
        for (k, v) in &request.headers {
            builder = builder.header(k, v);
        }
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body).map_err(|e| {
                HttpToolsError::Transport {
                    status: None,
                    message: format!("Failed to encode request body: {e}"),
                    details: None,
                }
            })?);
        }
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(std::string::ToString::to_string);
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}
