//! HTTP transport capability.
//!
//! The recognition client speaks to the service through [`HttpTransport`],
//! which performs exactly one request per call and reports either the status
//! and body, or a [`TransportError`]. Deadlines are applied by the caller,
//! not here, so every transport is bounded the same way.

#![allow(async_fn_in_trait)]

use facegate_core::constants::CONTENT_TYPE_JSON;
use reqwest::header::CONTENT_TYPE;
use tracing::trace;

use crate::error::TransportError;
use crate::mock::MockTransport;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 with `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// One-shot HTTP exchange.
pub trait HttpTransport: Send + Sync {
    /// POST `body` to `url` with `Content-Type: application/json`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if no complete response was received.
    /// Non-200 statuses are not errors at this level.
    async fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, TransportError>;

    /// GET `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if no complete response was received.
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by `reqwest`.
///
/// No client-level timeout is configured; the recognition client wraps each
/// call in its own deadline.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn finish(
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<HttpResponse, TransportError> {
        let response = response.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;
        trace!(status, bytes = body.len(), "HTTP response received");
        Ok(HttpResponse { status, body })
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else if e.is_request() || e.is_builder() {
        TransportError::Send(e.to_string())
    } else {
        TransportError::ConnectionLost(e.to_string())
    }
}

impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, TransportError> {
        trace!(url, bytes = body.len(), "POST");
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(body)
            .send()
            .await;
        Self::finish(response).await
    }

    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        trace!(url, "GET");
        let response = self.client.get(url).send().await;
        Self::finish(response).await
    }
}

/// Enum wrapper for transport dispatch.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum AnyTransport {
    Reqwest(ReqwestTransport),
    Mock(MockTransport),
}

impl HttpTransport for AnyTransport {
    async fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, TransportError> {
        match self {
            Self::Reqwest(transport) => transport.post_json(url, body).await,
            Self::Mock(transport) => transport.post_json(url, body).await,
        }
    }

    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        match self {
            Self::Reqwest(transport) => transport.get(url).await,
            Self::Mock(transport) => transport.get(url).await,
        }
    }
}
