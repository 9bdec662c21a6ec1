//! HTTP transport abstraction for the collector and Discord REST calls.
//!
//! Everything the client sends goes through [`HttpTransport`], so tests can
//! swap the reqwest-backed [`DefaultHttpTransport`] for an in-memory fake.
//! Non-2xx answers are reported as [`TransportFailure::Status`], so callers
//! only ever see a success or a typed failure.

use async_trait::async_trait;
use http::Method;
use serde_json::Value;

use discolytics_common::TransportFailure;

/// A single outgoing request. Headers are applied in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.push((key.to_string(), value.into()));
        self
    }

    /// Attaches a JSON body along with its `Content-Type`.
    pub fn json(mut self, body: Value) -> Self {
        self.headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        self.body = Some(body);
        self
    }

    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// A 2xx answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, TransportFailure> {
        serde_json::from_str(&self.body)
            .map_err(|e| TransportFailure::Decode(e.to_string()))
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportFailure>;
}

#[derive(Clone, Default)]
pub struct DefaultHttpTransport {
    client: reqwest::Client,
}

impl DefaultHttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for DefaultHttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportFailure> {
        let mut builder = self.client.request(request.method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportFailure::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        if (200..300).contains(&status) {
            Ok(ApiResponse { status, body })
        } else {
            Err(TransportFailure::Status { status, body })
        }
    }
}
