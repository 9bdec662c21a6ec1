// File: discolytics-core/tests/test_utils/helpers.rs

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use http::Method;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::Notify;

use discolytics_common::models::{LogConfig, LogLevel};
use discolytics_core::http::{ApiRequest, ApiResponse, HttpTransport};
use discolytics_core::logger::LogSink;
use discolytics_core::resources::{ResourceSample, ResourceSampler};
use discolytics_core::{ClientConfig, ClientConfigBuilder, Discolytics, TransportFailure};

pub const BOT_ID: &str = "123";
pub const API_KEY: &str = "test-api-key";
pub const DATA_URL: &str = "http://data.test/api";
pub const API_URL: &str = "http://api.test/api";
pub const DISCORD_URL: &str = "http://discord.test/api/v10";

#[derive(Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    NetworkError,
    /// Waits for the notify before answering 200.
    Hold(Arc<Notify>),
}

struct Route {
    method: Method,
    suffix: String,
    reply: Reply,
}

/// In-memory transport that records every request and answers from a route table.
/// Unmatched requests get `200 {}`.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<ApiRequest>>,
    routes: Mutex<Vec<Route>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Later registrations for the same route win.
    pub fn on(&self, method: Method, suffix: &str, reply: Reply) {
        self.routes.lock().insert(
            0,
            Route {
                method,
                suffix: suffix.to_string(),
                reply,
            },
        );
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn requests_to(&self, method: Method, suffix: &str) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method && r.url.ends_with(suffix))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.requests.lock().clear();
    }

    fn reply_for(&self, request: &ApiRequest) -> Reply {
        self.routes
            .lock()
            .iter()
            .find(|r| r.method == request.method && request.url.ends_with(&r.suffix))
            .map(|r| r.reply.clone())
            .unwrap_or_else(|| Reply::Json(json!({})))
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportFailure> {
        let reply = self.reply_for(&request);
        self.requests.lock().push(request);
        match reply {
            Reply::Json(body) => Ok(ApiResponse {
                status: 200,
                body: body.to_string(),
            }),
            Reply::Status(status) if (200..300).contains(&status) => Ok(ApiResponse {
                status,
                body: String::new(),
            }),
            Reply::Status(status) => Err(TransportFailure::Status {
                status,
                body: "error".to_string(),
            }),
            Reply::NetworkError => Err(TransportFailure::Network("connection refused".into())),
            Reply::Hold(gate) => {
                gate.notified().await;
                Ok(ApiResponse {
                    status: 200,
                    body: "{}".to_string(),
                })
            }
        }
    }
}

pub struct StaticSampler(pub Option<ResourceSample>);

impl ResourceSampler for StaticSampler {
    fn sample(&self) -> Option<ResourceSample> {
        self.0
    }
}

#[derive(Default)]
pub struct CapturingSink {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl CapturingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().clone()
    }

    pub fn at(&self, level: LogLevel) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl LogSink for CapturingSink {
    fn write(&self, level: LogLevel, message: &str) {
        self.lines.lock().push((level, message.to_string()));
    }
}

pub fn config_builder() -> ClientConfigBuilder {
    ClientConfig::builder(BOT_ID, API_KEY)
        .data_api_url(DATA_URL)
        .api_url(API_URL)
        .discord_api_url(DISCORD_URL)
        .auth("secret-token")
}

pub fn secondary_config() -> ClientConfig {
    config_builder().primary(false).build().expect("valid config")
}

pub fn primary_config() -> ClientConfig {
    config_builder().build().expect("valid config")
}

pub fn debug_logging() -> LogConfig {
    LogConfig::default().set(LogLevel::Debug, true)
}

pub fn sample() -> ResourceSample {
    ResourceSample {
        cpu_percent: 12.5,
        memory_bytes: 64 * 1024 * 1024,
    }
}

/// A client wired to the recording transport and a fixed resource sample.
pub fn client_with(
    config: ClientConfig,
    transport: Arc<RecordingTransport>,
    sink: Arc<CapturingSink>,
) -> Discolytics {
    Discolytics::builder(config)
        .transport(transport)
        .sampler(Arc::new(StaticSampler(Some(sample()))))
        .log_sink(sink)
        .build()
        .expect("client builds")
}

pub fn body_of(request: &ApiRequest) -> Value {
    request.body.clone().unwrap_or(Value::Null)
}
