// File: discolytics-core/src/api.rs

use std::sync::Arc;

use http::Method;
use serde::Serialize;
use serde_json::Value;

use discolytics_common::models::{
    BotProfile, ClientType, CommandBatch, EventBatch, GuildCountReport, InteractionBatch,
    PendingCommand, PendingEvent, PendingInteraction, ProfilePatch, UsageReport,
};
use discolytics_common::{ClientConfig, TransportFailure};

use crate::http::{ApiRequest, ApiResponse, HttpTransport};

/// What network-facing client operations hand back instead of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
}

impl Outcome {
    pub const OK: Outcome = Outcome { success: true };
    pub const FAILED: Outcome = Outcome { success: false };
}

impl<T> From<&Result<T, TransportFailure>> for Outcome {
    fn from(res: &Result<T, TransportFailure>) -> Self {
        Outcome {
            success: res.is_ok(),
        }
    }
}

/// Serializes a request body into the JSON value the transport sends.
pub fn encode_body<T: Serialize>(body: &T) -> Result<Value, TransportFailure> {
    serde_json::to_value(body).map_err(|e| TransportFailure::Encode(e.to_string()))
}

/// Typed calls against the Discolytics collector.
///
/// Profile reads and writes go to the API host; everything else goes to the
/// data host. Each call authenticates with the raw API key.
#[derive(Clone)]
pub struct CollectorApi {
    transport: Arc<dyn HttpTransport>,
    config: Arc<ClientConfig>,
}

impl CollectorApi {
    pub fn new(transport: Arc<dyn HttpTransport>, config: Arc<ClientConfig>) -> Self {
        Self { transport, config }
    }

    fn api_route(&self, suffix: &str) -> String {
        format!("{}/bots/{}{}", self.config.api_url(), self.config.bot_id(), suffix)
    }

    fn data_route(&self, suffix: &str) -> String {
        format!(
            "{}/bots/{}{}",
            self.config.data_api_url(),
            self.config.bot_id(),
            suffix
        )
    }

    fn request(&self, method: Method, url: String) -> ApiRequest {
        ApiRequest::new(method, url).header("Authorization", self.config.api_key())
    }

    async fn post_json<T: Serialize>(
        &self,
        url: String,
        body: &T,
    ) -> Result<ApiResponse, TransportFailure> {
        let body = encode_body(body)?;
        self.transport
            .send(self.request(Method::POST, url).json(body))
            .await
    }

    pub async fn get_bot(&self) -> Result<BotProfile, TransportFailure> {
        let resp = self
            .transport
            .send(self.request(Method::GET, self.api_route("")))
            .await?;
        resp.json()
    }

    pub async fn patch_bot(&self, patch: &ProfilePatch) -> Result<(), TransportFailure> {
        let body = encode_body(patch)?;
        self.transport
            .send(self.request(Method::PATCH, self.api_route("")).json(body))
            .await?;
        Ok(())
    }

    pub async fn post_events(&self, events: &[PendingEvent]) -> Result<(), TransportFailure> {
        self.post_json(self.data_route("/events"), &EventBatch { events })
            .await?;
        Ok(())
    }

    pub async fn post_interactions(
        &self,
        interactions: &[PendingInteraction],
    ) -> Result<(), TransportFailure> {
        self.post_json(
            self.data_route("/interactions"),
            &InteractionBatch { interactions },
        )
        .await?;
        Ok(())
    }

    pub async fn post_commands(&self, commands: &[PendingCommand]) -> Result<(), TransportFailure> {
        self.post_json(self.data_route("/commands"), &CommandBatch { commands })
            .await?;
        Ok(())
    }

    /// Single-shot variant used by [`crate::CommandMode::Immediate`].
    pub async fn post_command(&self, command: &PendingCommand) -> Result<(), TransportFailure> {
        self.post_json(self.data_route("/command"), command).await?;
        Ok(())
    }

    pub async fn post_cpu_usage(&self, value: f64) -> Result<(), TransportFailure> {
        let report = UsageReport {
            value,
            client_type: self.client_type(),
        };
        self.post_json(self.data_route("/cpuUsage"), &report).await?;
        Ok(())
    }

    pub async fn post_mem_usage(&self, value: f64) -> Result<(), TransportFailure> {
        let report = UsageReport {
            value,
            client_type: self.client_type(),
        };
        self.post_json(self.data_route("/memUsage"), &report).await?;
        Ok(())
    }

    pub async fn post_heartbeat(&self) -> Result<(), TransportFailure> {
        self.transport
            .send(self.request(Method::POST, self.data_route("/heartbeat")))
            .await?;
        Ok(())
    }

    pub async fn post_guild_count(&self, count: u64) -> Result<(), TransportFailure> {
        self.post_json(self.data_route("/guildCount"), &GuildCountReport { count })
            .await?;
        Ok(())
    }

    pub fn client_type(&self) -> ClientType {
        self.config.client_type()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}
