//! Request and response bodies exchanged with the Discolytics collector.
//!
//! Field names follow the collector's camelCase JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::{ClientType, InteractionType};

/// One observed gateway dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEvent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
}

/// One observed `INTERACTION_CREATE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingInteraction {
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
}

/// One completed command invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCommand {
    pub name: String,
    pub user_id: String,
    #[serde(rename = "duration")]
    pub duration_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct EventBatch<'a> {
    pub events: &'a [PendingEvent],
}

#[derive(Debug, Serialize)]
pub struct InteractionBatch<'a> {
    pub interactions: &'a [PendingInteraction],
}

#[derive(Debug, Serialize)]
pub struct CommandBatch<'a> {
    pub commands: &'a [PendingCommand],
}

/// Body of `cpuUsage` and `memUsage`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub value: f64,
    pub client_type: ClientType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GuildCountReport {
    pub count: u64,
}

/// `GET /bots/{botId}` response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotProfile {
    #[serde(default)]
    pub capture_events: Vec<String>,
    #[serde(default)]
    pub bot_user_id: Option<String>,
    #[serde(default)]
    pub bot_user_name: Option<String>,
    #[serde(default)]
    pub bot_user_avatar: Option<String>,
    /// Epoch milliseconds of the last accepted profile patch.
    #[serde(default)]
    pub profile_last_updated: Option<i64>,
}

/// `PATCH /bots/{botId}` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_user_avatar: Option<String>,
    pub client_type: ClientType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_version: Option<String>,
}

impl ProfilePatch {
    /// A patch that only refreshes client metadata.
    pub fn client_metadata(client_type: ClientType, client_version: Option<String>) -> Self {
        Self {
            bot_user_id: None,
            bot_user_name: None,
            bot_user_avatar: None,
            client_type,
            client_version,
        }
    }
}
