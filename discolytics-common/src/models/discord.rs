// THESE ARE PARTIAL TYPES - only the fields the telemetry client reads.

use serde::Deserialize;

fn legacy_discriminator() -> String {
    "0".to_string()
}

/// `GET /users/@me`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default = "legacy_discriminator")]
    pub discriminator: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// `GET /applications/@me`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiscordApplication {
    pub id: String,
    #[serde(default)]
    pub approximate_guild_count: Option<u64>,
}
