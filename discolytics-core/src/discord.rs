// File: discolytics-core/src/discord.rs

use std::sync::Arc;

use http::Method;

use discolytics_common::models::{DiscordApplication, DiscordUser};
use discolytics_common::TransportFailure;

use crate::http::{ApiRequest, HttpTransport};

pub const CDN_URL: &str = "https://cdn.discordapp.com";

/// Reads from the Discord REST API with the bot token.
#[derive(Clone)]
pub struct DiscordRest {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    auth: String,
}

impl DiscordRest {
    /// `auth` must already be in `Bot <token>` form.
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str, auth: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth: auth.to_string(),
        }
    }

    /// `GET /users/@me`
    pub async fn current_user(&self) -> Result<DiscordUser, TransportFailure> {
        let req = ApiRequest::new(Method::GET, format!("{}/users/@me", self.base_url))
            .header("Authorization", self.auth.as_str());
        self.transport.send(req).await?.json()
    }

    /// `GET /applications/@me`
    pub async fn current_application(&self) -> Result<DiscordApplication, TransportFailure> {
        let req = ApiRequest::new(Method::GET, format!("{}/applications/@me", self.base_url))
            .header("Authorization", self.auth.as_str());
        self.transport.send(req).await?.json()
    }
}

/// Index of the default avatar Discord shows for a user without a custom one.
///
/// Migrated usernames (discriminator `"0"`) use `(id >> 22) % 6`, legacy
/// tags use `discriminator % 5`.
pub fn default_avatar_index(user_id: &str, discriminator: &str) -> u64 {
    if discriminator == "0" {
        user_id.parse::<u64>().map(|id| (id >> 22) % 6).unwrap_or(0)
    } else {
        discriminator.parse::<u64>().map(|d| d % 5).unwrap_or(0)
    }
}

pub fn avatar_url(user: &DiscordUser) -> String {
    match user.avatar.as_deref() {
        Some(hash) if !hash.is_empty() => {
            format!("{}/avatars/{}/{}.png", CDN_URL, user.id, hash)
        }
        _ => format!(
            "{}/embed/avatars/{}.png",
            CDN_URL,
            default_avatar_index(&user.id, &user.discriminator)
        ),
    }
}
