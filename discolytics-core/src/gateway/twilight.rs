// File: src/gateway/twilight.rs

use async_trait::async_trait;
use tracing::{info, trace, warn};
use twilight_gateway::{Event, EventTypeFlags, Intents, Shard, ShardId, StreamExt};

use discolytics_common::Error;
use discolytics_common::models::ClientType;

use super::{DispatchSink, GatewayAdapter, RawDispatch};

/// Listens to a single twilight shard.
pub struct TwilightAdapter {
    shard: Shard,
    token: Option<String>,
}

impl TwilightAdapter {
    pub fn new(token: String, intents: Intents) -> Self {
        let shard = Shard::new(ShardId::ONE, token.clone(), intents);
        Self {
            shard,
            token: Some(token),
        }
    }

    /// Wraps an already configured shard; its own token is used unless
    /// `token` overrides it.
    pub fn from_shard(shard: Shard, token: Option<String>) -> Self {
        Self { shard, token }
    }
}

/// Converts a twilight event; gateway-internal events (heartbeats, hello,
/// reconnects) have no dispatch name and are skipped.
pub fn dispatch_from_event(event: &Event) -> Option<RawDispatch> {
    let name = event.kind().name()?.to_string();
    let guild_id = event.guild_id().map(|id| id.to_string());
    let interaction_type = match event {
        Event::InteractionCreate(interaction) => {
            Some(interaction.kind as u8).filter(|t| *t != 0)
        }
        _ => None,
    };
    Some(RawDispatch {
        name,
        guild_id,
        interaction_type,
    })
}

#[async_trait]
impl GatewayAdapter for TwilightAdapter {
    fn client_type(&self) -> ClientType {
        ClientType::Twilight
    }

    fn resolve_auth_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| Some(self.shard.config().token().to_string()))
    }

    async fn subscribe(mut self, sink: DispatchSink) -> Result<(), Error> {
        let shard_id = self.shard.id().number();
        info!("Shard {shard_id} listening for telemetry.");

        while let Some(item) = self.shard.next_event(EventTypeFlags::all()).await {
            match item {
                Ok(event) => match dispatch_from_event(&event) {
                    Some(dispatch) => sink.dispatch(dispatch),
                    None => trace!("Shard {shard_id} => non-dispatch event {:?}", event.kind()),
                },
                Err(err) => {
                    warn!("Shard {shard_id} => error receiving event: {err:?}");
                }
            }
        }

        warn!("Shard {shard_id} event loop ended.");
        Ok(())
    }
}
