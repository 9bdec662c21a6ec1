// File: src/gateway/mod.rs
//
// Framework adapters feed raw gateway dispatches into a client. Each adapter
// only knows how to read its framework's event stream and where the bot token
// lives; everything else is shared here.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use discolytics_common::models::{ClientType, InteractionType};
use discolytics_common::{ClientConfigBuilder, Error};

use crate::client::{ClientBuilder, Discolytics};
use crate::identity::ObserverId;

pub mod raw;
pub mod twilight;

pub use raw::RawPayloadAdapter;
pub use twilight::TwilightAdapter;

pub const INTERACTION_CREATE: &str = "INTERACTION_CREATE";

/// What an adapter extracts from one gateway dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDispatch {
    pub name: String,
    pub guild_id: Option<String>,
    pub interaction_type: Option<u8>,
}

impl RawDispatch {
    /// Reads a `{op, t, d}` gateway frame. Non-dispatch frames yield `None`.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        if let Some(op) = payload.get("op").and_then(Value::as_u64) {
            if op != 0 {
                return None;
            }
        }
        let name = payload.get("t")?.as_str()?.to_string();
        let data = payload.get("d");

        let guild_id = data
            .and_then(|d| d.get("guild_id"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let interaction_type = if name == INTERACTION_CREATE {
            data.and_then(|d| d.get("type"))
                .and_then(Value::as_u64)
                .filter(|t| *t != 0)
                .and_then(|t| u8::try_from(t).ok())
        } else {
            None
        };

        Some(Self {
            name,
            guild_id,
            interaction_type,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchFilter {
    /// Record every dispatch.
    #[default]
    All,
    /// Record only names in the server's capture-events list (all of them while the list is empty).
    CaptureEvents,
}

/// Handed to an adapter's `subscribe`; turns dispatches into client records.
#[derive(Clone)]
pub struct DispatchSink {
    client: Discolytics,
    filter: DispatchFilter,
    allowlist: Arc<RwLock<HashSet<String>>>,
    _subscription: Option<Arc<CaptureSubscription>>,
}

/// Removes the allowlist observer once the last sink clone is gone.
struct CaptureSubscription {
    client: Discolytics,
    id: ObserverId,
}

impl Drop for CaptureSubscription {
    fn drop(&mut self) {
        self.client.remove_capture_events_observer(self.id);
    }
}

impl DispatchSink {
    pub fn new(client: Discolytics, filter: DispatchFilter) -> Self {
        let allowlist = Arc::new(RwLock::new(
            client.capture_events().into_iter().collect::<HashSet<_>>(),
        ));
        let subscription = (filter == DispatchFilter::CaptureEvents).then(|| {
            let shared = allowlist.clone();
            let id = client.on_capture_events_update(move |events| {
                *shared.write() = events.iter().cloned().collect();
            });
            Arc::new(CaptureSubscription {
                client: client.clone(),
                id,
            })
        });
        Self {
            client,
            filter,
            allowlist,
            _subscription: subscription,
        }
    }

    fn allows(&self, name: &str) -> bool {
        match self.filter {
            DispatchFilter::All => true,
            DispatchFilter::CaptureEvents => {
                let allow = self.allowlist.read();
                allow.is_empty() || allow.contains(name)
            }
        }
    }

    pub fn dispatch(&self, dispatch: RawDispatch) {
        if let Some(kind) = dispatch.interaction_type {
            self.client
                .record_interaction(InteractionType::from(kind), dispatch.guild_id.clone());
        }
        if self.allows(&dispatch.name) {
            self.client.record_event(dispatch.name, dispatch.guild_id);
        }
    }

    pub fn client(&self) -> &Discolytics {
        &self.client
    }
}

/// A bot framework the client can listen to.
#[async_trait]
pub trait GatewayAdapter: Send + Sized + 'static {
    fn client_type(&self) -> ClientType;

    /// The framework's bot token, if it has one.
    fn resolve_auth_token(&self) -> Option<String>;

    /// Pumps dispatches into `sink` until the framework's stream ends.
    async fn subscribe(self, sink: DispatchSink) -> Result<(), Error>;
}

/// An adapter bound to the client it reports through.
pub struct Tracker<A: GatewayAdapter> {
    adapter: A,
    client: Discolytics,
    filter: DispatchFilter,
}

impl<A: GatewayAdapter> Tracker<A> {
    pub fn new(adapter: A, config: ClientConfigBuilder) -> Result<Self, Error> {
        Self::new_with(adapter, config, |builder| builder)
    }

    /// Like [`Tracker::new`], letting the caller swap client collaborators.
    pub fn new_with<F>(adapter: A, config: ClientConfigBuilder, customize: F) -> Result<Self, Error>
    where
        F: FnOnce(ClientBuilder) -> ClientBuilder,
    {
        let token = adapter
            .resolve_auth_token()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                Error::Auth(format!("Auth not passed to {} client", adapter.client_type()))
            })?;

        let config = config
            .client_type(adapter.client_type())
            .auth(token)
            .build()?;
        let client = customize(Discolytics::builder(config)).build()?;

        Ok(Self {
            adapter,
            client,
            filter: DispatchFilter::All,
        })
    }

    pub fn filter(mut self, filter: DispatchFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Handle for `start_command` and friends; stays valid after `run`.
    pub fn client(&self) -> &Discolytics {
        &self.client
    }

    pub fn start_command(
        &self,
        name: impl Into<String>,
        user_id: impl Into<String>,
    ) -> crate::command::CommandTimer {
        self.client.start_command(name, user_id)
    }

    /// Starts the client, listens until the adapter's stream ends, then stops
    /// the client (which flushes what is left).
    pub async fn run(self) -> Result<(), Error> {
        self.client.start().await?;
        let sink = DispatchSink::new(self.client.clone(), self.filter);
        let result = self.adapter.subscribe(sink).await;
        self.client.stop().await;
        result
    }
}
