// File: src/gateway/raw.rs

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info};

use discolytics_common::Error;
use discolytics_common::models::ClientType;

use super::{DispatchSink, GatewayAdapter, RawDispatch};

/// Adapter for websocket managers that expose raw JSON gateway frames.
///
/// The host forwards every frame it receives into the channel; the adapter
/// stops when all senders are dropped.
pub struct RawPayloadAdapter {
    frames: mpsc::Receiver<Value>,
    token: Option<String>,
    client_type: ClientType,
}

impl RawPayloadAdapter {
    pub fn new(frames: mpsc::Receiver<Value>, token: Option<String>) -> Self {
        Self {
            frames,
            token,
            client_type: ClientType::DiscordJsWs,
        }
    }

    /// Creates the adapter together with the sender the host writes frames into.
    pub fn channel(buffer: usize, token: Option<String>) -> (mpsc::Sender<Value>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self::new(rx, token))
    }

    pub fn with_client_type(mut self, client_type: ClientType) -> Self {
        self.client_type = client_type;
        self
    }
}

#[async_trait]
impl GatewayAdapter for RawPayloadAdapter {
    fn client_type(&self) -> ClientType {
        self.client_type
    }

    fn resolve_auth_token(&self) -> Option<String> {
        self.token.clone()
    }

    async fn subscribe(mut self, sink: DispatchSink) -> Result<(), Error> {
        while let Some(frame) = self.frames.recv().await {
            match RawDispatch::from_payload(&frame) {
                Some(dispatch) => sink.dispatch(dispatch),
                None => debug!("Skipping non-dispatch frame"),
            }
        }
        info!("Raw gateway frame channel closed");
        Ok(())
    }
}
