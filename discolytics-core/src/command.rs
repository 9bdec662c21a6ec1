// File: discolytics-core/src/command.rs

use std::sync::Arc;

use serde_json::Value;

use discolytics_common::models::PendingCommand;

use crate::api::{CollectorApi, Outcome};
use crate::buffers::BatchBuffers;
use crate::clock::Clock;
use crate::logger::Logger;

/// Where ended timers deliver their measurement.
#[derive(Clone)]
pub enum CommandSink {
    Buffered(Arc<BatchBuffers>),
    Immediate { api: CollectorApi, logger: Logger },
}

/// A running stopwatch for one command invocation.
///
/// The timer keeps no "ended" flag: calling [`CommandTimer::end`] twice
/// records two measurements from the same start.
#[derive(Clone)]
pub struct CommandTimer {
    name: String,
    user_id: String,
    started_at: i64,
    clock: Arc<dyn Clock>,
    sink: CommandSink,
}

impl CommandTimer {
    pub fn start(
        name: impl Into<String>,
        user_id: impl Into<String>,
        clock: Arc<dyn Clock>,
        sink: CommandSink,
    ) -> Self {
        let started_at = clock.now_millis();
        Self {
            name: name.into(),
            user_id: user_id.into(),
            started_at,
            clock,
            sink,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn started_at(&self) -> i64 {
        self.started_at
    }

    pub fn elapsed_ms(&self) -> i64 {
        (self.clock.now_millis() - self.started_at).max(0)
    }

    /// Builds the record `end` would deliver, without delivering it.
    pub fn measure(&self, metadata: Option<Value>) -> PendingCommand {
        PendingCommand {
            name: self.name.clone(),
            user_id: self.user_id.clone(),
            duration_ms: self.elapsed_ms(),
            metadata,
        }
    }

    pub async fn end(&self, metadata: Option<Value>) -> Outcome {
        let command = self.measure(metadata);
        match &self.sink {
            CommandSink::Buffered(buffers) => {
                buffers.push_command(command);
                Outcome::OK
            }
            CommandSink::Immediate { api, logger } => {
                let res = api.post_command(&command).await;
                match &res {
                    Ok(()) => logger.debug(format!(
                        "Posted command {} ({} ms)",
                        command.name, command.duration_ms
                    )),
                    Err(e) => logger.error(format!(
                        "Failed to post command {}: {}",
                        command.name, e
                    )),
                }
                Outcome::from(&res)
            }
        }
    }
}
