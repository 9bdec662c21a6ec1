//! src/buffers.rs
//!
//! In-memory queues for events, interactions and commands. A flush takes the
//! whole contents of a queue under its lock and leaves it empty before any
//! request is started, so anything recorded while a batch is in flight lands
//! in the next batch. Failed batches are dropped, never re-queued.

use parking_lot::Mutex;

use discolytics_common::models::{
    InteractionType, PendingCommand, PendingEvent, PendingInteraction,
};
use discolytics_common::TransportFailure;

use crate::api::CollectorApi;
use crate::logger::Logger;

#[derive(Default)]
pub struct BatchBuffers {
    events: Mutex<Vec<PendingEvent>>,
    interactions: Mutex<Vec<PendingInteraction>>,
    commands: Mutex<Vec<PendingCommand>>,
}

impl BatchBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_event(&self, name: impl Into<String>, guild_id: Option<String>) {
        self.events.lock().push(PendingEvent {
            name: name.into(),
            guild_id,
        });
    }

    pub fn push_interaction(&self, interaction_type: InteractionType, guild_id: Option<String>) {
        self.interactions.lock().push(PendingInteraction {
            interaction_type,
            guild_id,
        });
    }

    pub fn push_command(&self, command: PendingCommand) {
        self.commands.lock().push(command);
    }

    pub fn take_events(&self) -> Vec<PendingEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn take_interactions(&self) -> Vec<PendingInteraction> {
        std::mem::take(&mut *self.interactions.lock())
    }

    pub fn take_commands(&self) -> Vec<PendingCommand> {
        std::mem::take(&mut *self.commands.lock())
    }

    pub fn pending(&self) -> PendingCounts {
        PendingCounts {
            events: self.events.lock().len(),
            interactions: self.interactions.lock().len(),
            commands: self.commands.lock().len(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingCounts {
    pub events: usize,
    pub interactions: usize,
    pub commands: usize,
}

/// Result of one flush pass; `None` means the buffer was empty and nothing was sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub events: Option<BatchResult>,
    pub interactions: Option<BatchResult>,
    pub commands: Option<BatchResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchResult {
    pub size: usize,
    pub success: bool,
}

/// Drains all three buffers and sends each non-empty snapshot as one batch.
pub async fn flush_all(buffers: &BatchBuffers, api: &CollectorApi, logger: &Logger) -> FlushReport {
    let events = buffers.take_events();
    let interactions = buffers.take_interactions();
    let commands = buffers.take_commands();

    let (events, interactions, commands) = tokio::join!(
        flush_events(events, api, logger),
        flush_interactions(interactions, api, logger),
        flush_commands(commands, api, logger),
    );

    FlushReport {
        events,
        interactions,
        commands,
    }
}

async fn flush_events(
    batch: Vec<PendingEvent>,
    api: &CollectorApi,
    logger: &Logger,
) -> Option<BatchResult> {
    if batch.is_empty() {
        return None;
    }
    let in_flight = InFlight::new("events", batch.len(), logger);
    let res = api.post_events(&batch).await;
    Some(in_flight.settle(res.err()))
}

async fn flush_interactions(
    batch: Vec<PendingInteraction>,
    api: &CollectorApi,
    logger: &Logger,
) -> Option<BatchResult> {
    if batch.is_empty() {
        return None;
    }
    let in_flight = InFlight::new("interactions", batch.len(), logger);
    let res = api.post_interactions(&batch).await;
    Some(in_flight.settle(res.err()))
}

async fn flush_commands(
    batch: Vec<PendingCommand>,
    api: &CollectorApi,
    logger: &Logger,
) -> Option<BatchResult> {
    if batch.is_empty() {
        return None;
    }
    let in_flight = InFlight::new("commands", batch.len(), logger);
    let res = api.post_commands(&batch).await;
    Some(in_flight.settle(res.err()))
}

/// Tracks one batch on the wire. If the flush future is dropped before the
/// request settles, the batch is reported as lost.
struct InFlight<'a> {
    kind: &'static str,
    size: usize,
    logger: &'a Logger,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn new(kind: &'static str, size: usize, logger: &'a Logger) -> Self {
        Self {
            kind,
            size,
            logger,
            settled: false,
        }
    }

    fn settle(mut self, failure: Option<TransportFailure>) -> BatchResult {
        self.settled = true;
        report(self.kind, self.size, failure, self.logger)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.logger.error(format!(
                "Failed to post {} {}: request cancelled",
                self.size, self.kind
            ));
        }
    }
}

fn report(
    kind: &str,
    size: usize,
    failure: Option<TransportFailure>,
    logger: &Logger,
) -> BatchResult {
    match failure {
        None => {
            logger.debug(format!("Posted {} {}", size, kind));
            BatchResult { size, success: true }
        }
        Some(e) => {
            logger.error(format!("Failed to post {} {}: {}", size, kind, e));
            BatchResult {
                size,
                success: false,
            }
        }
    }
}
