// File: discolytics-core/src/client.rs

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use discolytics_common::models::{BotIdentity, InteractionType, PendingCommand};
use discolytics_common::{ClientConfig, CommandMode, Error};

use crate::api::{CollectorApi, Outcome};
use crate::buffers::{BatchBuffers, FlushReport, PendingCounts, flush_all};
use crate::clock::{Clock, SystemClock};
use crate::command::{CommandSink, CommandTimer};
use crate::discord::DiscordRest;
use crate::http::{DefaultHttpTransport, HttpTransport};
use crate::identity::{IdentityManager, ObserverId};
use crate::logger::{LogSink, Logger, TracingSink};
use crate::resources::{self, ResourceSampler, SysinfoSampler};
use crate::scheduler::Scheduler;

/// The telemetry client. Cheap to clone; clones share buffers and timers.
#[derive(Clone)]
pub struct Discolytics {
    inner: Arc<Inner>,
}

struct Inner {
    config: Arc<ClientConfig>,
    api: CollectorApi,
    discord: Option<DiscordRest>,
    buffers: Arc<BatchBuffers>,
    identity: IdentityManager,
    sampler: Arc<dyn ResourceSampler>,
    clock: Arc<dyn Clock>,
    logger: Logger,
    scheduler: tokio::sync::Mutex<Option<Scheduler>>,
}

/// Swaps out the client's collaborators. Defaults are reqwest, the system
/// clock, a sysinfo sampler and `tracing` output.
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    clock: Option<Arc<dyn Clock>>,
    sampler: Option<Arc<dyn ResourceSampler>>,
    log_sink: Option<Arc<dyn LogSink>>,
}

impl ClientBuilder {
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn sampler(mut self, sampler: Arc<dyn ResourceSampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<Discolytics, Error> {
        let config = Arc::new(self.config);

        let auth = config.auth().filter(|t| !t.trim().is_empty());
        if config.is_primary() && auth.is_none() {
            return Err(Error::Auth(
                "a primary client needs a Discord auth token".into(),
            ));
        }

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(DefaultHttpTransport::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let sampler = self
            .sampler
            .unwrap_or_else(|| Arc::new(SysinfoSampler::new()));
        let sink = self.log_sink.unwrap_or_else(|| Arc::new(TracingSink));
        let logger = Logger::with_sink(config.log_config().clone(), sink);

        let api = CollectorApi::new(transport.clone(), config.clone());
        let discord =
            auth.map(|token| DiscordRest::new(transport.clone(), config.discord_api_url(), token));
        let identity = IdentityManager::new(
            api.clone(),
            discord.clone(),
            clock.clone(),
            logger.clone(),
        );

        Ok(Discolytics {
            inner: Arc::new(Inner {
                config,
                api,
                discord,
                buffers: Arc::new(BatchBuffers::new()),
                identity,
                sampler,
                clock,
                logger,
                scheduler: tokio::sync::Mutex::new(None),
            }),
        })
    }
}

impl Discolytics {
    /// Builds a client with the default collaborators.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder {
            config,
            transport: None,
            clock: None,
            sampler: None,
            log_sink: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn logger(&self) -> &Logger {
        &self.inner.logger
    }

    // ---- ingestion -------------------------------------------------------

    pub fn record_event(&self, name: impl Into<String>, guild_id: Option<String>) {
        self.inner.buffers.push_event(name, guild_id);
    }

    pub fn record_interaction(&self, kind: impl Into<InteractionType>, guild_id: Option<String>) {
        self.inner.buffers.push_interaction(kind.into(), guild_id);
    }

    pub fn record_command(
        &self,
        name: impl Into<String>,
        user_id: impl Into<String>,
        duration_ms: i64,
        metadata: Option<Value>,
    ) {
        self.inner.buffers.push_command(PendingCommand {
            name: name.into(),
            user_id: user_id.into(),
            duration_ms,
            metadata,
        });
    }

    /// Starts measuring a command. Ending the returned timer reports it
    /// according to the configured [`CommandMode`].
    pub fn start_command(&self, name: impl Into<String>, user_id: impl Into<String>) -> CommandTimer {
        let sink = match self.inner.config.command_mode() {
            CommandMode::Buffered => CommandSink::Buffered(self.inner.buffers.clone()),
            CommandMode::Immediate => CommandSink::Immediate {
                api: self.inner.api.clone(),
                logger: self.inner.logger.clone(),
            },
        };
        CommandTimer::start(name, user_id, self.inner.clock.clone(), sink)
    }

    pub fn pending(&self) -> PendingCounts {
        self.inner.buffers.pending()
    }

    // ---- network operations ---------------------------------------------

    pub async fn flush(&self) -> FlushReport {
        self.inner.flush().await
    }

    pub async fn register_client_metadata(&self) -> Outcome {
        self.inner.identity.register_client_metadata().await
    }

    pub async fn sync_profile(&self) -> Outcome {
        self.inner.identity.sync_profile().await
    }

    pub async fn report_resource_usage(&self) -> Outcome {
        resources::report_resource_usage(
            self.inner.sampler.as_ref(),
            &self.inner.api,
            &self.inner.logger,
        )
        .await
    }

    pub async fn send_heartbeat(&self) -> Outcome {
        resources::send_heartbeat(&self.inner.api, &self.inner.logger).await
    }

    pub async fn report_guild_count(&self) -> Outcome {
        match &self.inner.discord {
            Some(discord) => {
                resources::report_guild_count(discord, &self.inner.api, &self.inner.logger).await
            }
            None => {
                self.inner
                    .logger
                    .error("Guild count needs a Discord auth token");
                Outcome::FAILED
            }
        }
    }

    // ---- identity ---------------------------------------------------------

    pub fn identity(&self) -> BotIdentity {
        self.inner.identity.identity()
    }

    pub fn capture_events(&self) -> Vec<String> {
        self.inner.identity.capture_events()
    }

    pub fn on_capture_events_update<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        self.inner.identity.on_capture_events_update(callback)
    }

    pub fn remove_capture_events_observer(&self, id: ObserverId) -> bool {
        self.inner.identity.remove_capture_events_observer(id)
    }

    pub fn capture_events_observers(&self) -> usize {
        self.inner.identity.observer_count()
    }

    // ---- lifecycle --------------------------------------------------------

    /// Spawns the flush timer and, on a primary client, the startup
    /// registration plus the profile, resource, heartbeat and guild-count
    /// timers. Returns `Ok(false)` if the client is already running.
    pub async fn start(&self) -> Result<bool, Error> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(Error::Platform("start() needs a tokio runtime".into()));
        }

        let mut slot = self.inner.scheduler.lock().await;
        if slot.is_some() {
            return Ok(false);
        }

        let intervals = *self.inner.config.intervals();
        let mut scheduler = Scheduler::new();

        let inner = self.inner.clone();
        scheduler.spawn_periodic_draining(
            "flush",
            intervals.flush,
            intervals.shutdown_grace,
            move || {
                let inner = inner.clone();
                async move {
                    inner.flush().await;
                }
            },
        );

        if self.inner.config.is_primary() {
            let inner = self.inner.clone();
            scheduler.spawn_once("startup", async move {
                inner.identity.register_client_metadata().await;
                inner.identity.sync_profile().await;
                if let Some(discord) = &inner.discord {
                    resources::report_guild_count(discord, &inner.api, &inner.logger).await;
                }
            });

            let inner = self.inner.clone();
            scheduler.spawn_periodic("profile-refresh", intervals.profile_refresh, move || {
                let inner = inner.clone();
                async move {
                    inner.identity.sync_profile().await;
                }
            });

            let inner = self.inner.clone();
            scheduler.spawn_periodic("resource-usage", intervals.resource_usage, move || {
                let inner = inner.clone();
                async move {
                    resources::report_resource_usage(
                        inner.sampler.as_ref(),
                        &inner.api,
                        &inner.logger,
                    )
                    .await;
                }
            });

            let inner = self.inner.clone();
            scheduler.spawn_periodic("heartbeat", intervals.heartbeat, move || {
                let inner = inner.clone();
                async move {
                    resources::send_heartbeat(&inner.api, &inner.logger).await;
                }
            });

            if self.inner.discord.is_some() {
                let inner = self.inner.clone();
                scheduler.spawn_periodic("guild-count", intervals.guild_count, move || {
                    let inner = inner.clone();
                    async move {
                        if let Some(discord) = &inner.discord {
                            resources::report_guild_count(discord, &inner.api, &inner.logger)
                                .await;
                        }
                    }
                });
            }
        }

        info!(
            "Discolytics client started for bot {} (primary={}, tasks={:?})",
            self.inner.config.bot_id(),
            self.inner.config.is_primary(),
            scheduler.task_names()
        );
        *slot = Some(scheduler);
        Ok(true)
    }

    pub async fn is_running(&self) -> bool {
        self.inner.scheduler.lock().await.is_some()
    }

    /// Cancels every timer, then sends whatever is still buffered. A flush
    /// already on the wire gets `shutdown_grace` to finish first.
    pub async fn stop(&self) -> FlushReport {
        let scheduler = self.inner.scheduler.lock().await.take();
        if let Some(scheduler) = scheduler {
            scheduler.shutdown().await;
            info!("Discolytics client stopped; running final flush");
        }
        self.inner.flush().await
    }
}

impl Inner {
    async fn flush(&self) -> FlushReport {
        flush_all(&self.buffers, &self.api, &self.logger).await
    }
}
