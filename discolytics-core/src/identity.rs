// File: discolytics-core/src/identity.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

use discolytics_common::models::{BotIdentity, BotProfile, ProfilePatch};

use crate::api::{CollectorApi, Outcome};
use crate::clock::Clock;
use crate::discord::{DiscordRest, avatar_url};
use crate::logger::Logger;

/// Profiles older than this are re-read from Discord and pushed again.
pub const PROFILE_MAX_AGE_MS: i64 = 1000 * 60 * 60 * 24;

pub type CaptureEventsCallback = Arc<dyn Fn(&[String]) + Send + Sync>;

/// Handle returned by [`IdentityManager::on_capture_events_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// `true` when the stored profile is missing or older than [`PROFILE_MAX_AGE_MS`].
pub fn needs_profile_refresh(last_updated: Option<i64>, now: i64) -> bool {
    match last_updated {
        None => true,
        Some(ts) => now.saturating_sub(ts) > PROFILE_MAX_AGE_MS,
    }
}

/// Owns the cached [`BotIdentity`] and the server's capture-events allowlist.
pub struct IdentityManager {
    api: CollectorApi,
    discord: Option<DiscordRest>,
    clock: Arc<dyn Clock>,
    logger: Logger,
    identity: RwLock<BotIdentity>,
    capture_events: RwLock<Vec<String>>,
    observers: Mutex<Vec<(ObserverId, CaptureEventsCallback)>>,
    next_observer: AtomicU64,
}

impl IdentityManager {
    pub fn new(
        api: CollectorApi,
        discord: Option<DiscordRest>,
        clock: Arc<dyn Clock>,
        logger: Logger,
    ) -> Self {
        Self {
            api,
            discord,
            clock,
            logger,
            identity: RwLock::new(BotIdentity::default()),
            capture_events: RwLock::new(Vec::new()),
            observers: Mutex::new(Vec::new()),
            next_observer: AtomicU64::new(0),
        }
    }

    pub fn identity(&self) -> BotIdentity {
        self.identity.read().clone()
    }

    pub fn capture_events(&self) -> Vec<String> {
        self.capture_events.read().clone()
    }

    /// Registers a callback fired every time a profile read replaces the allowlist.
    pub fn on_capture_events_update<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_observer.fetch_add(1, Ordering::Relaxed));
        self.observers.lock().push((id, Arc::new(callback)));
        id
    }

    /// Returns `false` if `id` was already removed.
    pub fn remove_capture_events_observer(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.lock();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    /// Unconditional startup PATCH carrying only client type and version.
    pub async fn register_client_metadata(&self) -> Outcome {
        let config = self.api.config();
        let patch = ProfilePatch::client_metadata(
            config.client_type(),
            config.client_version().map(str::to_string),
        );
        match self.api.patch_bot(&patch).await {
            Ok(()) => {
                self.logger.debug("Registered client metadata");
                Outcome::OK
            }
            Err(e) => {
                self.logger
                    .error(format!("Failed to register client metadata: {}", e));
                Outcome::FAILED
            }
        }
    }

    /// Reads the stored profile and, when it is stale, refreshes it from Discord.
    pub async fn sync_profile(&self) -> Outcome {
        let profile = match self.api.get_bot().await {
            Ok(profile) => profile,
            Err(e) => {
                self.logger.error(format!("Failed to fetch bot profile: {}", e));
                return Outcome::FAILED;
            }
        };

        self.absorb_profile(&profile);

        let last_updated = self.identity.read().profile_last_updated_at;
        if !needs_profile_refresh(last_updated, self.clock.now_millis()) {
            return Outcome::OK;
        }

        self.refresh_from_discord().await
    }

    async fn refresh_from_discord(&self) -> Outcome {
        let Some(discord) = &self.discord else {
            self.logger
                .error("Bot profile is stale but no Discord auth is configured");
            return Outcome::FAILED;
        };

        let user = match discord.current_user().await {
            Ok(user) => user,
            Err(e) => {
                self.logger
                    .error(format!("Failed to fetch Discord user: {}", e));
                return Outcome::FAILED;
            }
        };

        let avatar = avatar_url(&user);
        let config = self.api.config();
        let patch = ProfilePatch {
            bot_user_id: Some(user.id.clone()),
            bot_user_name: Some(user.username.clone()),
            bot_user_avatar: Some(avatar.clone()),
            client_type: config.client_type(),
            client_version: config.client_version().map(str::to_string),
        };

        match self.api.patch_bot(&patch).await {
            Ok(()) => {
                let mut identity = self.identity.write();
                identity.user_id = Some(user.id);
                identity.user_name = Some(user.username);
                identity.avatar_url = Some(avatar);
                identity.profile_last_updated_at = Some(self.clock.now_millis());
                drop(identity);
                self.logger.info("Updated bot profile");
                Outcome::OK
            }
            Err(e) => {
                self.logger
                    .error(format!("Failed to update bot profile: {}", e));
                Outcome::FAILED
            }
        }
    }

    fn absorb_profile(&self, profile: &BotProfile) {
        {
            let mut identity = self.identity.write();
            if identity.user_id.is_none() {
                identity.user_id = profile.bot_user_id.clone();
                identity.user_name = profile.bot_user_name.clone();
                identity.avatar_url = profile.bot_user_avatar.clone();
            }
            // The server's timestamp also records an accepted patch; never go backwards.
            identity.profile_last_updated_at =
                match (identity.profile_last_updated_at, profile.profile_last_updated) {
                    (Some(local), Some(remote)) => Some(local.max(remote)),
                    (local, remote) => local.or(remote),
                };
        }

        *self.capture_events.write() = profile.capture_events.clone();
        // Callbacks run outside the lock so they may register or remove observers.
        let callbacks: Vec<CaptureEventsCallback> =
            self.observers.lock().iter().map(|(_, cb)| cb.clone()).collect();
        for callback in callbacks {
            callback(&profile.capture_events);
        }
    }
}
