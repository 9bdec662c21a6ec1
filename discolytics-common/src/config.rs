// ================================================================
// File: discolytics-common/src/config.rs
// ================================================================

use std::env;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{ClientType, LogConfig};

pub const DATA_API_URL: &str = "https://data.discolytics.com/api";
pub const API_URL: &str = "https://api.discolytics.com/api";
pub const DISCORD_API_URL: &str = "https://discord.com/api/v10";

/// How an ended command timer reports its measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandMode {
    /// Queue into the commands buffer; sent with the next flush.
    #[default]
    Buffered,
    /// POST the single command right away.
    Immediate,
}

/// Periods of every recurring job owned by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intervals {
    pub flush: Duration,
    pub resource_usage: Duration,
    pub heartbeat: Duration,
    pub guild_count: Duration,
    pub profile_refresh: Duration,
    /// How long `stop()` lets a flush already in flight finish.
    pub shutdown_grace: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            flush: Duration::from_secs(15),
            resource_usage: Duration::from_secs(10),
            heartbeat: Duration::from_secs(30),
            guild_count: Duration::from_secs(30 * 60),
            profile_refresh: Duration::from_secs(60),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

/// Connection and auth parameters of a single client. Immutable once built.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    bot_id: String,
    api_key: String,
    auth: Option<String>,
    data_api_url: String,
    api_url: String,
    discord_api_url: String,
    client_type: ClientType,
    client_version: Option<String>,
    primary: bool,
    command_mode: CommandMode,
    intervals: Intervals,
    log_config: LogConfig,
}

impl ClientConfig {
    pub fn builder(bot_id: impl Into<String>, api_key: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(bot_id, api_key)
    }

    /// Reads `DISCOLYTICS_*` variables (and `DISCORD_TOKEN`), loading `.env` first if present.
    pub fn from_env() -> Result<ClientConfigBuilder, Error> {
        if let Err(e) = dotenv::dotenv() {
            debug!("No .env loaded: {}", e);
        }

        let bot_id = env::var("DISCOLYTICS_BOT_ID")
            .map_err(|_| Error::Config("DISCOLYTICS_BOT_ID is not set".into()))?;
        let api_key = env::var("DISCOLYTICS_API_KEY")
            .map_err(|_| Error::Config("DISCOLYTICS_API_KEY is not set".into()))?;

        let mut builder = ClientConfigBuilder::new(bot_id, api_key);
        if let Ok(url) = env::var("DISCOLYTICS_DATA_API_URL") {
            builder = builder.data_api_url(url);
        }
        if let Ok(url) = env::var("DISCOLYTICS_API_URL") {
            builder = builder.api_url(url);
        }
        if let Ok(token) = env::var("DISCORD_TOKEN") {
            builder = builder.auth(token);
        }
        Ok(builder)
    }

    pub fn bot_id(&self) -> &str {
        &self.bot_id
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The Discord token, already normalised to `Bot <token>`.
    pub fn auth(&self) -> Option<&str> {
        self.auth.as_deref()
    }

    pub fn data_api_url(&self) -> &str {
        &self.data_api_url
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn discord_api_url(&self) -> &str {
        &self.discord_api_url
    }

    pub fn client_type(&self) -> ClientType {
        self.client_type
    }

    pub fn client_version(&self) -> Option<&str> {
        self.client_version.as_deref()
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn command_mode(&self) -> CommandMode {
        self.command_mode
    }

    pub fn intervals(&self) -> &Intervals {
        &self.intervals
    }

    pub fn log_config(&self) -> &LogConfig {
        &self.log_config
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    bot_id: String,
    api_key: String,
    auth: Option<String>,
    data_api_url: Option<String>,
    api_url: Option<String>,
    discord_api_url: Option<String>,
    client_type: ClientType,
    client_version: Option<String>,
    primary: bool,
    command_mode: CommandMode,
    intervals: Intervals,
    log_config: LogConfig,
}

impl ClientConfigBuilder {
    pub fn new(bot_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            bot_id: bot_id.into(),
            api_key: api_key.into(),
            auth: None,
            data_api_url: None,
            api_url: None,
            discord_api_url: None,
            client_type: ClientType::Unknown,
            client_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            primary: true,
            command_mode: CommandMode::Buffered,
            intervals: Intervals::default(),
            log_config: LogConfig::default(),
        }
    }

    pub fn auth(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(token.into());
        self
    }

    pub fn data_api_url(mut self, url: impl Into<String>) -> Self {
        self.data_api_url = Some(url.into());
        self
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn discord_api_url(mut self, url: impl Into<String>) -> Self {
        self.discord_api_url = Some(url.into());
        self
    }

    pub fn client_type(mut self, client_type: ClientType) -> Self {
        self.client_type = client_type;
        self
    }

    pub fn client_version(mut self, version: Option<String>) -> Self {
        self.client_version = version;
        self
    }

    pub fn primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    pub fn command_mode(mut self, mode: CommandMode) -> Self {
        self.command_mode = mode;
        self
    }

    pub fn intervals(mut self, intervals: Intervals) -> Self {
        self.intervals = intervals;
        self
    }

    pub fn log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn has_auth(&self) -> bool {
        self.auth.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    pub fn build(self) -> Result<ClientConfig, Error> {
        if self.bot_id.trim().is_empty() {
            return Err(Error::Config("botId must not be empty".into()));
        }
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("apiKey must not be empty".into()));
        }

        let auth = match self.auth {
            Some(token) if !token.trim().is_empty() => Some(parse_token(token.trim())),
            _ => None,
        };
        if self.primary && auth.is_none() {
            return Err(Error::Auth(
                "a primary client needs a Discord auth token".into(),
            ));
        }

        Ok(ClientConfig {
            bot_id: self.bot_id,
            api_key: self.api_key,
            auth,
            data_api_url: normalize_base(self.data_api_url.as_deref().unwrap_or(DATA_API_URL))?,
            api_url: normalize_base(self.api_url.as_deref().unwrap_or(API_URL))?,
            discord_api_url: normalize_base(
                self.discord_api_url.as_deref().unwrap_or(DISCORD_API_URL),
            )?,
            client_type: self.client_type,
            client_version: self.client_version,
            primary: self.primary,
            command_mode: self.command_mode,
            intervals: self.intervals,
            log_config: self.log_config,
        })
    }
}

/// Prefixes `Bot ` unless the token already carries it.
pub fn parse_token(token: &str) -> String {
    if token.starts_with("Bot") {
        token.to_string()
    } else {
        format!("Bot {}", token)
    }
}

fn normalize_base(raw: &str) -> Result<String, Error> {
    let parsed = Url::parse(raw)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!("unsupported URL scheme in {}", raw)));
    }
    Ok(raw.trim_end_matches('/').to_string())
}
