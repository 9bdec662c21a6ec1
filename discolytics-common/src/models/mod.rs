pub mod client;
pub mod collector;
pub mod discord;
pub mod identity;
pub mod log;

pub use client::{ClientType, InteractionType};
pub use collector::{
    BotProfile, CommandBatch, EventBatch, GuildCountReport, InteractionBatch, PendingCommand,
    PendingEvent, PendingInteraction, ProfilePatch, UsageReport,
};
pub use discord::{DiscordApplication, DiscordUser};
pub use identity::BotIdentity;
pub use log::{LogConfig, LogLevel};
