use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric tag identifying which framework adapter produced the telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub enum ClientType {
    #[default]
    Unknown,
    DiscordJs,
    Eris,
    OceanicJs,
    Pycore,
    DiscordJsWs,
    Twilight,
}

impl From<ClientType> for u8 {
    fn from(kind: ClientType) -> Self {
        match kind {
            ClientType::Unknown => 0,
            ClientType::DiscordJs => 1,
            ClientType::Eris => 2,
            ClientType::OceanicJs => 3,
            ClientType::Pycore => 4,
            ClientType::DiscordJsWs => 5,
            ClientType::Twilight => 6,
        }
    }
}

impl From<u8> for ClientType {
    fn from(value: u8) -> Self {
        match value {
            1 => ClientType::DiscordJs,
            2 => ClientType::Eris,
            3 => ClientType::OceanicJs,
            4 => ClientType::Pycore,
            5 => ClientType::DiscordJsWs,
            6 => ClientType::Twilight,
            _ => ClientType::Unknown,
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClientType::Unknown => "unknown",
            ClientType::DiscordJs => "discord.js",
            ClientType::Eris => "eris",
            ClientType::OceanicJs => "oceanic.js",
            ClientType::Pycore => "pycore",
            ClientType::DiscordJsWs => "@discordjs/ws",
            ClientType::Twilight => "twilight",
        };
        write!(f, "{}", s)
    }
}

/// Discord interaction type as carried in `INTERACTION_CREATE.d.type`.
///
/// Values Discord adds later are kept verbatim in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
    MessageComponent,
    ApplicationCommandAutocomplete,
    ModalSubmit,
    Other(u8),
}

impl From<InteractionType> for u8 {
    fn from(kind: InteractionType) -> Self {
        match kind {
            InteractionType::Ping => 1,
            InteractionType::ApplicationCommand => 2,
            InteractionType::MessageComponent => 3,
            InteractionType::ApplicationCommandAutocomplete => 4,
            InteractionType::ModalSubmit => 5,
            InteractionType::Other(v) => v,
        }
    }
}

impl From<u8> for InteractionType {
    fn from(value: u8) -> Self {
        match value {
            1 => InteractionType::Ping,
            2 => InteractionType::ApplicationCommand,
            3 => InteractionType::MessageComponent,
            4 => InteractionType::ApplicationCommandAutocomplete,
            5 => InteractionType::ModalSubmit,
            other => InteractionType::Other(other),
        }
    }
}
