// src/lib.rs

pub mod api;
pub mod buffers;
pub mod client;
pub mod clock;
pub mod command;
pub mod discord;
pub mod gateway;
pub mod http;
pub mod identity;
pub mod logger;
pub mod resources;
pub mod scheduler;

pub use api::{CollectorApi, Outcome};
pub use client::{ClientBuilder, Discolytics};
pub use command::CommandTimer;
pub use discolytics_common::error::{Error, TransportFailure};
pub use discolytics_common::{ClientConfig, ClientConfigBuilder, CommandMode, Intervals};
pub use http::{DefaultHttpTransport, HttpTransport};
