// discolytics-common/src/lib.rs

pub mod config;
pub mod error;
pub mod models;

pub use config::{ClientConfig, ClientConfigBuilder, CommandMode, Intervals};
pub use error::{Error, TransportFailure};
