// src/logger.rs

use std::sync::Arc;

use discolytics_common::models::{LogConfig, LogLevel};

/// Where enabled log lines end up.
pub trait LogSink: Send + Sync {
    fn write(&self, level: LogLevel, message: &str);
}

/// Forwards to `tracing` under the `discolytics` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(target: "discolytics", "{}", message),
            LogLevel::Info => tracing::info!(target: "discolytics", "{}", message),
            LogLevel::Error => tracing::error!(target: "discolytics", "{}", message),
        }
    }
}

/// Level-gated pass-through. Holds no state besides its switches.
#[derive(Clone)]
pub struct Logger {
    config: LogConfig,
    sink: Arc<dyn LogSink>,
}

impl Logger {
    pub fn new(config: LogConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    pub fn with_sink(config: LogConfig, sink: Arc<dyn LogSink>) -> Self {
        Self { config, sink }
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        self.config.is_enabled(level)
    }

    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        if self.enabled(level) {
            self.sink.write(level, message.as_ref());
        }
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogConfig::default())
    }
}
