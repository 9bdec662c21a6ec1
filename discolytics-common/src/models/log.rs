use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Per-level switches for the client's own log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    levels: HashMap<LogLevel, bool>,
}

impl LogConfig {
    pub fn new(levels: HashMap<LogLevel, bool>) -> Self {
        Self { levels }
    }

    pub fn set(mut self, level: LogLevel, enabled: bool) -> Self {
        self.levels.insert(level, enabled);
        self
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.levels.get(&level).copied().unwrap_or(false)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        let mut levels = HashMap::new();
        levels.insert(LogLevel::Debug, false);
        levels.insert(LogLevel::Info, true);
        levels.insert(LogLevel::Error, true);
        Self { levels }
    }
}
