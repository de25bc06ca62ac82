//! Tracing subscriber setup for the anonymizer
//! Created: 2026-09-14

use std::fmt;

use clap::ValueEnum;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Verbosity accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Error messages only
    Error,
    /// Warning and error messages
    Warn,
    /// Info, warning and error messages (default)
    Info,
    /// Accepted replacements and backoffs
    Debug,
    /// Every candidate of every search
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        write!(f, "{}", level)
    }
}

/// Installs the global tracing subscriber once
#[derive(Debug)]
pub struct Logger {
    level: String,
    initialized: bool,
}

impl Logger {
    pub fn new() -> Self {
        Self::with_level("info")
    }

    pub fn with_level(level: &str) -> Self {
        Self {
            level: level.to_string(),
            initialized: false,
        }
    }

    pub fn for_level(level: LogLevel) -> Self {
        Self::with_level(&format!("pdxanon={}", level))
    }

    /// `RUST_LOG` wins over the configured level. Returns `false` when a
    /// subscriber was already installed elsewhere.
    pub fn init(&mut self) -> bool {
        if self.initialized {
            return true;
        }
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));
        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init()
            .is_ok();
        self.initialized = installed;
        if installed {
            info!("Logger initialized with level: {}", self.level);
        }
        installed
    }

    pub fn level(&self) -> &str {
        &self.level
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive_is_scoped_to_crate() {
        assert_eq!(Logger::for_level(LogLevel::Debug).level(), "pdxanon=debug");
        assert_eq!(Logger::default().level(), "info");
    }
}
