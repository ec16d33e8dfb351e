//! Heuristic constants for virtual pages and reading time

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`ProgressConfig::chars_per_page`]
pub const CHARS_PER_PAGE_ENV: &str = "READMARK_CHARS_PER_PAGE";

/// Environment variable overriding [`ProgressConfig::chars_per_minute`]
pub const CHARS_PER_MINUTE_ENV: &str = "READMARK_CHARS_PER_MINUTE";

/// Pagination and reading-time settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Characters of text per virtual page
    pub chars_per_page: usize,

    /// Reading speed in characters per minute
    pub chars_per_minute: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            chars_per_page: 1024,
            chars_per_minute: 1200,
        }
    }
}

impl ProgressConfig {
    /// Defaults overridden by `READMARK_CHARS_PER_PAGE` and
    /// `READMARK_CHARS_PER_MINUTE`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = read_env(CHARS_PER_PAGE_ENV, "chars_per_page")? {
            config.chars_per_page = value;
        }
        if let Some(value) = read_env(CHARS_PER_MINUTE_ENV, "chars_per_minute")? {
            config.chars_per_minute = value;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_chars_per_page(mut self, chars: usize) -> Self {
        self.chars_per_page = chars;
        self
    }

    pub fn with_chars_per_minute(mut self, chars: usize) -> Self {
        self.chars_per_minute = chars;
        self
    }

    /// Reject settings that would divide by zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chars_per_page == 0 {
            return Err(ConfigError::Invalid {
                field: "chars_per_page",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.chars_per_minute == 0 {
            return Err(ConfigError::Invalid {
                field: "chars_per_minute",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn read_env(var: &str, field: &'static str) -> Result<Option<usize>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                field,
                reason: format!("'{}' is not a valid number", raw),
            }),
        Err(_) => Ok(None),
    }
}
