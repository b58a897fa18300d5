//! Configuration management for `pdfsync.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── locator    # [locator]
//! │   └── watch      # [watch]
//! ├── error          # ConfigError
//! └── mod.rs         # SyncConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section      | Purpose                                          |
//! |--------------|--------------------------------------------------|
//! | `[locator]`  | Reverse-search executable, extra args, timeout   |
//! | `[watch]`    | Debounce window for PDF change notifications     |
//!
//! A missing config file is not an error: every field has a default.

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{LocatorConfig, WatchConfig};

use std::{fs, path::Path};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::log;

/// Root configuration structure representing pdfsync.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Reverse-search locator settings
    #[serde(default)]
    pub locator: LocatorConfig,

    /// File watching settings
    #[serde(default)]
    pub watch: WatchConfig,
}

impl SyncConfig {
    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            crate::debug!("config"; "{} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_path(path)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::from)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.locator.command.trim().is_empty() {
            return Err(ConfigError::validation(
                "locator.command",
                "must name an executable",
            ));
        }
        Ok(())
    }
}

/// Parse a config snippet, failing on unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SyncConfig {
    let (parsed, ignored) = SyncConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
