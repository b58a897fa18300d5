//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! debounce_ms = 100    # Coalesce bursts of writes from the TeX engine
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// File watching settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiet period before a burst of events is delivered.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 100 }
    }
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_watch_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.watch.debounce(), Duration::from_millis(100));
    }

    #[test]
    fn test_watch_zero_debounce() {
        let config = test_parse_config("[watch]\ndebounce_ms = 0");
        assert_eq!(config.watch.debounce(), Duration::ZERO);
    }
}
