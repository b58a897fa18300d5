//! `[locator]` section configuration.
//!
//! Controls the external reverse-search executable.
//!
//! # Example
//!
//! ```toml
//! [locator]
//! command = "synctex"                 # Executable, resolved via PATH
//! args = ["--host", "synctex"]        # Prepended before `edit -o ...`
//! timeout_secs = 10                   # 0 = wait forever
//! ```
//!
//! With `args`, `command` can be a wrapper such as `flatpak-spawn`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Reverse-search locator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Executable name or path. `~` is expanded.
    pub command: String,

    /// Extra arguments placed before the `edit` subcommand.
    pub args: Vec<String>,

    /// Kill the locator after this many seconds. `0` disables the timeout.
    pub timeout_secs: u64,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            command: "synctex".into(),
            args: Vec::new(),
            timeout_secs: 0,
        }
    }
}

impl LocatorConfig {
    /// Config with a different executable and defaults otherwise.
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    /// The executable with `~` expanded.
    pub fn program(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.command).into_owned())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_locator_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.locator.command, "synctex");
        assert!(config.locator.args.is_empty());
        assert_eq!(config.locator.timeout(), None);
    }

    #[test]
    fn test_locator_config() {
        let config = test_parse_config(
            "[locator]\ncommand = \"flatpak-spawn\"\nargs = [\"--host\", \"synctex\"]\ntimeout_secs = 5",
        );
        assert_eq!(config.locator.command, "flatpak-spawn");
        assert_eq!(config.locator.args, vec!["--host", "synctex"]);
        assert_eq!(config.locator.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_program_expands_tilde() {
        let config = LocatorConfig::with_command("~/bin/synctex");
        let program = config.program();
        assert!(!program.to_string_lossy().starts_with('~'));
        assert!(program.ends_with("bin/synctex"));
    }

    #[test]
    fn test_program_plain_name_untouched() {
        assert_eq!(
            LocatorConfig::default().program(),
            PathBuf::from("synctex")
        );
    }
}
