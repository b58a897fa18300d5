//! Configuration sections of `pdfsync.toml`.

mod locator;
mod watch;

pub use locator::LocatorConfig;
pub use watch::WatchConfig;
