//! pdfsync - live reload and SyncTeX reverse search for an embedded PDF viewer.
//!
//! # Module Structure
//!
//! - `session` - one opened PDF: identity, teardown, event routing
//! - `reload` - reopen the document when the file changes
//! - `watch` - filesystem watch services (`notify` or host-driven)
//! - `locate` - pointer → PDF points → locator process → navigation
//! - `guard` - link-click and keyboard arbitration
//! - `renderer` / `host` - the two collaborators a session drives
//! - `config` - `pdfsync.toml`

pub mod config;
pub mod guard;
pub mod host;
pub mod locate;
pub mod logger;
pub mod reload;
pub mod renderer;
pub mod session;
pub mod utils;
pub mod watch;

pub use config::SyncConfig;
pub use host::{Host, NavigationRequest};
pub use locate::{LocateError, Locator, PointerSample};
pub use reload::{ReloadOutcome, Reloader};
pub use renderer::{Renderer, Rotation};
pub use session::{SessionContext, SessionState, ViewerSession};
pub use watch::{ManualWatchService, NotifyWatchService, WatchEvent, WatchService};
