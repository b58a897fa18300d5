//! Filesystem watch abstraction.
//!
//! A watch service delivers two kinds of events for one pathname:
//!
//! ```text
//! ContentChanged   file created, written, or renamed into place
//! PathInvalidated  file removed, or renamed away
//! ```
//!
//! Debouncing and coalescing belong to the service. Callbacks decide whether
//! the watch continues by returning [`WatchControl`].
//!
//! # Module Structure
//!
//! - `native` - `notify`-backed service (inotify/FSEvents/kqueue/ReadDirectoryChanges)
//! - `manual` - service driven by the host's own file notifications
//! - `debouncer` - timing and coalescing for `native`

mod debouncer;
pub mod manual;
pub mod native;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

pub use manual::ManualWatchService;
pub use native::NotifyWatchService;

/// What happened to the watched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    ContentChanged,
    PathInvalidated,
}

impl WatchEvent {
    pub fn label(self) -> &'static str {
        match self {
            Self::ContentChanged => "changed",
            Self::PathInvalidated => "invalidated",
        }
    }
}

/// Callback verdict: keep watching or close the watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchControl {
    Continue,
    Stop,
}

pub type WatchCallback = Box<dyn FnMut(WatchEvent) -> WatchControl + Send>;

/// Watch establishment errors.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("cannot watch `{0}`: path has no parent directory")]
    NoParent(PathBuf),

    #[error("failed to watch `{path}`")]
    Notify {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("failed to start watch thread")]
    Io(#[from] std::io::Error),
}

/// An active watch on one pathname.
pub trait WatchHandle: Send {
    fn path(&self) -> &Path;

    /// `false` once closed, or after the callback returned [`WatchControl::Stop`].
    fn is_active(&self) -> bool;

    /// Stop delivery. When this returns, the callback is not running and
    /// will never run again.
    fn close(&mut self);
}

/// Source of watch handles.
pub trait WatchService {
    fn watch(
        &self,
        path: &Path,
        callback: WatchCallback,
    ) -> Result<Box<dyn WatchHandle>, WatchError>;
}

// ============================================================================
// Subscription
// ============================================================================

/// Shared callback slot between a watch handle and its event source.
///
/// Delivery holds the slot lock for the duration of the callback, so
/// [`Subscription::cancel`] doubles as a barrier against in-flight delivery.
/// A callback must therefore never cancel its own subscription; returning
/// [`WatchControl::Stop`] does that instead.
#[derive(Clone)]
pub struct Subscription {
    slot: Arc<Mutex<Option<WatchCallback>>>,
}

impl Subscription {
    pub fn new(callback: WatchCallback) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(callback))),
        }
    }

    /// Run the callback. Returns `false` if the subscription is closed.
    pub fn deliver(&self, event: WatchEvent) -> bool {
        let mut slot = self.slot.lock();
        let Some(callback) = slot.as_mut() else {
            return false;
        };
        if callback(event) == WatchControl::Stop {
            *slot = None;
        }
        true
    }

    pub fn cancel(&self) {
        self.slot.lock().take();
    }

    pub fn is_active(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Whether both refer to the same callback slot.
    pub fn same(&self, other: &Subscription) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}
