//! `notify`-backed watch service.
//!
//! The file itself may not exist yet (the TeX engine has not produced it),
//! so the parent directory is watched non-recursively and events are
//! filtered down to the target path.
//!
//! ```text
//! notify thread ──mpsc──> pump thread: classify → Debouncer → Subscription
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;

use super::debouncer::Debouncer;
use super::{Subscription, WatchCallback, WatchError, WatchEvent, WatchHandle, WatchService};
use crate::utils::path::absolute_file_path;

/// Watch service on top of the platform's native file notifications.
#[derive(Debug, Clone)]
pub struct NotifyWatchService {
    debounce: Duration,
}

impl NotifyWatchService {
    pub fn new(debounce: Duration) -> Self {
        Self { debounce }
    }
}

impl Default for NotifyWatchService {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl NotifyWatchService {
    /// Start a watch and return the concrete handle.
    pub(super) fn start(
        &self,
        path: &Path,
        callback: WatchCallback,
    ) -> Result<NotifyWatch, WatchError> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| WatchError::NoParent(path.to_path_buf()))?;

        let (notify_tx, notify_rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })
        .map_err(|source| WatchError::Notify {
            path: path.to_path_buf(),
            source,
        })?;

        watcher
            .watch(parent, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Notify {
                path: path.to_path_buf(),
                source,
            })?;

        let watcher = Arc::new(Mutex::new(Some(watcher)));
        let subscription = Subscription::new(callback);
        let pump = Pump {
            rx: notify_rx,
            target: Target::new(path),
            debouncer: Debouncer::new(self.debounce),
            subscription: subscription.clone(),
            watcher: Arc::clone(&watcher),
        };
        std::thread::Builder::new()
            .name("pdfsync-watch".into())
            .spawn(move || pump.run())?;

        crate::debug!("watch"; "watching {}", path.display());

        Ok(NotifyWatch {
            path: path.to_path_buf(),
            watcher,
            subscription,
        })
    }
}

impl WatchService for NotifyWatchService {
    fn watch(
        &self,
        path: &Path,
        callback: WatchCallback,
    ) -> Result<Box<dyn WatchHandle>, WatchError> {
        Ok(Box::new(self.start(path, callback)?))
    }
}

/// The OS watch, shared with the pump so it can be released once delivery ends.
type WatcherSlot = Arc<Mutex<Option<RecommendedWatcher>>>;

/// Handle returned by [`NotifyWatchService`].
pub(super) struct NotifyWatch {
    path: PathBuf,
    /// Dropping the watcher disconnects the pump thread's channel.
    watcher: WatcherSlot,
    subscription: Subscription,
}

impl NotifyWatch {
    /// Whether the OS-level directory watch is still registered.
    pub(super) fn holds_watcher(&self) -> bool {
        self.watcher.lock().is_some()
    }
}

impl WatchHandle for NotifyWatch {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_active(&self) -> bool {
        self.subscription.is_active() && self.holds_watcher()
    }

    fn close(&mut self) {
        self.subscription.cancel();
        if self.watcher.lock().take().is_some() {
            crate::debug!("watch"; "closed watch on {}", self.path.display());
        }
    }
}

impl Drop for NotifyWatch {
    fn drop(&mut self) {
        self.close();
    }
}

/// Event loop between the notify channel and the subscription.
struct Pump {
    rx: Receiver<notify::Result<notify::Event>>,
    target: Target,
    debouncer: Debouncer,
    subscription: Subscription,
    watcher: WatcherSlot,
}

impl Pump {
    fn run(mut self) {
        loop {
            match self.rx.recv_timeout(self.debouncer.sleep_duration()) {
                Ok(Ok(event)) => {
                    if let Some(change) = classify(&event, &self.target) {
                        crate::debug!("watch"; "raw notify: {:?} -> {}", event.kind, change.label());
                        self.debouncer.add(change);
                    }
                }
                Ok(Err(e)) => crate::log!("watch"; "notify error: {}", e),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if let Some(event) = self.debouncer.take_if_ready()
                && !self.subscription.deliver(event)
            {
                break;
            }
            if !self.subscription.is_active() {
                break;
            }
        }

        // Stopped by the callback: unregister the directory watch now rather
        // than when the handle is dropped.
        if self.watcher.lock().take().is_some() {
            crate::debug!("watch"; "released watch on {}", self.target.given.display());
        }
    }
}

/// The watched file, as given and in the form the OS reports it.
pub(super) struct Target {
    given: PathBuf,
    resolved: PathBuf,
}

impl Target {
    pub(super) fn new(path: &Path) -> Self {
        Self {
            given: path.to_path_buf(),
            resolved: absolute_file_path(path),
        }
    }

    fn matches(&self, path: &Path) -> bool {
        path == self.given || path == self.resolved
    }
}

/// Reduce a raw notify event to what it means for the target path.
pub(super) fn classify(event: &notify::Event, target: &Target) -> Option<WatchEvent> {
    // Both-sided rename: [from, to]
    if let EventKind::Modify(ModifyKind::Name(RenameMode::Both)) = event.kind {
        return match event.paths.as_slice() {
            [_, to] if target.matches(to) => Some(WatchEvent::ContentChanged),
            [from, _] if target.matches(from) => Some(WatchEvent::PathInvalidated),
            _ => None,
        };
    }

    if !event.paths.iter().any(|p| target.matches(p)) {
        return None;
    }

    match event.kind {
        EventKind::Create(_) => Some(WatchEvent::ContentChanged),
        // mtime/atime/chmod noise
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(WatchEvent::ContentChanged),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Some(WatchEvent::PathInvalidated),
        // FSEvents reports both sides of a rename this way; only the
        // filesystem tells which side the target was on.
        EventKind::Modify(ModifyKind::Name(_)) => Some(if target.given.exists() {
            WatchEvent::ContentChanged
        } else {
            WatchEvent::PathInvalidated
        }),
        EventKind::Modify(_) => Some(WatchEvent::ContentChanged),
        EventKind::Remove(_) => Some(WatchEvent::PathInvalidated),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => None,
    }
}
