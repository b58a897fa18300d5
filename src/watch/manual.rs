//! Watch service driven by the host.
//!
//! Hosts that already receive file notifications (an editor's own file
//! watcher, a build tool's "PDF written" hook) forward them with
//! [`ManualWatchService::emit`] instead of running a second watcher.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::{Subscription, WatchCallback, WatchError, WatchEvent, WatchHandle, WatchService};

type Registry = Arc<Mutex<FxHashMap<PathBuf, Vec<Subscription>>>>;

/// Host-driven watch service. Clones share the same registry.
#[derive(Clone, Default)]
pub struct ManualWatchService {
    subscriptions: Registry,
}

impl ManualWatchService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every live watch on `path`.
    ///
    /// Returns how many watches received it.
    pub fn emit(&self, path: &Path, event: WatchEvent) -> usize {
        let targets = self.snapshot(path);
        // Deliver outside the registry lock: callbacks may register watches.
        targets.iter().filter(|sub| sub.deliver(event)).count()
    }

    /// Number of live watches on `path`.
    pub fn watch_count(&self, path: &Path) -> usize {
        self.snapshot(path).iter().filter(|s| s.is_active()).count()
    }

    /// Number of paths with at least one registered watch.
    pub fn path_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Subscriptions are never locked while the registry is.
    fn snapshot(&self, path: &Path) -> Vec<Subscription> {
        self.subscriptions
            .lock()
            .get(path)
            .cloned()
            .unwrap_or_default()
    }
}

impl WatchService for ManualWatchService {
    fn watch(
        &self,
        path: &Path,
        callback: WatchCallback,
    ) -> Result<Box<dyn WatchHandle>, WatchError> {
        let subscription = Subscription::new(callback);
        self.subscriptions
            .lock()
            .entry(path.to_path_buf())
            .or_default()
            .push(subscription.clone());

        Ok(Box::new(ManualWatch {
            path: path.to_path_buf(),
            subscription,
            registry: Arc::clone(&self.subscriptions),
        }))
    }
}

struct ManualWatch {
    path: PathBuf,
    subscription: Subscription,
    registry: Registry,
}

impl WatchHandle for ManualWatch {
    fn path(&self) -> &Path {
        &self.path
    }

    fn is_active(&self) -> bool {
        self.subscription.is_active()
    }

    fn close(&mut self) {
        self.subscription.cancel();

        let mut map = self.registry.lock();
        if let Some(list) = map.get_mut(&self.path) {
            list.retain(|sub| !sub.same(&self.subscription));
            if list.is_empty() {
                map.remove(&self.path);
            }
        }
    }
}

impl Drop for ManualWatch {
    fn drop(&mut self) {
        self.close();
    }
}
