use std::sync::Arc;

use parking_lot::RwLock;

/// Liveness barrier shared between a session and its in-flight work.
///
/// Work runs under a read lock; [`Gate::close`] takes the write lock, so once
/// it returns nothing is running and nothing will run again.
#[derive(Clone)]
pub struct Gate {
    open: Arc<RwLock<bool>>,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            open: Arc::new(RwLock::new(true)),
        }
    }

    /// Run `f` if the gate is still open.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let open = self.open.read();
        (*open).then(f)
    }

    pub fn close(&self) {
        *self.open.write() = false;
    }

    pub fn is_open(&self) -> bool {
        *self.open.read()
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}
