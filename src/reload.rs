//! Live reload of the rendered PDF.
//!
//! ```text
//! WatchEvent::ContentChanged  ──> close() + open(pathname)   keep watching
//! WatchEvent::PathInvalidated ──> (nothing)                   stop watching
//! ```
//!
//! A renamed or deleted PDF is not followed; the watch simply ends.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::renderer::Renderer;
use crate::watch::{WatchCallback, WatchControl, WatchEvent, WatchHandle, WatchService};
use crate::{debug, log};

/// Result of one reload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Reloaded,
    /// Renderer still initializing; the change is dropped.
    NotReady,
    Failed,
}

/// Reload state machine for one PDF.
pub struct Reloader {
    pathname: PathBuf,
    renderer: Arc<dyn Renderer>,
}

impl Reloader {
    pub fn new(pathname: PathBuf, renderer: Arc<dyn Renderer>) -> Self {
        Self { pathname, renderer }
    }

    pub fn pathname(&self) -> &Path {
        &self.pathname
    }

    /// Apply the event policy to one watch event.
    pub fn handle_event(&self, event: WatchEvent) -> WatchControl {
        match event {
            WatchEvent::ContentChanged => {
                self.reload();
                WatchControl::Continue
            }
            WatchEvent::PathInvalidated => {
                log!("watch"; "{} was moved or removed, no longer watching", self.pathname.display());
                WatchControl::Stop
            }
        }
    }

    /// Reload the document in the renderer.
    ///
    /// The current document is closed before reopening so the renderer does
    /// not compare the old and new document identities, which would reset
    /// the view on a mismatch.
    pub fn reload(&self) -> ReloadOutcome {
        if !self.renderer.is_ready() {
            debug!("reload"; "cannot (yet) reload {}", self.pathname.display());
            return ReloadOutcome::NotReady;
        }

        match self.reopen() {
            Ok(()) => {
                debug!("reload"; "reloaded {}", self.pathname.display());
                ReloadOutcome::Reloaded
            }
            Err(e) => {
                log!("reload"; "{:#}", e);
                ReloadOutcome::Failed
            }
        }
    }

    fn reopen(&self) -> Result<()> {
        // A failed close still leaves the renderer able to open; reopening
        // beats leaving the view empty.
        if let Err(e) = self.renderer.close() {
            log!("reload"; "failed to close {}: {:#}", self.pathname.display(), e);
        }
        self.renderer
            .open(&self.pathname)
            .with_context(|| format!("failed to reopen {}", self.pathname.display()))
    }
}

/// Create the PDF's directory so it can be watched before the first build.
pub fn ensure_parent_dir(pathname: &Path) -> Result<()> {
    let Some(dir) = pathname.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return Ok(());
    };
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        debug!("watch"; "created {}", dir.display());
    }
    Ok(())
}

/// Prepare the directory and start watching. Failures are logged and yield
/// `None`; the session works without live reload.
pub fn start_watch(
    service: &dyn WatchService,
    reloader: &Arc<Reloader>,
) -> Option<Box<dyn WatchHandle>> {
    if let Err(e) = ensure_parent_dir(reloader.pathname()) {
        log!("watch"; "{:#}", e);
    }

    let target = Arc::clone(reloader);
    let callback: WatchCallback = Box::new(move |event| target.handle_event(event));
    match service.watch(reloader.pathname(), callback) {
        Ok(handle) => Some(handle),
        Err(e) => {
            log!("watch"; "{}: {}", e, reloader.pathname().display());
            None
        }
    }
}
