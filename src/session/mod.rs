//! Viewer session: one opened PDF inside the host.
//!
//! A session owns everything tied to one PDF view:
//!
//! ```text
//! ViewerSession
//! ├── Reloader       live reload on ContentChanged
//! ├── WatchHandle    exclusive, closed on destroy
//! ├── ReverseSearch  pointer → locator → host navigation
//! └── Gate           blocks late locator results after destroy
//! ```
//!
//! There is no global "current view": every callback closes over the state
//! of the session that registered it.

mod gate;
mod state;
#[cfg(test)]
pub(crate) mod testing;

pub use gate::Gate;
pub use state::{SessionState, opens_pdf, viewer_url};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::guard::{self, KeyChord, KeyDisposition, LinkClick};
use crate::host::Host;
use crate::locate::{Locator, PageElement, PointerSample, ReverseSearch};
use crate::reload::{ReloadOutcome, Reloader, start_watch};
use crate::renderer::Renderer;
use crate::utils::path::absolute_file_path;
use crate::watch::{WatchHandle, WatchService};
use crate::{debug, log};

/// Collaborators shared by every session of one host.
#[derive(Clone)]
pub struct SessionContext {
    pub host: Arc<dyn Host>,
    pub watcher: Arc<dyn WatchService + Send + Sync>,
    pub locator: Locator,
    /// Runtime that drives locator invocations.
    pub runtime: Handle,
}

/// One opened PDF.
pub struct ViewerSession {
    pathname: PathBuf,
    host: Arc<dyn Host>,
    reloader: Arc<Reloader>,
    watch: Option<Box<dyn WatchHandle>>,
    search: ReverseSearch,
    gate: Gate,
}

impl ViewerSession {
    /// Open a session for `pathname` and start watching it.
    ///
    /// Relative paths are made absolute. Watch failures are logged; the
    /// session then works without live reload.
    pub fn open(
        pathname: impl AsRef<Path>,
        renderer: Arc<dyn Renderer>,
        ctx: &SessionContext,
    ) -> Self {
        let pathname = absolute_file_path(pathname.as_ref());
        let gate = Gate::new();

        let reloader = Arc::new(Reloader::new(pathname.clone(), Arc::clone(&renderer)));
        let watch = start_watch(ctx.watcher.as_ref(), &reloader);

        let search = ReverseSearch::new(
            pathname.clone(),
            renderer,
            Arc::clone(&ctx.host),
            ctx.locator.clone(),
            ctx.runtime.clone(),
            gate.clone(),
        );

        debug!("session"; "opened {}", pathname.display());

        Self {
            pathname,
            host: Arc::clone(&ctx.host),
            reloader,
            watch,
            search,
            gate,
        }
    }

    /// Reopen a session from persisted state.
    pub fn restore(state: &SessionState, renderer: Arc<dyn Renderer>, ctx: &SessionContext) -> Self {
        Self::open(&state.pathname, renderer, ctx)
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            pathname: self.pathname.clone(),
        }
    }

    /// Absolute path of the PDF.
    pub fn pathname(&self) -> &Path {
        &self.pathname
    }

    /// Same as [`ViewerSession::pathname`]; the host identifies views by it.
    pub fn uri(&self) -> &Path {
        &self.pathname
    }

    pub fn directory(&self) -> &Path {
        self.pathname.parent().unwrap_or(Path::new(""))
    }

    /// Tab title: the PDF's file name.
    pub fn title(&self) -> String {
        self.pathname
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.pathname.display().to_string())
    }

    pub fn is_watching(&self) -> bool {
        self.watch.as_ref().is_some_and(|w| w.is_active())
    }

    /// Reload now, independent of file events.
    pub fn reload(&self) -> ReloadOutcome {
        self.reloader.reload()
    }

    pub fn locator(&self) -> &Locator {
        self.search.locator()
    }

    // ------------------------------------------------------------------------
    // Renderer events
    // ------------------------------------------------------------------------

    /// Contextual click on `target` at viewport `(x, y)`: start a reverse search.
    pub fn on_pointer<E: PageElement>(&self, target: &E, x: f64, y: f64) -> Option<JoinHandle<()>> {
        if !self.gate.is_open() {
            return None;
        }
        self.search.on_pointer(target, x, y)
    }

    /// Reverse search from an already captured sample.
    pub fn locate(&self, sample: PointerSample) -> Option<JoinHandle<()>> {
        if !self.gate.is_open() {
            return None;
        }
        self.search.locate(sample)
    }

    /// Returns `true` if the click was taken over by the host's URL opener.
    pub fn on_link_click(&self, click: &LinkClick) -> bool {
        match guard::external_link(click) {
            Some(url) => {
                debug!("session"; "opening {} externally", url);
                self.host.open_external(url);
                true
            }
            None => false,
        }
    }

    pub fn on_key(&self, chord: &KeyChord) -> KeyDisposition {
        guard::arbitrate_key(chord)
    }

    /// Print requested inside the renderer: run the host's print command.
    pub fn on_print(&self) {
        self.host.dispatch_print();
    }

    // ------------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------------

    /// Close the watch and block late results.
    ///
    /// After this returns no reload or navigation is triggered by this
    /// session. Called automatically on drop.
    pub fn close(&mut self) {
        if let Some(mut watch) = self.watch.take() {
            watch.close();
        }
        if self.gate.is_open() {
            self.gate.close();
            log!("session"; "closed {}", self.title());
        }
    }

    pub fn destroy(mut self) {
        self.close();
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        self.close();
    }
}
