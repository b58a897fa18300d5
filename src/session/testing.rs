//! Test doubles for the renderer and host.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, bail};
use parking_lot::Mutex;

use crate::host::{Host, NavigationRequest};
use crate::renderer::{Renderer, Rotation};

/// Renderer that records the commands it receives.
pub(crate) struct FakeRenderer {
    ready: AtomicBool,
    fail_open: AtomicBool,
    fail_close: AtomicBool,
    calls: Mutex<Vec<String>>,
    rotation: Mutex<Rotation>,
    scale: Mutex<f64>,
}

impl FakeRenderer {
    pub(crate) fn ready() -> Self {
        Self {
            ready: AtomicBool::new(true),
            fail_open: AtomicBool::new(false),
            fail_close: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
            rotation: Mutex::new(Rotation::Deg0),
            scale: Mutex::new(1.0),
        }
    }

    pub(crate) fn loading() -> Self {
        let renderer = Self::ready();
        renderer.set_ready(false);
        renderer
    }

    pub(crate) fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub(crate) fn fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_close(&self, fail: bool) {
        self.fail_close.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_view(&self, rotation: Rotation, scale: f64) {
        *self.rotation.lock() = rotation;
        *self.scale.lock() = scale;
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl Renderer for FakeRenderer {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn open(&self, path: &Path) -> Result<()> {
        if self.fail_open.load(Ordering::SeqCst) {
            bail!("corrupt document");
        }
        self.calls.lock().push(format!("open {}", path.display()));
        Ok(())
    }

    fn close(&self) -> Result<()> {
        if self.fail_close.load(Ordering::SeqCst) {
            bail!("renderer busy");
        }
        self.calls.lock().push("close".into());
        Ok(())
    }

    fn rotation(&self) -> Rotation {
        *self.rotation.lock()
    }

    fn scale(&self) -> f64 {
        *self.scale.lock()
    }
}

/// Host that records every request.
#[derive(Default)]
pub(crate) struct RecordingHost {
    navigations: Mutex<Vec<NavigationRequest>>,
    errors: Mutex<Vec<(String, String)>>,
    urls: Mutex<Vec<String>>,
    prints: Mutex<usize>,
}

impl RecordingHost {
    pub(crate) fn navigations(&self) -> Vec<NavigationRequest> {
        self.navigations.lock().clone()
    }

    pub(crate) fn errors(&self) -> Vec<(String, String)> {
        self.errors.lock().clone()
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }

    pub(crate) fn prints(&self) -> usize {
        *self.prints.lock()
    }
}

impl Host for RecordingHost {
    fn open_file(&self, request: &NavigationRequest) {
        self.navigations.lock().push(request.clone());
    }

    fn open_external(&self, url: &str) {
        self.urls.lock().push(url.to_string());
    }

    fn show_error(&self, message: &str, detail: &str) {
        self.errors
            .lock()
            .push((message.to_string(), detail.to_string()));
    }

    fn dispatch_print(&self) {
        *self.prints.lock() += 1;
    }
}
