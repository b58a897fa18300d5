//! `pdfsync watch`: a terminal host for one viewer session.
//!
//! The renderer does not draw anything. It checks that the file is a PDF and
//! reports each reload on the status line, which is enough to see the live
//! reload pipeline work against a real LaTeX build.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::SystemTime;

use anyhow::{Context, Result, bail};
use parking_lot::Mutex;
use pdfsync::host::{Host, NavigationRequest};
use pdfsync::logger::{status_error, status_success, status_unchanged};
use pdfsync::renderer::{Renderer, Rotation};
use pdfsync::session::{SessionContext, ViewerSession};
use pdfsync::{Locator, NotifyWatchService, SyncConfig, debug, log};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Identity of one opened revision of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Revision {
    modified: Option<SystemTime>,
    len: u64,
}

/// Renderer that validates and reports instead of drawing.
pub struct TerminalRenderer {
    loaded: AtomicBool,
    last: Mutex<Option<Revision>>,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            loaded: AtomicBool::new(false),
            last: Mutex::new(None),
        }
    }

    fn inspect(path: &Path) -> Result<Revision> {
        let meta =
            fs::metadata(path).with_context(|| format!("cannot read {}", path.display()))?;

        let mut magic = [0u8; 5];
        File::open(path)
            .and_then(|mut file| file.read_exact(&mut magic))
            .with_context(|| format!("cannot read {}", path.display()))?;
        if magic != PDF_MAGIC {
            bail!("{} is not a PDF document", path.display());
        }

        Ok(Revision {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

impl Renderer for TerminalRenderer {
    fn is_ready(&self) -> bool {
        true
    }

    fn open(&self, path: &Path) -> Result<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let revision = match Self::inspect(path) {
            Ok(revision) => revision,
            Err(e) => {
                status_error(&format!("failed to load {name}"), &format!("{e:#}"));
                return Err(e);
            }
        };

        let previous = self.last.lock().replace(revision);
        if previous == Some(revision) {
            status_unchanged(&name);
        } else {
            status_success(&format!("loaded {name} ({} bytes)", revision.len));
        }
        self.loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        if self.loaded.swap(false, Ordering::SeqCst) {
            debug!("reload"; "closed document");
        }
        Ok(())
    }

    fn rotation(&self) -> Rotation {
        Rotation::Deg0
    }

    fn scale(&self) -> f64 {
        1.0
    }
}

/// Host that prints requests instead of acting on them.
pub struct TerminalHost;

impl Host for TerminalHost {
    fn open_file(&self, request: &NavigationRequest) {
        println!("{}:{}", request.file.display(), request.line + 1);
    }

    fn open_external(&self, url: &str) {
        log!("session"; "open {}", url);
    }

    fn show_error(&self, message: &str, detail: &str) {
        status_error(message, detail);
    }

    fn dispatch_print(&self) {
        log!("session"; "print requested");
    }
}

/// Run a session on `pdf` until Ctrl+C.
pub fn watch_pdf(config: &SyncConfig, pdf: &Path) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })
    .context("failed to install Ctrl+C handler")?;

    let ctx = SessionContext {
        host: Arc::new(TerminalHost),
        watcher: Arc::new(NotifyWatchService::new(config.watch.debounce())),
        locator: Locator::new(config.locator.clone()),
        runtime: runtime.handle().clone(),
    };

    let session = ViewerSession::open(pdf, Arc::new(TerminalRenderer::new()), &ctx);
    if !session.is_watching() {
        bail!("cannot watch {}", session.pathname().display());
    }
    log!("watch"; "watching {} (Ctrl+C to stop)", session.pathname().display());

    if session.pathname().exists() {
        session.reload();
    }

    let _ = shutdown_rx.recv();
    log!("watch"; "shutting down...");
    session.destroy();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_renderer_accepts_pdf() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("doc.pdf");
        fs::write(&pdf, b"%PDF-1.7\n%%EOF\n").unwrap();

        let renderer = TerminalRenderer::new();
        renderer.open(&pdf).unwrap();
        renderer.close().unwrap();
        renderer.open(&pdf).unwrap();
    }

    #[test]
    fn test_renderer_rejects_non_pdf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.pdf");
        fs::write(&path, b"\\documentclass{article}").unwrap();

        let err = TerminalRenderer::new().open(&path).unwrap_err();
        assert!(err.to_string().contains("not a PDF"));
    }

    #[test]
    fn test_renderer_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(TerminalRenderer::new().open(&dir.path().join("none.pdf")).is_err());
    }
}
