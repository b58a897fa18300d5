//! Reverse search: rendered PDF position → source file and line.
//!
//! ```text
//! pointer event ──page──> PageHit ──geometry──> page points
//!        ──process──> `synctex edit -o page:x:y:pdf` ──output──> NavigationRequest
//! ```
//!
//! # Module Structure
//!
//! - `page` - Walk from the event target to the enclosing page container
//! - `geometry` - Rotation and zoom aware coordinate mapping
//! - `process` - Locator process spawning and output streaming
//! - `output` - Incremental `Input:`/`Line:` parsing

pub mod geometry;
pub mod output;
pub mod page;
pub mod process;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub use geometry::Rect;
pub use output::LocatorResult;
pub use page::{PageElement, PageHit, resolve_page};
pub use process::Locator;

use crate::host::{Host, NavigationRequest};
use crate::renderer::{Renderer, Rotation};
use crate::session::Gate;
use crate::{debug, log};

// ============================================================================
// Errors
// ============================================================================

/// Reverse-search failures.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("locator `{command}` not found")]
    NotFound {
        command: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to spawn locator `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("locator exited with {}", describe_exit(.code))]
    Exited { code: Option<i32> },

    #[error("locator output has no `Input:`/`Line:` result")]
    Incomplete,

    #[error("locator timed out after {}s", .after.as_secs())]
    Timeout { after: Duration },

    #[error("failed to read locator output")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

impl LocateError {
    /// Whether the user should be told, as opposed to a log line.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Spawn { .. })
    }

    /// Remediation hint shown with user-visible errors.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotFound { command, .. } | Self::Spawn { command, .. } => Some(format!(
                "Verify that SyncTeX is installed and that `{command}` is on your PATH, \
                 or set `[locator] command` to its full path."
            )),
            _ => None,
        }
    }
}

// ============================================================================
// Pointer sample
// ============================================================================

/// Everything captured from one contextual pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// 1-based page index.
    pub page: u32,
    /// Viewport X of the click.
    pub x: f64,
    /// Viewport Y of the click.
    pub y: f64,
    pub rotation: Rotation,
    pub scale: f64,
    /// Page raster surface in viewport space.
    pub rect: Rect,
}

impl PointerSample {
    pub fn new(hit: PageHit, x: f64, y: f64, rotation: Rotation, scale: f64) -> Self {
        Self {
            page: hit.page,
            x,
            y,
            rotation,
            scale,
            rect: hit.rect,
        }
    }

    /// Click position in page-space typographic points.
    ///
    /// `None` for a non-positive or non-finite scale.
    pub fn to_points(&self) -> Option<(i64, i64)> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return None;
        }
        let (px, py) = geometry::to_page_local(&self.rect, self.rotation, self.x, self.y);
        Some((
            geometry::pixels_to_points(px, self.scale),
            geometry::pixels_to_points(py, self.scale),
        ))
    }

    pub fn query(&self, pdf: &Path) -> Option<LocatorQuery> {
        let (x, y) = self.to_points()?;
        Some(LocatorQuery {
            page: self.page,
            x,
            y,
            pdf: pdf.to_path_buf(),
        })
    }
}

/// Arguments of one locator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorQuery {
    pub page: u32,
    /// Page-space X in points.
    pub x: i64,
    /// Page-space Y in points.
    pub y: i64,
    /// Absolute path of the PDF.
    pub pdf: PathBuf,
}

impl LocatorQuery {
    /// The single `page:x:y:pdf` argument.
    pub fn token(&self) -> String {
        format!("{}:{}:{}:{}", self.page, self.x, self.y, self.pdf.display())
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Reverse-search pipeline bound to one viewer session.
pub struct ReverseSearch {
    pdf: PathBuf,
    renderer: Arc<dyn Renderer>,
    host: Arc<dyn Host>,
    locator: Locator,
    runtime: Handle,
    gate: Gate,
}

impl ReverseSearch {
    pub fn new(
        pdf: PathBuf,
        renderer: Arc<dyn Renderer>,
        host: Arc<dyn Host>,
        locator: Locator,
        runtime: Handle,
        gate: Gate,
    ) -> Self {
        Self {
            pdf,
            renderer,
            host,
            locator,
            runtime,
            gate,
        }
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    /// Capture a pointer sample for a click on `target` at viewport `(x, y)`.
    ///
    /// `None` when the click is not on a page.
    pub fn sample<E: PageElement>(&self, target: &E, x: f64, y: f64) -> Option<PointerSample> {
        let hit = resolve_page(target)?;
        Some(PointerSample::new(
            hit,
            x,
            y,
            self.renderer.rotation(),
            self.renderer.scale(),
        ))
    }

    /// Handle a contextual pointer event. Fire-and-forget: the returned
    /// handle only matters to callers that want to await completion.
    pub fn on_pointer<E: PageElement>(&self, target: &E, x: f64, y: f64) -> Option<JoinHandle<()>> {
        let sample = self.sample(target, x, y)?;
        self.locate(sample)
    }

    /// Spawn the locator for an already captured sample.
    pub fn locate(&self, sample: PointerSample) -> Option<JoinHandle<()>> {
        let Some(query) = sample.query(&self.pdf) else {
            debug!("synctex"; "ignoring click with invalid scale {}", sample.scale);
            return None;
        };

        let locator = self.locator.clone();
        let host = Arc::clone(&self.host);
        let gate = self.gate.clone();

        Some(self.runtime.spawn(async move {
            debug!("synctex"; "locating {}", query.token());
            let outcome = locator.run(&query).await;
            deliver(&gate, host.as_ref(), outcome);
        }))
    }
}

/// Route a finished invocation to the host, unless the session is gone.
fn deliver(gate: &Gate, host: &dyn Host, outcome: Result<NavigationRequest, LocateError>) {
    let delivered = gate.run(|| match outcome {
        Ok(request) => {
            debug!("synctex"; "{}:{}", request.file.display(), request.line + 1);
            host.open_file(&request);
        }
        Err(err) if err.is_user_visible() => {
            log!("error"; "{}", err);
            host.show_error(&err.to_string(), &err.hint().unwrap_or_default());
        }
        Err(err) => log!("synctex"; "{}", err),
    });
    if delivered.is_none() {
        debug!("synctex"; "session closed, dropping result");
    }
}
