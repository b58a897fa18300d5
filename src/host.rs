//! Requests from the core to the host application.

use std::path::PathBuf;

/// Open a source file at a zero-based line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub file: PathBuf,
    /// Zero-based line.
    pub line: u32,
    /// Reuse an existing pane showing `file` before creating a new one.
    pub search_all_panes: bool,
}

impl NavigationRequest {
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            search_all_panes: true,
        }
    }
}

/// Host application services consumed by a viewer session.
///
/// Implementations must not call back into the session that invoked them.
pub trait Host: Send + Sync {
    /// Open a source file at the requested location.
    fn open_file(&self, request: &NavigationRequest);

    /// Open a URL with the platform's default handler.
    fn open_external(&self, url: &str);

    /// Show a user-visible error notification.
    fn show_error(&self, message: &str, detail: &str);

    /// Dispatch the host's own print command against the viewer container.
    fn dispatch_print(&self);
}
