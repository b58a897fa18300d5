//! Session persistence and viewer addressing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use url::Url;

/// Serializable form of a viewer session, restored on host restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub pathname: PathBuf,
}

impl SessionState {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("failed to serialize session state")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse session state")
    }
}

/// Whether a URI should be opened in a viewer session.
pub fn opens_pdf(uri: &str) -> bool {
    uri.ends_with(".pdf")
}

/// Address of the embedded viewer page with `pdf` as its document.
pub fn viewer_url(viewer_html: &Path, pdf: &Path) -> Result<Url> {
    let mut url = Url::from_file_path(viewer_html)
        .map_err(|()| anyhow!("viewer page must be absolute: {}", viewer_html.display()))?;
    url.query_pairs_mut()
        .append_pair("file", &pdf.to_string_lossy());
    Ok(url)
}
