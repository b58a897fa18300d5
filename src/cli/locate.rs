//! `pdfsync locate`: one reverse search from the command line.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use pdfsync::locate::{PageHit, Rect};
use pdfsync::utils::path::absolute_file_path;
use pdfsync::{Locator, PointerSample, Rotation, SyncConfig, debug};

/// Click position as given on the command line.
#[derive(Debug, Clone, Copy)]
pub struct Click {
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub rotation: i32,
    pub scale: f64,
    pub rect: Rect,
}

/// Resolve `click` on `pdf` and print `file:line`.
pub fn locate_click(config: &SyncConfig, pdf: &Path, click: Click) -> Result<()> {
    let rotation = Rotation::from_degrees(click.rotation)
        .ok_or_else(|| anyhow!("rotation must be a multiple of 90, got {}", click.rotation))?;

    let hit = PageHit {
        page: click.page,
        rect: click.rect,
    };
    let sample = PointerSample::new(hit, click.x, click.y, rotation, click.scale);
    let pdf = absolute_file_path(pdf);
    let query = sample
        .query(&pdf)
        .ok_or_else(|| anyhow!("scale must be positive, got {}", click.scale))?;
    debug!("synctex"; "query {}", query.token());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    let locator = Locator::new(config.locator.clone());
    match runtime.block_on(locator.run(&query)) {
        Ok(request) => {
            println!("{}:{}", request.file.display(), request.line + 1);
            Ok(())
        }
        Err(e) => {
            let hint = e.hint();
            let err = anyhow::Error::new(e).context("reverse search failed");
            match hint {
                Some(hint) => Err(err.context(hint)),
                None => Err(err),
            }
        }
    }
}
