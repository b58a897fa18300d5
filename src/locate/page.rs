//! Page resolution from a pointer event target.

use super::geometry::Rect;

/// A node in the renderer's element tree, as seen from a pointer event.
///
/// Implemented by hosts over their DOM (or equivalent) handles.
pub trait PageElement: Clone {
    /// Parent node, `None` at the root.
    fn parent(&self) -> Option<Self>;

    /// Whether this node is a rendered page container.
    fn is_page(&self) -> bool;

    /// The page's declared 1-based index attribute, unparsed.
    fn page_number(&self) -> Option<String>;

    /// Bounding rectangle of the page's raster surface in viewport space.
    fn raster_rect(&self) -> Option<Rect>;
}

/// A resolved page under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageHit {
    /// 1-based page index.
    pub page: u32,
    pub rect: Rect,
}

/// Walk up from `target` (inclusive) to the nearest page container.
pub fn closest_page<E: PageElement>(target: &E) -> Option<E> {
    let mut current = Some(target.clone());
    while let Some(node) = current {
        if node.is_page() {
            return Some(node);
        }
        current = node.parent();
    }
    None
}

/// Resolve page number and raster rectangle under `target`.
///
/// Returns `None` for clicks outside any page, unparseable page indices or
/// pages without a raster surface.
pub fn resolve_page<E: PageElement>(target: &E) -> Option<PageHit> {
    let page = closest_page(target)?;
    let number = parse_page_number(&page.page_number()?)?;
    let rect = page.raster_rect()?;
    Some(PageHit { page: number, rect })
}

fn parse_page_number(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|&n| n >= 1)
}
