//! Viewport → page-space coordinate mapping.
//!
//! ```text
//! click (viewport px) ──rotation──> page-local px ──scale──> page points
//! ```

use crate::renderer::Rotation;

/// Reference resolution of the renderer at scale 1.0.
pub const CSS_DPI: f64 = 96.0;

/// Typographic points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Bounding rectangle of a page raster surface, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Map a viewport click into page-local pixels for the given rotation.
///
/// The rotation turns the coordinate frame, so the page origin moves to the
/// corner that is top-left in unrotated page space.
pub fn to_page_local(rect: &Rect, rotation: Rotation, x: f64, y: f64) -> (f64, f64) {
    match rotation {
        Rotation::Deg0 => (x - rect.left, y - rect.top),
        Rotation::Deg90 => (y - rect.top, rect.right - x),
        Rotation::Deg180 => (rect.right - x, rect.bottom - y),
        Rotation::Deg270 => (rect.bottom - y, x - rect.left),
    }
}

/// Inverse of [`to_page_local`].
pub fn to_viewport(rect: &Rect, rotation: Rotation, px: f64, py: f64) -> (f64, f64) {
    match rotation {
        Rotation::Deg0 => (px + rect.left, py + rect.top),
        Rotation::Deg90 => (rect.right - py, px + rect.top),
        Rotation::Deg180 => (rect.right - px, rect.bottom - py),
        Rotation::Deg270 => (py + rect.left, rect.bottom - px),
    }
}

/// Effective resolution in pixels per inch at `scale`.
#[inline]
pub fn resolution(scale: f64) -> f64 {
    scale * CSS_DPI
}

/// Convert page-local pixels to whole typographic points.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub fn pixels_to_points(pixels: f64, scale: f64) -> i64 {
    (pixels / resolution(scale) * POINTS_PER_INCH).round() as i64
}

/// Convert typographic points back to page-local pixels.
#[inline]
#[allow(clippy::cast_precision_loss)]
pub fn points_to_pixels(points: i64, scale: f64) -> f64 {
    points as f64 / POINTS_PER_INCH * resolution(scale)
}
