//! Renderer control surface.
//!
//! The embedded PDF renderer is owned by the host. The core only drives it
//! through this capability trait and never touches renderer internals.

use std::path::Path;

use anyhow::Result;

/// Page rotation reported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// All four rotation states, in clockwise order.
    pub const ALL: [Rotation; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    /// Normalize a rotation in degrees. Negative and > 360 values wrap;
    /// anything that is not a multiple of 90 is rejected.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

/// Control surface of the embedded renderer.
///
/// `scale` is dimensionless, relative to 96 pixels per inch at 1.0.
///
/// `open` and `close` run inside watch delivery. Implementations must not
/// close or destroy the session that invoked them.
pub trait Renderer: Send + Sync {
    /// Whether the renderer has finished initializing and accepts commands.
    fn is_ready(&self) -> bool;

    /// Open (or reopen) the document at `path`.
    fn open(&self, path: &Path) -> Result<()>;

    /// Close the currently open document.
    fn close(&self) -> Result<()>;

    /// Current page rotation.
    fn rotation(&self) -> Rotation;

    /// Current zoom scale.
    fn scale(&self) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(0), Some(Rotation::Deg0));
        assert_eq!(Rotation::from_degrees(90), Some(Rotation::Deg90));
        assert_eq!(Rotation::from_degrees(180), Some(Rotation::Deg180));
        assert_eq!(Rotation::from_degrees(270), Some(Rotation::Deg270));
    }

    #[test]
    fn test_rotation_wraps() {
        assert_eq!(Rotation::from_degrees(360), Some(Rotation::Deg0));
        assert_eq!(Rotation::from_degrees(-90), Some(Rotation::Deg270));
        assert_eq!(Rotation::from_degrees(450), Some(Rotation::Deg90));
    }

    #[test]
    fn test_rotation_rejects_odd_angles() {
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::from_degrees(91), None);
    }

    #[test]
    fn test_rotation_degrees_roundtrip() {
        for rotation in Rotation::ALL {
            assert_eq!(Rotation::from_degrees(rotation.degrees()), Some(rotation));
        }
    }
}
