#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use serde::{Deserialize, Serialize};

/// A point in either viewport (global) or scene-local space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Width and height in scene-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Placement of the scene container inside the viewport.
///
/// `x` / `y` are the viewport position of the scene's top-left corner.
/// `scale` is a uniform factor (1.0 = one scene pixel per viewport pixel).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, scale: 1.0 }
    }
}

impl Transform {
    /// Convert a viewport-space point to scene-local coordinates.
    #[must_use]
    pub fn to_local(&self, global: Point) -> Point {
        Point {
            x: (global.x - self.x) / self.scale,
            y: (global.y - self.y) / self.scale,
        }
    }

    /// Convert a scene-local point to viewport coordinates.
    #[must_use]
    pub fn to_global(&self, local: Point) -> Point {
        Point {
            x: local.x * self.scale + self.x,
            y: local.y * self.scale + self.y,
        }
    }
}
