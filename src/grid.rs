//! Square grid geometry: scene extents and snapping.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use crate::consts::{MAX_GRID_CELLS, MAX_SCENE_EXTENT_PX};
use crate::transform::{Point, Size};

/// Error returned by [`GridCollider::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// One of the grid dimensions is zero.
    #[error("grid dimensions must be positive: rows={rows}, columns={columns}, cell_size={cell_size}")]
    NonPositive { rows: u32, columns: u32, cell_size: u32 },
    /// The grid exceeds [`MAX_GRID_CELLS`] cells or [`MAX_SCENE_EXTENT_PX`]
    /// pixels along an axis.
    #[error("grid too large: rows={rows}, columns={columns}, cell_size={cell_size}")]
    TooLarge { rows: u32, columns: u32, cell_size: u32 },
}

/// Immutable square grid.
///
/// `rows` cells span the scene width and `columns` cells span its height,
/// so a 24×20 grid of 64 px cells is 1536×1280 scene pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCollider {
    rows: u32,
    columns: u32,
    cell_size: u32,
}

impl GridCollider {
    /// Build a grid.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonPositive`] if any dimension is zero and
    /// [`GeometryError::TooLarge`] if either axis is over the size limits.
    pub fn new(rows: u32, columns: u32, cell_size: u32) -> Result<Self, GeometryError> {
        if rows == 0 || columns == 0 || cell_size == 0 {
            return Err(GeometryError::NonPositive { rows, columns, cell_size });
        }
        let fits = |cells: u32| {
            cells <= MAX_GRID_CELLS && cells.checked_mul(cell_size).is_some_and(|px| px <= MAX_SCENE_EXTENT_PX)
        };
        if !fits(rows) || !fits(columns) {
            return Err(GeometryError::TooLarge { rows, columns, cell_size });
        }
        Ok(Self { rows, columns, cell_size })
    }

    /// Cells along the scene width.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Cells along the scene height.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    #[must_use]
    pub fn cell_size(&self) -> f64 {
        f64::from(self.cell_size)
    }

    /// Scene width in pixels.
    #[must_use]
    pub fn width(&self) -> f64 {
        f64::from(self.rows) * self.cell_size()
    }

    /// Scene height in pixels.
    #[must_use]
    pub fn height(&self) -> f64 {
        f64::from(self.columns) * self.cell_size()
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Nearest multiple of the cell size; halves round away from zero.
    #[must_use]
    pub fn snap_to_grid(&self, value: f64) -> f64 {
        (value / self.cell_size()).round() * self.cell_size()
    }

    /// Snap both coordinates of `p`.
    #[must_use]
    pub fn snap_point(&self, p: Point) -> Point {
        Point::new(self.snap_to_grid(p.x), self.snap_to_grid(p.y))
    }

    /// Clamp `p` into `[0, width] × [0, height]`.
    #[must_use]
    pub fn clamp_point(&self, p: Point) -> Point {
        Point::new(p.x.clamp(0.0, self.width()), p.y.clamp(0.0, self.height()))
    }
}
