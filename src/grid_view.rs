//! Grid line geometry regenerated whenever the scene is rescaled.

#[cfg(test)]
#[path = "grid_view_test.rs"]
mod grid_view_test;

use crate::consts::GRID_LINE_WIDTH_PX;
use crate::grid::GridCollider;
use crate::transform::Point;

/// One straight grid line in scene-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub from: Point,
    pub to: Point,
}

/// Drawable grid lines for a [`GridCollider`].
///
/// The line width is stored in scene-local units and compensates for the
/// scene scale, so lines keep the same on-screen weight at every zoom.
#[derive(Debug, Clone)]
pub struct GridView {
    collider: GridCollider,
    color: String,
    line_width: f64,
    lines: Vec<GridLine>,
}

impl GridView {
    #[must_use]
    pub fn new(collider: GridCollider, color: impl Into<String>) -> Self {
        let mut view = Self { collider, color: color.into(), line_width: GRID_LINE_WIDTH_PX, lines: Vec::new() };
        view.redraw(1.0);
        view
    }

    /// Clear and regenerate every line for the given scene scale.
    pub fn redraw(&mut self, scale: f64) {
        self.lines.clear();
        self.line_width = if scale > 0.0 { GRID_LINE_WIDTH_PX / scale } else { GRID_LINE_WIDTH_PX };

        let cell = self.collider.cell_size();
        let width = self.collider.width();
        let height = self.collider.height();

        for i in 0..=self.collider.rows() {
            let x = f64::from(i) * cell;
            self.lines.push(GridLine { from: Point::new(x, 0.0), to: Point::new(x, height) });
        }
        for i in 0..=self.collider.columns() {
            let y = f64::from(i) * cell;
            self.lines.push(GridLine { from: Point::new(0.0, y), to: Point::new(width, y) });
        }
    }

    #[must_use]
    pub fn collider(&self) -> &GridCollider {
        &self.collider
    }

    #[must_use]
    pub fn lines(&self) -> &[GridLine] {
        &self.lines
    }

    /// Line width in scene-local pixels.
    #[must_use]
    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }
}
