#[cfg(test)]
#[path = "grid_snap_test.rs"]
mod grid_snap_test;

use super::{DragLogic, DragTarget};
use crate::grid::GridCollider;
use crate::logger::{SharedLogger, with_context};
use crate::transform::Point;

/// Snaps the position produced by the wrapped behavior to the grid.
pub struct GridSnapLogic<L> {
    inner: L,
    grid: GridCollider,
    logger: SharedLogger,
}

impl<L: DragLogic> GridSnapLogic<L> {
    #[must_use]
    pub fn new(inner: L, grid: GridCollider, logger: &SharedLogger) -> Self {
        Self { inner, grid, logger: with_context(logger, "GridSnapLogic") }
    }

    #[must_use]
    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: DragLogic> DragLogic for GridSnapLogic<L> {
    fn on_drag_start(&mut self, target: &mut DragTarget<'_>, pointer: Point) {
        self.inner.on_drag_start(target, pointer);

        let p = target.token.position;
        self.logger
            .info(&format!("onDragStart: token '{}' [{}, {}]", target.token.name, p.x, p.y));
    }

    fn on_drag_move(&mut self, target: &mut DragTarget<'_>, pointer: Point) {
        self.inner.on_drag_move(target, pointer);

        target.token.position = self.grid.snap_point(target.token.position);
    }

    fn on_drag_end(&mut self, target: &mut DragTarget<'_>, pointer: Point) {
        self.inner.on_drag_end(target, pointer);

        let p = target.token.position;
        self.logger
            .info(&format!("onDragEnd: token '{}' [{}, {}]", target.token.name, p.x, p.y));
    }
}
