#[cfg(test)]
#[path = "alpha_test.rs"]
mod alpha_test;

use super::{DragLogic, DragTarget};
use crate::logger::{SharedLogger, with_context};
use crate::transform::Point;

/// Dims the target while it is dragged and restores its opacity afterwards.
pub struct AlphaFeedbackLogic {
    alpha: f64,
    saved_alpha: f64,
    logger: SharedLogger,
}

impl AlphaFeedbackLogic {
    #[must_use]
    pub fn new(alpha: f64, logger: &SharedLogger) -> Self {
        Self { alpha, saved_alpha: 1.0, logger: with_context(logger, "AlphaFeedbackLogic") }
    }

    /// Opacity applied during a drag.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl DragLogic for AlphaFeedbackLogic {
    fn on_drag_start(&mut self, target: &mut DragTarget<'_>, _pointer: Point) {
        self.saved_alpha = target.token.alpha;
        target.token.alpha = self.alpha;

        self.logger
            .debug(&format!("onDragStart: token '{}' alpha: {}", target.token.name, target.token.alpha));
    }

    fn on_drag_move(&mut self, _target: &mut DragTarget<'_>, _pointer: Point) {}

    fn on_drag_end(&mut self, target: &mut DragTarget<'_>, _pointer: Point) {
        target.token.alpha = self.saved_alpha;

        self.logger
            .debug(&format!("onDragEnd: token '{}' alpha: {}", target.token.name, target.token.alpha));
    }
}
