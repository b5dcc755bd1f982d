#[cfg(test)]
#[path = "move_logic_test.rs"]
mod move_logic_test;

use super::{DragLogic, DragTarget};
use crate::logger::{SharedLogger, with_context};
use crate::token::TokenKey;
use crate::transform::Point;

/// Moves the target with the pointer, preserving where it was grabbed.
///
/// The grab offset is recorded in the parent's local space, so the behavior
/// is correct at any scene scale.
pub struct MoveLogic {
    target: Option<TokenKey>,
    offset: Point,
    logger: SharedLogger,
}

impl MoveLogic {
    #[must_use]
    pub fn new(logger: &SharedLogger) -> Self {
        Self { target: None, offset: Point::default(), logger: with_context(logger, "MoveLogic") }
    }

    /// Token currently tracked between start and end.
    #[must_use]
    pub fn tracked(&self) -> Option<TokenKey> {
        self.target
    }

    /// Pointer-to-origin offset recorded at drag start.
    #[must_use]
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Whether `target` is the tracked token. Logs routing errors.
    fn is_tracked(&self, event: &str, target: &DragTarget<'_>) -> bool {
        match self.target {
            Some(key) if key == target.key => true,
            Some(_) => {
                self.logger.error(&format!(
                    "{event}: received token '{}' while another token is tracked",
                    target.token.name
                ));
                false
            }
            None => {
                self.logger.error(&format!("{event}: received token '{}' with no tracked target", target.token.name));
                false
            }
        }
    }
}

impl DragLogic for MoveLogic {
    fn on_drag_start(&mut self, target: &mut DragTarget<'_>, pointer: Point) {
        self.target = Some(target.key);

        let local = target.to_local(pointer);
        let origin = target.token.position;
        self.offset = Point::new(local.x - origin.x, local.y - origin.y);

        self.logger
            .info(&format!("onDragStart: token '{}' [{}, {}]", target.token.name, origin.x, origin.y));
    }

    fn on_drag_move(&mut self, target: &mut DragTarget<'_>, pointer: Point) {
        if !self.is_tracked("onDragMove", target) {
            return;
        }
        let local = target.to_local(pointer);
        target.token.position = Point::new(local.x - self.offset.x, local.y - self.offset.y);
    }

    fn on_drag_end(&mut self, target: &mut DragTarget<'_>, _pointer: Point) {
        if !self.is_tracked("onDragEnd", target) {
            return;
        }
        let p = target.token.position;
        self.logger
            .info(&format!("onDragEnd: token '{}' [{}, {}]", target.token.name, p.x, p.y));
        self.target = None;
    }
}
