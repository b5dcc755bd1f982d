//! Composable pointer-drag behaviors and the area that drives them.
//!
//! A behavior implements [`DragLogic`]: three hooks invoked on drag start,
//! move, and end. Behaviors combine in two ways:
//!
//! - decoration: [`GridSnapLogic`] wraps another behavior and post-processes
//!   the position it produced (move first, then snap);
//! - sequencing: [`CompositeLogic`] runs an ordered, editable list.
//!
//! [`DragArea`] turns raw pointer events into those hooks for one token at a
//! time.
//!
//! | Behavior | Effect |
//! |----------|--------|
//! | [`MoveLogic`] | follows the pointer, keeping the grab offset |
//! | [`GridSnapLogic`] | snaps the wrapped behavior's result to the grid |
//! | [`AlphaFeedbackLogic`] | dims the token while dragged |
//! | [`CompositeLogic`] | runs a list of behaviors in insertion order |

mod alpha;
mod area;
mod composite;
mod grid_snap;
mod move_logic;


pub use alpha::AlphaFeedbackLogic;
pub use area::{DragArea, DragAreaError};
pub use composite::{CompositeLogic, LogicId};
pub use grid_snap::GridSnapLogic;
pub use move_logic::MoveLogic;

use crate::grid::GridCollider;
use crate::logger::SharedLogger;
use crate::token::{Token, TokenKey};
use crate::transform::{Point, Transform};

/// The token a drag event applies to, with its parent's transform.
pub struct DragTarget<'a> {
    /// Handle of the token in the active layer.
    pub key: TokenKey,
    /// The token itself; behaviors mutate its position and alpha.
    pub token: &'a mut Token,
    /// Transform of the container holding the token.
    pub parent: Transform,
}

impl DragTarget<'_> {
    /// Convert a viewport-space pointer position into the parent's space.
    #[must_use]
    pub fn to_local(&self, global: Point) -> Point {
        self.parent.to_local(global)
    }
}

/// A side-effecting hook around the three drag lifecycle events.
///
/// `pointer` is always in viewport (global) space.
pub trait DragLogic {
    fn on_drag_start(&mut self, target: &mut DragTarget<'_>, pointer: Point);
    fn on_drag_move(&mut self, target: &mut DragTarget<'_>, pointer: Point);
    fn on_drag_end(&mut self, target: &mut DragTarget<'_>, pointer: Point);
}

impl<L: DragLogic + ?Sized> DragLogic for Box<L> {
    fn on_drag_start(&mut self, target: &mut DragTarget<'_>, pointer: Point) {
        (**self).on_drag_start(target, pointer);
    }

    fn on_drag_move(&mut self, target: &mut DragTarget<'_>, pointer: Point) {
        (**self).on_drag_move(target, pointer);
    }

    fn on_drag_end(&mut self, target: &mut DragTarget<'_>, pointer: Point) {
        (**self).on_drag_end(target, pointer);
    }
}

/// The scene's standard chain: grid-snapped movement, then alpha feedback.
#[must_use]
pub fn default_drag_logic(grid: GridCollider, drag_alpha: f64, logger: &SharedLogger) -> CompositeLogic {
    CompositeLogic::new()
        .with(GridSnapLogic::new(MoveLogic::new(logger), grid, logger))
        .with(AlphaFeedbackLogic::new(drag_alpha, logger))
}
