//! Input model: pointer buttons and the drag state machine.
//!
//! `DragState` is the gesture tracked by a drag-and-drop area between
//! pointer-down and pointer-up. The key of the dragged token is the only
//! identity carried; behaviors look the token up through it on every event.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::token::TokenKey;
use crate::transform::Point;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap). The only button that drags.
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

impl Button {
    /// Map a DOM `PointerEvent.button` value.
    #[must_use]
    pub fn from_dom(button: i16) -> Option<Self> {
        match button {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// State of one drag-and-drop area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    /// No token is being dragged; area-wide moves are ignored.
    #[default]
    Idle,
    /// A token is being dragged; area-wide moves are routed to it.
    Dragging {
        /// Key of the dragged token in the active layer.
        key: TokenKey,
        /// Viewport-space position of the most recent pointer event.
        last_pointer: Point,
    },
}

impl DragState {
    /// Key of the dragged token, if any.
    #[must_use]
    pub fn target(&self) -> Option<TokenKey> {
        match self {
            Self::Idle => None,
            Self::Dragging { key, .. } => Some(*key),
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}
