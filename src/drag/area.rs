#[cfg(test)]
#[path = "area_test.rs"]
mod area_test;

use std::collections::HashMap;

use super::{DragLogic, DragTarget};
use crate::hit::hit_test;
use crate::input::DragState;
use crate::logger::{SharedLogger, with_context};
use crate::token::{Token, TokenKey, TokenLayer};
use crate::transform::{Point, Transform};

/// Error returned by [`DragArea::attach`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DragAreaError {
    /// An object with this name is already attached.
    #[error("object '{0}' is already attached")]
    AlreadyAttached(String),
}

/// Routes pointer events on a container to a [`DragLogic`] chain.
///
/// At most one attached token is dragged at a time. Once a drag starts, moves
/// anywhere over the area are routed to the tracked token, so a fast pointer
/// that leaves the token's bounds keeps dragging it. Pointer-up and
/// pointer-up-outside both complete the drag.
pub struct DragArea {
    logic: Box<dyn DragLogic>,
    attached: HashMap<String, TokenKey>,
    state: DragState,
    logger: SharedLogger,
}

impl DragArea {
    #[must_use]
    pub fn new(logic: impl DragLogic + 'static, logger: &SharedLogger) -> Self {
        Self {
            logic: Box::new(logic),
            attached: HashMap::new(),
            state: DragState::Idle,
            logger: with_context(logger, "DragArea"),
        }
    }

    /// Replace the behavior chain. Any drag in flight keeps its state but
    /// continues with the new chain.
    pub fn set_logic(&mut self, logic: impl DragLogic + 'static) {
        self.logic = Box::new(logic);
    }

    // --- Membership ---

    /// Make `token` interactive and track it under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DragAreaError::AlreadyAttached`] if a token with the same
    /// name is already attached.
    pub fn attach(&mut self, key: TokenKey, token: &mut Token) -> Result<TokenKey, DragAreaError> {
        if self.attached.contains_key(&token.name) {
            return Err(DragAreaError::AlreadyAttached(token.name.clone()));
        }
        token.interactive = true;
        self.attached.insert(token.name.clone(), key);
        Ok(key)
    }

    /// Reverse [`DragArea::attach`]. A drag in progress on this token is
    /// completed first. Returns false if the token was not attached.
    pub fn detach(&mut self, key: TokenKey, token: &mut Token, parent: Transform) -> bool {
        if self.attached.get(&token.name) != Some(&key) {
            return false;
        }
        if let DragState::Dragging { key: dragged, last_pointer } = self.state {
            if dragged == key {
                let mut target = DragTarget { key, token: &mut *token, parent };
                self.logic.on_drag_end(&mut target, last_pointer);
                self.state = DragState::Idle;
            }
        }
        token.interactive = false;
        self.attached.remove(&token.name);
        true
    }

    /// Attach every token of `layer`, skipping names already attached.
    pub fn attach_all(&mut self, layer: &mut TokenLayer) {
        for key in layer.keys() {
            if let Some(token) = layer.get_mut(key) {
                if let Err(e) = self.attach(key, token) {
                    self.logger.warn(&format!("attach_all: {e}"));
                }
            }
        }
    }

    /// Detach every token of `layer`, completing any drag in progress.
    pub fn detach_all(&mut self, layer: &mut TokenLayer, parent: Transform) {
        for key in layer.keys() {
            if let Some(token) = layer.get_mut(key) {
                self.detach(key, token, parent);
            }
        }
    }

    /// Whether a token named `name` is attached.
    #[must_use]
    pub fn has_object(&self, name: &str) -> bool {
        self.attached.contains_key(name)
    }

    /// Number of attached tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attached.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    // --- Drag state ---

    #[must_use]
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Key of the token being dragged, if any.
    #[must_use]
    pub fn dragged(&self) -> Option<TokenKey> {
        self.state.target()
    }

    // --- Pointer events ---

    /// Start dragging the topmost attached token under `pointer`.
    ///
    /// Returns the key of the token that started dragging. Ignored while a
    /// drag is already in progress.
    pub fn pointer_down(&mut self, pointer: Point, layer: &mut TokenLayer, parent: Transform) -> Option<TokenKey> {
        if self.state.is_dragging() {
            self.logger.debug("pointer down ignored: drag already in progress");
            return None;
        }

        let key = hit_test(parent.to_local(pointer), layer)?;
        let token = layer.get_mut(key)?;
        if self.attached.get(&token.name) != Some(&key) {
            return None;
        }

        self.state = DragState::Dragging { key, last_pointer: pointer };
        let mut target = DragTarget { key, token, parent };
        self.logic.on_drag_start(&mut target, pointer);
        Some(key)
    }

    /// Route an area-wide move to the tracked token.
    ///
    /// Returns the key of the moved token, or `None` when idle.
    pub fn pointer_move(&mut self, pointer: Point, layer: &mut TokenLayer, parent: Transform) -> Option<TokenKey> {
        let DragState::Dragging { key, .. } = self.state else {
            self.logger.debug("pointer move ignored: no tracked target");
            return None;
        };
        let Some(token) = layer.get_mut(key) else {
            self.logger.warn("pointer move: tracked token no longer exists");
            self.state = DragState::Idle;
            return None;
        };

        self.state = DragState::Dragging { key, last_pointer: pointer };
        let mut target = DragTarget { key, token, parent };
        self.logic.on_drag_move(&mut target, pointer);
        Some(key)
    }

    /// Complete the drag. Pointer-up-outside is routed here too.
    ///
    /// Returns the key of the token that was dropped.
    pub fn pointer_up(&mut self, pointer: Point, layer: &mut TokenLayer, parent: Transform) -> Option<TokenKey> {
        let DragState::Dragging { key, .. } = self.state else {
            return None;
        };
        self.state = DragState::Idle;
        let Some(token) = layer.get_mut(key) else {
            self.logger.warn("pointer up: tracked token no longer exists");
            return None;
        };

        let mut target = DragTarget { key, token, parent };
        self.logic.on_drag_end(&mut target, pointer);
        Some(key)
    }

    /// Complete any drag in progress at the last known pointer position.
    pub fn release(&mut self, layer: &mut TokenLayer, parent: Transform) -> Option<TokenKey> {
        let DragState::Dragging { last_pointer, .. } = self.state else {
            return None;
        };
        self.pointer_up(last_pointer, layer, parent)
    }
}
