#[cfg(test)]
#[path = "composite_test.rs"]
mod composite_test;

use super::{DragLogic, DragTarget};
use crate::transform::Point;

/// Handle returned by [`CompositeLogic::add`], used to remove a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogicId(u64);

/// Runs its members in insertion order for every event.
#[derive(Default)]
pub struct CompositeLogic {
    items: Vec<(LogicId, Box<dyn DragLogic>)>,
    next_id: u64,
}

impl CompositeLogic {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`CompositeLogic::add`].
    #[must_use]
    pub fn with(mut self, logic: impl DragLogic + 'static) -> Self {
        self.add(logic);
        self
    }

    /// Append a member; it runs after every existing member.
    pub fn add(&mut self, logic: impl DragLogic + 'static) -> LogicId {
        let id = LogicId(self.next_id);
        self.next_id += 1;
        self.items.push((id, Box::new(logic)));
        id
    }

    /// Remove a member, preserving the order of the rest.
    pub fn remove(&mut self, id: LogicId) -> Option<Box<dyn DragLogic>> {
        let index = self.items.iter().position(|(item_id, _)| *item_id == id)?;
        Some(self.items.remove(index).1)
    }

    /// Member ids in invocation order.
    #[must_use]
    pub fn ids(&self) -> Vec<LogicId> {
        self.items.iter().map(|(id, _)| *id).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl DragLogic for CompositeLogic {
    fn on_drag_start(&mut self, target: &mut DragTarget<'_>, pointer: Point) {
        for (_, logic) in &mut self.items {
            logic.on_drag_start(target, pointer);
        }
    }

    fn on_drag_move(&mut self, target: &mut DragTarget<'_>, pointer: Point) {
        for (_, logic) in &mut self.items {
            logic.on_drag_move(target, pointer);
        }
    }

    fn on_drag_end(&mut self, target: &mut DragTarget<'_>, pointer: Point) {
        for (_, logic) in &mut self.items {
            logic.on_drag_end(target, pointer);
        }
    }
}
