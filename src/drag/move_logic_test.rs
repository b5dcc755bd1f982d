#![allow(clippy::float_cmp)]

use std::rc::Rc;

use super::*;
use crate::logger::{Level, RecordingLogger};
use crate::token::{ImageSource, Token, TokenLayer};
use crate::transform::Transform;

fn layer_with(names: &[&str]) -> (TokenLayer, Vec<TokenKey>) {
    let mut layer = TokenLayer::new();
    let keys = names
        .iter()
        .map(|name| {
            let token = Token::new(*name, ImageSource::new("img.png", 64.0, 64.0), Point::new(64.0, 64.0));
            layer.insert(token).unwrap()
        })
        .collect();
    (layer, keys)
}

fn recording() -> (Rc<RecordingLogger>, SharedLogger) {
    let sink = Rc::new(RecordingLogger::new());
    let shared: SharedLogger = sink.clone();
    (sink, shared)
}

// =============================================================
// Start
// =============================================================

#[test]
fn start_records_offset_from_token_origin() {
    let (_, logger) = recording();
    let (mut layer, keys) = layer_with(&["a"]);
    let mut logic = MoveLogic::new(&logger);

    let mut target = DragTarget { key: keys[0], token: layer.get_mut(keys[0]).unwrap(), parent: Transform::default() };
    logic.on_drag_start(&mut target, Point::new(80.0, 100.0));

    assert_eq!(logic.tracked(), Some(keys[0]));
    assert_eq!(logic.offset(), Point::new(16.0, 36.0));
}

#[test]
fn start_offset_is_in_parent_space() {
    let (_, logger) = recording();
    let (mut layer, keys) = layer_with(&["a"]);
    let mut logic = MoveLogic::new(&logger);
    let parent = Transform { x: 10.0, y: 20.0, scale: 0.5 };

    let mut target = DragTarget { key: keys[0], token: layer.get_mut(keys[0]).unwrap(), parent };
    // global (50, 60) -> local (80, 80)
    logic.on_drag_start(&mut target, Point::new(50.0, 60.0));

    assert_eq!(logic.offset(), Point::new(16.0, 16.0));
}

// =============================================================
// Move
// =============================================================

#[test]
fn move_keeps_grab_offset() {
    let (_, logger) = recording();
    let (mut layer, keys) = layer_with(&["a"]);
    let mut logic = MoveLogic::new(&logger);
    let mut target = DragTarget { key: keys[0], token: layer.get_mut(keys[0]).unwrap(), parent: Transform::default() };

    logic.on_drag_start(&mut target, Point::new(70.0, 70.0));
    logic.on_drag_move(&mut target, Point::new(170.0, 90.0));

    assert_eq!(target.token.position, Point::new(164.0, 84.0));
}

#[test]
fn move_accounts_for_parent_scale() {
    let (_, logger) = recording();
    let (mut layer, keys) = layer_with(&["a"]);
    let mut logic = MoveLogic::new(&logger);
    let parent = Transform { x: 0.0, y: 0.0, scale: 2.0 };
    let mut target = DragTarget { key: keys[0], token: layer.get_mut(keys[0]).unwrap(), parent };

    // local (64, 64): grabbed exactly at the origin
    logic.on_drag_start(&mut target, Point::new(128.0, 128.0));
    // 20 viewport px at scale 2 is 10 scene px
    logic.on_drag_move(&mut target, Point::new(148.0, 128.0));

    assert_eq!(target.token.position, Point::new(74.0, 64.0));
}

#[test]
fn move_for_untracked_token_is_logged_and_ignored() {
    let (sink, logger) = recording();
    let (mut layer, keys) = layer_with(&["a", "b"]);
    let mut logic = MoveLogic::new(&logger);

    {
        let mut a = DragTarget { key: keys[0], token: layer.get_mut(keys[0]).unwrap(), parent: Transform::default() };
        logic.on_drag_start(&mut a, Point::new(64.0, 64.0));
    }
    let mut b = DragTarget { key: keys[1], token: layer.get_mut(keys[1]).unwrap(), parent: Transform::default() };
    logic.on_drag_move(&mut b, Point::new(300.0, 300.0));

    assert_eq!(b.token.position, Point::new(64.0, 64.0));
    assert!(sink.contains(Level::Error, "onDragMove"));
    assert_eq!(logic.tracked(), Some(keys[0]));
}

#[test]
fn move_without_start_is_logged_and_ignored() {
    let (sink, logger) = recording();
    let (mut layer, keys) = layer_with(&["a"]);
    let mut logic = MoveLogic::new(&logger);
    let mut target = DragTarget { key: keys[0], token: layer.get_mut(keys[0]).unwrap(), parent: Transform::default() };

    logic.on_drag_move(&mut target, Point::new(300.0, 300.0));

    assert_eq!(target.token.position, Point::new(64.0, 64.0));
    assert!(sink.contains(Level::Error, "no tracked target"));
}

// =============================================================
// End
// =============================================================

#[test]
fn end_leaves_position_and_clears_tracking() {
    let (sink, logger) = recording();
    let (mut layer, keys) = layer_with(&["a"]);
    let mut logic = MoveLogic::new(&logger);
    let mut target = DragTarget { key: keys[0], token: layer.get_mut(keys[0]).unwrap(), parent: Transform::default() };

    logic.on_drag_start(&mut target, Point::new(64.0, 64.0));
    logic.on_drag_move(&mut target, Point::new(100.0, 100.0));
    logic.on_drag_end(&mut target, Point::new(500.0, 500.0));

    assert_eq!(target.token.position, Point::new(100.0, 100.0));
    assert!(logic.tracked().is_none());
    assert!(sink.contains(Level::Info, "MoveLogic: onDragEnd: token 'a' [100, 100]"));
}

#[test]
fn end_for_untracked_token_keeps_tracking() {
    let (sink, logger) = recording();
    let (mut layer, keys) = layer_with(&["a", "b"]);
    let mut logic = MoveLogic::new(&logger);

    {
        let mut a = DragTarget { key: keys[0], token: layer.get_mut(keys[0]).unwrap(), parent: Transform::default() };
        logic.on_drag_start(&mut a, Point::new(64.0, 64.0));
    }
    let mut b = DragTarget { key: keys[1], token: layer.get_mut(keys[1]).unwrap(), parent: Transform::default() };
    logic.on_drag_end(&mut b, Point::new(0.0, 0.0));

    assert_eq!(logic.tracked(), Some(keys[0]));
    assert!(sink.contains(Level::Error, "onDragEnd"));
}
