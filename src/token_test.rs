#![allow(clippy::float_cmp)]

use super::*;

fn source(w: f64, h: f64) -> ImageSource {
    ImageSource::new("data:image/png;base64,AAAA", w, h)
}

fn token(name: &str, x: f64, y: f64) -> Token {
    Token::new(name, source(64.0, 64.0), Point::new(x, y))
}

// =============================================================
// Layer
// =============================================================

#[test]
fn layer_default_is_player() {
    assert_eq!(Layer::default(), Layer::Player);
}

#[test]
fn layer_index_roundtrips() {
    for layer in Layer::ALL {
        assert_eq!(Layer::from_index(layer.index()), Some(layer));
    }
    assert_eq!(Layer::Background.index(), 0);
    assert_eq!(Layer::Barrier.index(), 1);
    assert_eq!(Layer::Player.index(), 2);
}

#[test]
fn layer_from_unknown_index_is_none() {
    assert_eq!(Layer::from_index(3), None);
}

#[test]
fn layer_display_is_uppercase() {
    assert_eq!(Layer::Barrier.to_string(), "BARRIER");
}

#[test]
fn layer_serializes_uppercase() {
    let json = serde_json::to_string(&Layer::Background).unwrap_or_default();
    assert_eq!(json, "\"BACKGROUND\"");
    let parsed: Layer = serde_json::from_str("\"PLAYER\"").unwrap_or(Layer::Background);
    assert_eq!(parsed, Layer::Player);
}

// =============================================================
// LayerSet
// =============================================================

#[test]
fn layer_set_fields_are_independent() {
    let mut set: LayerSet<Vec<u8>> = LayerSet::default();
    set.get_mut(Layer::Barrier).push(1);
    assert!(set.get(Layer::Background).is_empty());
    assert_eq!(set.get(Layer::Barrier), &vec![1]);
    assert!(set.get(Layer::Player).is_empty());
}

#[test]
fn layer_set_iterates_in_draw_order() {
    let set = LayerSet { background: 'a', barrier: 'b', player: 'c' };
    let order: Vec<(Layer, char)> = set.iter().map(|(l, v)| (l, *v)).collect();
    assert_eq!(order, vec![(Layer::Background, 'a'), (Layer::Barrier, 'b'), (Layer::Player, 'c')]);
}

// =============================================================
// Token
// =============================================================

#[test]
fn token_new_uses_natural_size_and_full_opacity() {
    let t = Token::new("hero", source(40.0, 80.0), Point::new(1.0, 2.0));
    assert_eq!(t.size, Size::new(40.0, 80.0));
    assert_eq!(t.alpha, 1.0);
    assert!(!t.interactive);
}

#[test]
fn token_center_is_box_midpoint() {
    let t = token("a", 64.0, 128.0);
    assert_eq!(t.center(), Point::new(96.0, 160.0));
}

#[test]
fn token_contains_excludes_far_edges() {
    let t = token("a", 0.0, 0.0);
    assert!(t.contains(Point::new(0.0, 0.0)));
    assert!(t.contains(Point::new(63.9, 63.9)));
    assert!(!t.contains(Point::new(64.0, 10.0)));
    assert!(!t.contains(Point::new(-0.1, 10.0)));
}

// =============================================================
// TokenLayer
// =============================================================

#[test]
fn layer_new_is_empty() {
    let layer = TokenLayer::new();
    assert!(layer.is_empty());
    assert_eq!(layer.len(), 0);
}

#[test]
fn insert_then_lookup_by_name_and_key() {
    let mut layer = TokenLayer::new();
    let key = layer.insert(token("a", 1.0, 2.0));
    assert!(key.is_some());
    assert!(layer.contains("a"));
    assert_eq!(layer.key_of("a"), key);
    assert_eq!(layer.by_name("a").map(|t| t.position), Some(Point::new(1.0, 2.0)));
}

#[test]
fn insert_duplicate_name_is_rejected_and_keeps_original() {
    let mut layer = TokenLayer::new();
    layer.insert(token("a", 1.0, 2.0));
    assert!(layer.insert(token("a", 50.0, 50.0)).is_none());
    assert_eq!(layer.len(), 1);
    assert_eq!(layer.by_name("a").map(|t| t.position), Some(Point::new(1.0, 2.0)));
}

#[test]
fn remove_returns_token_and_clears_indexes() {
    let mut layer = TokenLayer::new();
    let key = layer.insert(token("a", 0.0, 0.0));
    let removed = layer.remove("a");
    assert_eq!(removed.as_ref().map(|(k, _)| *k), key);
    assert_eq!(removed.map(|(_, t)| t.name), Some("a".to_owned()));
    assert!(!layer.contains("a"));
    assert!(layer.is_empty());
    assert!(layer.keys().is_empty());
}

#[test]
fn remove_missing_is_none() {
    let mut layer = TokenLayer::new();
    assert!(layer.remove("ghost").is_none());
}

#[test]
fn removed_name_can_be_reused() {
    let mut layer = TokenLayer::new();
    layer.insert(token("a", 0.0, 0.0));
    layer.remove("a");
    assert!(layer.insert(token("a", 5.0, 5.0)).is_some());
}

#[test]
fn stale_key_does_not_resolve() {
    let mut layer = TokenLayer::new();
    let Some(key) = layer.insert(token("a", 0.0, 0.0)) else {
        panic!("insert failed");
    };
    layer.remove("a");
    layer.insert(token("b", 0.0, 0.0));
    assert!(layer.get(key).is_none());
}

#[test]
fn iter_follows_insertion_order() {
    let mut layer = TokenLayer::new();
    for name in ["c", "a", "b"] {
        layer.insert(token(name, 0.0, 0.0));
    }
    layer.remove("a");
    let names: Vec<&str> = layer.iter().map(|(_, t)| t.name.as_str()).collect();
    assert_eq!(names, vec!["c", "b"]);
}

#[test]
fn get_mut_edits_in_place() {
    let mut layer = TokenLayer::new();
    let Some(key) = layer.insert(token("a", 0.0, 0.0)) else {
        panic!("insert failed");
    };
    if let Some(t) = layer.get_mut(key) {
        t.position = Point::new(9.0, 9.0);
    }
    assert_eq!(layer.get(key).map(|t| t.position), Some(Point::new(9.0, 9.0)));
}
