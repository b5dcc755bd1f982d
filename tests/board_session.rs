//! A play session driven through the public API the way a host page does:
//! config in, records synced, a token dragged, fog recomputed.
#![allow(clippy::float_cmp)]

use std::rc::Rc;

use futures::executor::block_on;
use tabletop::config::ViewportConfig;
use tabletop::fog::JsonShader;
use tabletop::input::Button;
use tabletop::logger::{Level, RecordingLogger, SharedLogger};
use tabletop::naming::{image_name, token_name};
use tabletop::scene::{Action, Scene};
use tabletop::token::{ImageSource, Layer};
use tabletop::transform::Point;
use tabletop::viewport::{TokenRecord, ViewportCore};
use uuid::Uuid;

const CONFIG: &str = r##"{
    "rows": 10,
    "columns": 10,
    "cell_size": 50,
    "snap_to_grid": true,
    "background_color": "#202020"
}"##;

/// 500×500 scene in a 500×500 surface: scale 1 at origin.
fn session(logger: &SharedLogger) -> ViewportCore {
    let config = ViewportConfig::from_json(CONFIG).unwrap();
    let shader = JsonShader::new(r#"{ "fog_alpha": 1.0 }"#);
    let scene = block_on(Scene::create(&config.scene, &shader, logger)).unwrap();
    ViewportCore::new(scene, &config, 500.0, 500.0, logger)
}

fn record(name: &str, url: &str, x: f64, y: f64) -> TokenRecord {
    TokenRecord { id: Uuid::new_v4(), name: name.to_string(), source: ImageSource::new(url, 50.0, 50.0), x, y }
}

fn player_names(core: &ViewportCore) -> Vec<String> {
    core.scene.layer(Layer::Player).iter().map(|(_, t)| t.name.clone()).collect()
}

#[test]
fn full_session() {
    let sink = Rc::new(RecordingLogger::new());
    let logger: SharedLogger = sink.clone();
    let mut core = session(&logger);

    assert_eq!(core.background_color, "#202020");
    assert_eq!(core.scene.scale(), 1.0);
    assert!(core.scene.fog().is_ready());

    // The host names the upload and its first instance.
    let image = image_name("hero.png", std::iter::empty());
    let existing = player_names(&core);
    let hero_name = token_name(&image, existing.iter().map(String::as_str));
    assert_eq!(hero_name, "<0> hero");

    let hero = record(&hero_name, "hero.png", 10.0, 10.0);
    let report = core.update(Layer::Player, std::slice::from_ref(&hero));
    assert_eq!(report.added, vec!["<0> hero"]);
    assert_eq!(core.scene.token("<0> hero").unwrap().position, Point::new(0.0, 0.0));

    // A second instance of the same image gets the next number.
    let existing = player_names(&core);
    assert_eq!(token_name(&image, existing.iter().map(String::as_str)), "<1> hero");

    // Fog clears around the hero only.
    assert!(core.update_fog());
    let mask = core.scene.fog().mask();
    assert_eq!(mask.get(2, 2), 0);
    assert_eq!(mask.get(79, 79), 255);

    // Drag the hero across the board.
    let started = core.on_pointer_down(Point::new(10.0, 10.0), Some(Button::Primary));
    assert_eq!(started[0], Action::DragStarted { layer: Layer::Player, name: "<0> hero".into() });
    assert_eq!(core.scene.token("<0> hero").unwrap().alpha, 0.5);

    core.on_pointer_move(Point::new(260.0, 210.0));
    let dropped = core.on_pointer_up(Point::new(260.0, 210.0), Some(Button::Primary), true);
    let landed = Point::new(250.0, 200.0);
    assert_eq!(
        dropped,
        vec![
            Action::TokenMoved { layer: Layer::Player, name: "<0> hero".into(), position: landed },
            Action::RenderNeeded,
        ]
    );
    assert_eq!(core.scene.token("<0> hero").unwrap().alpha, 1.0);

    // The fog follows the hero.
    assert!(core.update_fog());
    let mask = core.scene.fog().mask();
    assert_eq!(mask.get(2, 2), 255);
    assert_eq!(mask.get(44, 36), 0);

    // Re-syncing the same records leaves the moved token alone.
    let report = core.update(Layer::Player, std::slice::from_ref(&hero));
    assert!(!report.changed());
    assert_eq!(core.scene.token("<0> hero").unwrap().position, landed);

    // Building walls hides the fog and the player tokens.
    let wall = record("<0> wall", "wall.png", 110.0, 10.0);
    let report = core.update(Layer::Barrier, std::slice::from_ref(&wall));
    assert!(report.actions.contains(&Action::RenderNeeded));
    assert!(!core.scene.mask_enabled());
    assert!(!core.update_fog());
    assert!(!core.scene.has_token("<0> hero"));

    // Back on the player layer everything is where it was.
    core.update(Layer::Player, std::slice::from_ref(&hero));
    assert!(core.scene.mask_enabled());
    assert_eq!(core.scene.token("<0> hero").unwrap().position, landed);
    assert!(core.update_fog());

    assert!(sink.contains(Level::Info, "Scene: layer changed: PLAYER -> BARRIER"));
    assert_eq!(sink.count(Level::Warn), 0);
    assert_eq!(sink.count(Level::Error), 0);
}

#[test]
fn broken_shader_leaves_board_playable() {
    let sink = Rc::new(RecordingLogger::new());
    let logger: SharedLogger = sink.clone();
    let config = ViewportConfig::from_json(CONFIG).unwrap();
    let scene = block_on(Scene::create(&config.scene, &JsonShader::new("not json"), &logger)).unwrap();
    let mut core = ViewportCore::new(scene, &config, 500.0, 500.0, &logger);

    assert!(!core.scene.fog().is_ready());
    assert!(sink.contains(Level::Warn, "fog disabled"));

    core.update(Layer::Player, &[record("<0> hero", "hero.png", 10.0, 10.0)]);
    assert!(!core.update_fog());

    core.on_pointer_down(Point::new(10.0, 10.0), Some(Button::Primary));
    core.on_pointer_move(Point::new(110.0, 10.0));
    let dropped = core.on_pointer_up(Point::new(110.0, 10.0), Some(Button::Primary), true);
    assert!(matches!(dropped[0], Action::TokenMoved { .. }));
    assert_eq!(core.scene.token("<0> hero").unwrap().position, Point::new(100.0, 0.0));
}

#[test]
fn configured_shader_source_drives_fog() {
    let logger: SharedLogger = Rc::new(RecordingLogger::new());
    let config = ViewportConfig::from_json(CONFIG).unwrap();
    let scene = block_on(Scene::create(&config.scene, &config.shader_source(), &logger)).unwrap();
    assert!(scene.fog().is_ready());
}

#[cfg(not(feature = "browser"))]
#[test]
fn unreachable_shader_url_disables_fog() {
    let sink = Rc::new(RecordingLogger::new());
    let logger: SharedLogger = sink.clone();
    let config = ViewportConfig::from_json(r#"{ "shader_url": "/fog.json" }"#).unwrap();
    let scene = block_on(Scene::create(&config.scene, &config.shader_source(), &logger)).unwrap();

    assert!(!scene.fog().is_ready());
    assert!(sink.contains(Level::Warn, "fog disabled"));
}

#[test]
fn invalid_config_is_rejected() {
    assert!(ViewportConfig::from_json(r#"{ "rows": 0 }"#).is_err());
    assert!(ViewportConfig::from_json(r#"{ "drag_alpha": 2.0 }"#).is_err());
}
