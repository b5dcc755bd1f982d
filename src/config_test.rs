#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn empty_object_yields_defaults() {
    let config = SceneConfig::from_json("{}").unwrap();
    assert_eq!(config, SceneConfig::default());
    assert_eq!(config.rows, 24);
    assert_eq!(config.columns, 20);
    assert_eq!(config.cell_size, 64);
    assert_eq!(config.drag_alpha, 0.5);
    assert_eq!(config.grid_color, "#FFFFFF");
}

#[test]
fn default_grid_is_1536_by_1280() {
    let grid = SceneConfig::default().grid().unwrap();
    assert_eq!(grid.width(), 1536.0);
    assert_eq!(grid.height(), 1280.0);
}

#[test]
fn overrides_are_applied() {
    let config = SceneConfig::from_json(r#"{"rows": 10, "cell_size": 50, "drag_alpha": 0.25}"#).unwrap();
    assert_eq!(config.rows, 10);
    assert_eq!(config.columns, 20);
    assert_eq!(config.cell_size, 50);
    assert_eq!(config.drag_alpha, 0.25);
}

#[test]
fn zero_dimension_is_geometry_error() {
    let err = SceneConfig::from_json(r#"{"cell_size": 0}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Geometry(GeometryError::NonPositive { cell_size: 0, .. })));
}

#[test]
fn negative_dimension_is_parse_error() {
    assert!(matches!(SceneConfig::from_json(r#"{"rows": -1}"#), Err(ConfigError::Parse(_))));
}

#[test]
fn fractional_dimension_is_parse_error() {
    assert!(matches!(SceneConfig::from_json(r#"{"cell_size": 12.5}"#), Err(ConfigError::Parse(_))));
}

#[test]
fn drag_alpha_out_of_range_is_rejected() {
    let err = SceneConfig::from_json(r#"{"drag_alpha": 1.5}"#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidDragAlpha(a) if a == 1.5));
}

#[test]
fn zero_fog_resolution_is_rejected() {
    assert!(matches!(
        SceneConfig::from_json(r#"{"fog_texels_per_cell": 0}"#),
        Err(ConfigError::InvalidFogResolution(0))
    ));
}

#[test]
fn excessive_fog_resolution_is_rejected() {
    assert!(matches!(
        SceneConfig::from_json(r#"{"fog_texels_per_cell": 65}"#),
        Err(ConfigError::InvalidFogResolution(65))
    ));
    assert!(SceneConfig::from_json(r#"{"fog_texels_per_cell": 64}"#).is_ok());
}

#[test]
fn oversized_grid_is_rejected() {
    let err = SceneConfig::from_json(r#"{"rows": 600000000, "columns": 1, "cell_size": 1}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Geometry(GeometryError::TooLarge { rows: 600_000_000, .. })));
}

#[test]
fn viewport_config_flattens_scene_fields() {
    let config = ViewportConfig::from_json(
        r##"{"rows": 12, "snap_to_grid": false, "shader_url": "/fog.json", "background_color": "#000"}"##,
    )
    .unwrap();
    assert_eq!(config.scene.rows, 12);
    assert_eq!(config.scene.cell_size, 64);
    assert!(!config.snap_to_grid);
    assert_eq!(config.shader_url.as_deref(), Some("/fog.json"));
    assert_eq!(config.background_color, "#000");
}

#[test]
fn viewport_defaults() {
    let config = ViewportConfig::from_json("{}").unwrap();
    assert!(config.snap_to_grid);
    assert_eq!(config.background_color, "#00AA00");
    assert!(config.shader_url.is_none());
}

#[test]
fn viewport_config_validates_scene() {
    assert!(ViewportConfig::from_json(r#"{"columns": 0}"#).is_err());
}

#[test]
fn shader_source_follows_url() {
    let config = ViewportConfig::from_json(r#"{"shader_url": "/fog.json"}"#).unwrap();
    assert_eq!(config.shader_source(), ShaderSource::Url("/fog.json".into()));

    let config = ViewportConfig::from_json("{}").unwrap();
    assert_eq!(config.shader_source(), ShaderSource::Builtin);
}

#[test]
fn blank_shader_url_means_builtin() {
    let config = ViewportConfig::from_json(r#"{"shader_url": "  "}"#).unwrap();
    assert_eq!(config.shader_source(), ShaderSource::Builtin);
}
