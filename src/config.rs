//! Scene and viewport configuration parsed from JSON.

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_BACKGROUND_COLOR, DEFAULT_DRAG_ALPHA, DEFAULT_FOG_TEXELS_PER_CELL, DEFAULT_GRID_COLOR, MAX_FOG_TEXELS_PER_CELL,
};
use crate::fog::ShaderSource;
use crate::grid::{GeometryError, GridCollider};

pub const DEFAULT_ROWS: u32 = 24;
pub const DEFAULT_COLUMNS: u32 = 20;
pub const DEFAULT_CELL_SIZE: u32 = 64;

/// Failure to build a usable configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("drag_alpha {0} not in [0, 1]")]
    InvalidDragAlpha(f64),
    #[error("fog_texels_per_cell {0} out of range")]
    InvalidFogResolution(u32),
}

/// Board geometry and scene-level look and feel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub rows: u32,
    pub columns: u32,
    pub cell_size: u32,
    /// Opacity applied to a token while it is dragged.
    pub drag_alpha: f64,
    /// Fog texture resolution.
    pub fog_texels_per_cell: u32,
    pub grid_color: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            cell_size: DEFAULT_CELL_SIZE,
            drag_alpha: DEFAULT_DRAG_ALPHA,
            fog_texels_per_cell: DEFAULT_FOG_TEXELS_PER_CELL,
            grid_color: DEFAULT_GRID_COLOR.to_string(),
        }
    }
}

impl SceneConfig {
    /// Parse and validate a scene config. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for malformed JSON or out-of-range values.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid()?;
        if !(0.0..=1.0).contains(&self.drag_alpha) {
            return Err(ConfigError::InvalidDragAlpha(self.drag_alpha));
        }
        if !(1..=MAX_FOG_TEXELS_PER_CELL).contains(&self.fog_texels_per_cell) {
            return Err(ConfigError::InvalidFogResolution(self.fog_texels_per_cell));
        }
        Ok(())
    }

    /// The grid described by this config.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if a dimension is zero or too large.
    pub fn grid(&self) -> Result<GridCollider, GeometryError> {
        GridCollider::new(self.rows, self.columns, self.cell_size)
    }
}

/// Host-level settings: the scene plus how the viewport drives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    #[serde(flatten)]
    pub scene: SceneConfig,
    /// Snap tokens added from application records.
    pub snap_to_grid: bool,
    /// Fill outside the scene bounds.
    pub background_color: String,
    /// Where to fetch the fog shader descriptor; built-in parameters when absent.
    pub shader_url: Option<String>,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            scene: SceneConfig::default(),
            snap_to_grid: true,
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            shader_url: None,
        }
    }
}

impl ViewportConfig {
    /// Parse and validate a viewport config.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for malformed JSON or an invalid scene.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.scene.validate()?;
        Ok(config)
    }

    /// Where the fog shader parameters come from.
    #[must_use]
    pub fn shader_source(&self) -> ShaderSource {
        ShaderSource::from_url(self.shader_url.as_deref())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
