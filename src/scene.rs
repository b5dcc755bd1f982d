//! The token-layer authority and fog-of-war compositor.
//!
//! A [`Scene`] owns the grid, three per-layer token containers, the drag
//! area wired with the default behavior chain, and the fog render targets.
//! Token operations apply to the active layer only; layers are isolated
//! namespaces. The scene container is positioned and scaled inside the
//! viewport by a [`Transform`], and every pointer position entering the
//! scene is in viewport space.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use crate::config::{ConfigError, SceneConfig};
use crate::drag::{DragArea, default_drag_logic};
use crate::fog::{FogError, FogOfWar, ShaderLoader, ShaderParams};
use crate::grid::{GeometryError, GridCollider};
use crate::grid_view::GridView;
use crate::logger::{SharedLogger, with_context};
use crate::token::{ImageSource, Layer, LayerSet, Token, TokenKey, TokenLayer};
use crate::transform::{Point, Transform};

/// Actions returned from pointer handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A token on `layer` started dragging.
    DragStarted { layer: Layer, name: String },
    /// A drag finished; `position` is the token's final scene-local origin.
    TokenMoved { layer: Layer, name: String, position: Point },
    /// The scene changed and should be redrawn.
    RenderNeeded,
}

pub struct Scene {
    grid: GridCollider,
    grid_view: GridView,
    layers: LayerSet<TokenLayer>,
    active: Layer,
    drag_area: DragArea,
    fog: FogOfWar,
    transform: Transform,
    mask_enabled: bool,
    logger: SharedLogger,
}

impl Scene {
    /// Build a scene of `rows × columns` cells with default look and feel.
    ///
    /// The fog pipeline starts in the loading state; call
    /// [`Scene::install_shader`] once parameters are available.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NonPositive`] if any dimension is zero.
    pub fn new(rows: u32, columns: u32, cell_size: u32, logger: &SharedLogger) -> Result<Self, GeometryError> {
        let config = SceneConfig { rows, columns, cell_size, ..SceneConfig::default() };
        let grid = config.grid()?;
        Ok(Self::build(grid, &config, logger))
    }

    /// Build a scene from a validated config.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the config is out of range.
    pub fn from_config(config: &SceneConfig, logger: &SharedLogger) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = config.grid()?;
        Ok(Self::build(grid, config, logger))
    }

    /// Build a scene and wait for its fog shader.
    ///
    /// A failed shader load does not fail construction: the scene is
    /// returned with fog disabled.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the config is out of range.
    pub async fn create(
        config: &SceneConfig,
        loader: &impl ShaderLoader,
        logger: &SharedLogger,
    ) -> Result<Self, ConfigError> {
        let mut scene = Self::from_config(config, logger)?;
        let result = loader.load().await;
        scene.install_shader(result);
        Ok(scene)
    }

    fn build(grid: GridCollider, config: &SceneConfig, root: &SharedLogger) -> Self {
        let logger = with_context(root, "Scene");
        let active = Layer::default();
        logger.info(&format!(
            "scene {}x{} cells of {} px, active layer {active}",
            grid.rows(),
            grid.columns(),
            grid.cell_size()
        ));
        Self {
            grid,
            grid_view: GridView::new(grid, config.grid_color.clone()),
            layers: LayerSet::default(),
            active,
            drag_area: DragArea::new(default_drag_logic(grid, config.drag_alpha, root), root),
            fog: FogOfWar::new(&grid, config.fog_texels_per_cell, root),
            transform: Transform::default(),
            mask_enabled: active == Layer::Player,
            logger,
        }
    }

    /// Apply the outcome of a shader load. Returns whether fog is ready.
    pub fn install_shader(&mut self, result: Result<ShaderParams, FogError>) -> bool {
        self.fog.install(result)
    }

    // --- Tokens ---

    /// Place a token on the active layer.
    ///
    /// `at` is in viewport space; it is mapped into the scene, clamped to
    /// the scene bounds and, when `snap` is set, snapped to the grid along
    /// with any dimension larger than one cell. Returns false without
    /// changing anything if the name is taken on the active layer.
    pub fn add_token(&mut self, name: &str, source: ImageSource, at: Point, snap: bool) -> bool {
        let layer = self.layers.get_mut(self.active);
        if layer.contains(name) {
            self.logger.warn(&format!("token '{name}' already exists on {}", self.active));
            return false;
        }

        let mut position = self.grid.clamp_point(self.transform.to_local(at));
        let mut size = source.natural_size();
        if snap {
            position = self.grid.snap_point(position);
            if size.width > self.grid.cell_size() {
                size.width = self.grid.snap_to_grid(size.width);
            }
            if size.height > self.grid.cell_size() {
                size.height = self.grid.snap_to_grid(size.height);
            }
        }

        let mut token = Token::new(name, source, position);
        token.size = size;
        let Some(key) = layer.insert(token) else {
            return false;
        };
        if let Some(token) = layer.get_mut(key) {
            if let Err(e) = self.drag_area.attach(key, token) {
                self.logger.error(&format!("add_token: {e}"));
            }
        }

        self.logger.info(&format!(
            "new token <name={name}, x={}, y={}, w={}, h={}> on {}",
            position.x, position.y, size.width, size.height, self.active
        ));
        true
    }

    /// Remove a token from the active layer. A drag in progress on it is
    /// completed first. Returns false if absent.
    pub fn remove_token(&mut self, name: &str) -> bool {
        let layer = self.layers.get_mut(self.active);
        let Some(key) = layer.key_of(name) else {
            self.logger.debug(&format!("remove_token: no token '{name}' on {}", self.active));
            return false;
        };
        if let Some(token) = layer.get_mut(key) {
            self.drag_area.detach(key, token, self.transform);
        }
        layer.remove(name);
        self.logger.info(&format!("token '{name}' removed from {}", self.active));
        true
    }

    /// Whether the active layer has a token named `name`.
    #[must_use]
    pub fn has_token(&self, name: &str) -> bool {
        self.layers.get(self.active).contains(name)
    }

    /// Look up a token on the active layer.
    #[must_use]
    pub fn token(&self, name: &str) -> Option<&Token> {
        self.layers.get(self.active).by_name(name)
    }

    // --- Layers ---

    /// Switch the active layer.
    ///
    /// A drag in flight is completed, the old layer's tokens stop being
    /// interactive and the new layer's become interactive. The fog mask is
    /// applied only while PLAYER is active.
    pub fn change_layer(&mut self, layer: Layer) -> Vec<Action> {
        if layer == self.active {
            self.logger.debug(&format!("change_layer: {layer} already active"));
            return Vec::new();
        }

        let previous = self.active;
        let mut actions = Vec::new();
        let old = self.layers.get_mut(previous);
        if let Some(key) = self.drag_area.release(old, self.transform) {
            if let Some(token) = old.get(key) {
                actions.push(Action::TokenMoved { layer: previous, name: token.name.clone(), position: token.position });
            }
        }
        self.drag_area.detach_all(old, self.transform);

        self.active = layer;
        self.drag_area.attach_all(self.layers.get_mut(layer));
        self.mask_enabled = layer == Layer::Player;
        self.logger.info(&format!("layer changed: {previous} -> {layer}, fog mask {}", self.mask_state()));

        actions.push(Action::RenderNeeded);
        actions
    }

    fn mask_state(&self) -> &'static str {
        if self.mask_enabled { "on" } else { "off" }
    }

    // --- Layout ---

    /// Scale uniformly so the whole scene fits in `width × height`.
    pub fn scale_to(&mut self, width: f64, height: f64) {
        let scale = (width / self.grid.width()).min(height / self.grid.height());
        if !(scale.is_finite() && scale > 0.0) {
            self.logger.warn(&format!("scale_to: ignoring degenerate box {width}x{height}"));
            return;
        }
        self.transform.scale = scale;
        self.grid_view.redraw(scale);
    }

    /// Move the scene so its scaled bounding box is centered on `(x, y)`.
    pub fn center_to(&mut self, x: f64, y: f64) {
        self.transform.x = x - self.grid.width() * self.transform.scale / 2.0;
        self.transform.y = y - self.grid.height() * self.transform.scale / 2.0;
    }

    // --- Fog ---

    /// Recompute the fog textures from the current barrier and player
    /// tokens. Returns false when the mask is not applied (active layer is
    /// not PLAYER) or the fog pipeline is not ready.
    pub fn render(&mut self) -> bool {
        if !self.mask_enabled {
            return false;
        }
        self.fog.render(&self.layers.barrier, &self.layers.player)
    }

    // --- Pointer events ---

    /// Pointer pressed at viewport position `global`.
    pub fn pointer_down(&mut self, global: Point) -> Vec<Action> {
        let layer = self.layers.get_mut(self.active);
        let Some(key) = self.drag_area.pointer_down(global, layer, self.transform) else {
            return Vec::new();
        };
        match layer.get(key) {
            Some(token) => vec![
                Action::DragStarted { layer: self.active, name: token.name.clone() },
                Action::RenderNeeded,
            ],
            None => Vec::new(),
        }
    }

    /// Pointer moved anywhere over the scene.
    pub fn pointer_move(&mut self, global: Point) -> Vec<Action> {
        let layer = self.layers.get_mut(self.active);
        match self.drag_area.pointer_move(global, layer, self.transform) {
            Some(_) => vec![Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    /// Pointer released over the scene.
    pub fn pointer_up(&mut self, global: Point) -> Vec<Action> {
        let layer = self.layers.get_mut(self.active);
        let dropped = self.drag_area.pointer_up(global, layer, self.transform);
        self.drop_actions(dropped)
    }

    /// Pointer released outside the scene; completes the drag like
    /// [`Scene::pointer_up`].
    pub fn pointer_up_outside(&mut self, global: Point) -> Vec<Action> {
        self.pointer_up(global)
    }

    fn drop_actions(&self, dropped: Option<TokenKey>) -> Vec<Action> {
        let Some(token) = dropped.and_then(|key| self.layers.get(self.active).get(key)) else {
            return Vec::new();
        };
        vec![
            Action::TokenMoved { layer: self.active, name: token.name.clone(), position: token.position },
            Action::RenderNeeded,
        ]
    }

    // --- Queries ---

    #[must_use]
    pub fn grid(&self) -> &GridCollider {
        &self.grid
    }

    #[must_use]
    pub fn grid_view(&self) -> &GridView {
        &self.grid_view
    }

    #[must_use]
    pub fn active_layer(&self) -> Layer {
        self.active
    }

    /// Tokens of `layer`, whether active or not.
    #[must_use]
    pub fn layer(&self, layer: Layer) -> &TokenLayer {
        self.layers.get(layer)
    }

    #[must_use]
    pub fn layers(&self) -> &LayerSet<TokenLayer> {
        &self.layers
    }

    /// Container transform inside the viewport.
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    /// Unscaled scene width in pixels.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.grid.width()
    }

    /// Unscaled scene height in pixels.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.grid.height()
    }

    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.grid.cell_size()
    }

    /// Whether the fog mask is applied to the token containers.
    #[must_use]
    pub fn mask_enabled(&self) -> bool {
        self.mask_enabled
    }

    #[must_use]
    pub fn fog(&self) -> &FogOfWar {
        &self.fog
    }

    #[must_use]
    pub fn drag_area(&self) -> &DragArea {
        &self.drag_area
    }

    /// Whether a token is being dragged.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag_area.state().is_dragging()
    }
}
