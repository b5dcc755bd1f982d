//! Fog of war: render targets, observer uniforms, and the visibility pass.
//!
//! Each frame the barrier layer is rasterized into a coverage texture, the
//! player layer's token centers become observers, and the
//! [`VisibilityShader`] writes a fog density per texel into the mask
//! texture. A texel is clear when some observer within the visibility
//! radius has an unobstructed line to it; barrier texels strictly between
//! the observer and the target occlude, so walls themselves stay visible.
//!
//! The shader parameters arrive asynchronously through a [`ShaderLoader`].
//! Until they do the pipeline is [`FogPipeline::Loading`]; a failed load
//! moves it to [`FogPipeline::Disabled`] for the rest of the scene's life.

#[cfg(test)]
#[path = "fog_test.rs"]
mod fog_test;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::consts::{BARRIER_COVERAGE, MAX_FOG_TEXTURE_SIDE, MAX_OBSERVERS, VISIBILITY_RADIUS_CELLS};
use crate::grid::GridCollider;
use crate::logger::{SharedLogger, with_context};
use crate::token::TokenLayer;
use crate::transform::Point;

/// Failure to obtain usable shader parameters.
#[derive(Debug, thiserror::Error)]
pub enum FogError {
    /// The shader resource could not be fetched.
    #[error("shader load failed: {0}")]
    Load(String),
    /// The shader descriptor is not valid JSON for [`ShaderParams`].
    #[error("shader descriptor parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    /// The descriptor parsed but a parameter is out of range.
    #[error("invalid shader parameter: {0}")]
    InvalidShader(String),
}

// =============================================================
// Render targets
// =============================================================

/// Single-channel texture covering the full scene extent.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTexture {
    width: u32,
    height: u32,
    texel_size: f64,
    data: Vec<u8>,
}

impl RenderTexture {
    /// A zeroed texture of `width × height` texels, each `texel_size`
    /// scene pixels square.
    #[must_use]
    pub fn new(width: u32, height: u32, texel_size: f64) -> Self {
        let len = width as usize * height as usize;
        Self { width, height, texel_size, data: vec![0; len] }
    }

    /// A texture matching `grid`'s extent at `texels_per_cell` resolution,
    /// reduced as [`RenderTexture::resolution_for`] requires.
    #[must_use]
    pub fn for_grid(grid: &GridCollider, texels_per_cell: u32) -> Self {
        let per_cell = Self::resolution_for(grid, texels_per_cell);
        Self::new(
            grid.rows().saturating_mul(per_cell),
            grid.columns().saturating_mul(per_cell),
            grid.cell_size() / f64::from(per_cell),
        )
    }

    /// Texels per cell actually used for `grid`: at least 1, and small
    /// enough that neither edge exceeds [`MAX_FOG_TEXTURE_SIDE`].
    #[must_use]
    pub fn resolution_for(grid: &GridCollider, texels_per_cell: u32) -> u32 {
        let cap = (MAX_FOG_TEXTURE_SIDE / grid.rows().max(grid.columns())).max(1);
        texels_per_cell.max(1).min(cap)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Edge length of one texel in scene pixels.
    #[must_use]
    pub fn texel_size(&self) -> f64 {
        self.texel_size
    }

    /// Row-major texel values.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Value at texel `(x, y)`; 0 outside the texture.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.index(x, y).and_then(|i| self.data.get(i).copied()).unwrap_or(0)
    }

    pub fn set(&mut self, x: u32, y: u32, value: u8) {
        if let Some(slot) = self.index(x, y).and_then(|i| self.data.get_mut(i)) {
            *slot = value;
        }
    }

    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// Scene-local center of texel `(x, y)`.
    #[must_use]
    pub fn texel_center(&self, x: u32, y: u32) -> Point {
        Point::new(
            (f64::from(x) + 0.5) * self.texel_size,
            (f64::from(y) + 0.5) * self.texel_size,
        )
    }

    /// Texel containing scene-local point `p`, if inside the texture.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn texel_at(&self, p: Point) -> Option<(u32, u32)> {
        let fx = (p.x / self.texel_size).floor();
        let fy = (p.y / self.texel_size).floor();
        if fx < 0.0 || fy < 0.0 || fx >= f64::from(self.width) || fy >= f64::from(self.height) {
            return None;
        }
        Some((fx as u32, fy as u32))
    }

    /// Value of the texel containing `p`; 0 outside the texture.
    #[must_use]
    pub fn sample(&self, p: Point) -> u8 {
        self.texel_at(p).map_or(0, |(x, y)| self.get(x, y))
    }

    /// Write `value` into every texel whose center lies inside the rect at
    /// `origin` with the given extent (far edges exclusive).
    pub fn fill_rect(&mut self, origin: Point, width: f64, height: f64, value: u8) {
        let (x0, x1) = self.texel_span(origin.x, width, self.width);
        let (y0, y1) = self.texel_span(origin.y, height, self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.set(x, y, value);
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn texel_span(&self, start: f64, extent: f64, limit: u32) -> (u32, u32) {
        let clamp = |v: f64| v.clamp(0.0, f64::from(limit)) as u32;
        let first = (start / self.texel_size - 0.5).ceil();
        let end = ((start + extent) / self.texel_size - 0.5).ceil();
        (clamp(first), clamp(end))
    }
}

// =============================================================
// Shader
// =============================================================

/// Tunables of the visibility pass, loaded from a JSON descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderParams {
    /// Fraction of the radius, measured inward from the edge, over which
    /// visibility fades out. 0 gives a hard edge.
    pub softness: f64,
    /// Occlusion sampling step along each sight line, in texels.
    pub ray_step: f64,
    /// Barrier coverage in `(0, 1]` at or above which a texel blocks sight.
    pub barrier_threshold: f64,
    /// Opacity of fully fogged texels.
    pub fog_alpha: f64,
    /// RGB colour of the fog overlay.
    pub fog_color: [u8; 3],
}

impl Default for ShaderParams {
    fn default() -> Self {
        Self { softness: 0.0, ray_step: 0.5, barrier_threshold: 0.5, fog_alpha: 1.0, fog_color: [0, 0, 0] }
    }
}

impl ShaderParams {
    /// Parse and validate a shader descriptor.
    ///
    /// # Errors
    ///
    /// [`FogError::Parse`] for malformed JSON, [`FogError::InvalidShader`]
    /// for out-of-range parameters.
    pub fn from_json(source: &str) -> Result<Self, FogError> {
        let params: Self = serde_json::from_str(source)?;
        params.validate()?;
        Ok(params)
    }

    /// Check every parameter range.
    ///
    /// # Errors
    ///
    /// Returns [`FogError::InvalidShader`] naming the first bad parameter.
    pub fn validate(&self) -> Result<(), FogError> {
        if !(0.0..=1.0).contains(&self.softness) {
            return Err(FogError::InvalidShader(format!("softness {} not in [0, 1]", self.softness)));
        }
        if !(self.ray_step > 0.0 && self.ray_step.is_finite()) {
            return Err(FogError::InvalidShader(format!("ray_step {} must be positive", self.ray_step)));
        }
        if !(self.barrier_threshold > 0.0 && self.barrier_threshold <= 1.0) {
            return Err(FogError::InvalidShader(format!(
                "barrier_threshold {} not in (0, 1]",
                self.barrier_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.fog_alpha) {
            return Err(FogError::InvalidShader(format!("fog_alpha {} not in [0, 1]", self.fog_alpha)));
        }
        Ok(())
    }
}

/// Observer uniforms for one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObserverUniforms {
    /// Observer centers in scene-local pixels.
    pub positions: Vec<Point>,
    /// Visibility radius shared by every observer.
    pub radius: f64,
}

impl ObserverUniforms {
    /// Collect the centers of `players`, keeping at most
    /// [`MAX_OBSERVERS`] in draw order.
    #[must_use]
    pub fn gather(players: &TokenLayer, radius: f64, logger: &SharedLogger) -> Self {
        let mut positions: Vec<Point> = players.iter().map(|(_, token)| token.center()).collect();
        if positions.len() > MAX_OBSERVERS {
            logger.warn(&format!(
                "{} observers exceed the limit of {MAX_OBSERVERS}; extra observers ignored",
                positions.len()
            ));
            positions.truncate(MAX_OBSERVERS);
        }
        Self { positions, radius }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.positions.len()
    }
}

/// CPU visibility pass.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityShader {
    params: ShaderParams,
}

impl VisibilityShader {
    #[must_use]
    pub fn new(params: ShaderParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &ShaderParams {
        &self.params
    }

    /// Visibility of `point` in `[0, 1]`: the best unobstructed observer
    /// contribution. No observers means nothing is visible.
    #[must_use]
    pub fn visibility(&self, barrier: &RenderTexture, observers: &ObserverUniforms, point: Point) -> f64 {
        observers
            .positions
            .iter()
            .filter_map(|observer| {
                let d = observer.distance(point);
                if d > observers.radius || self.occluded(barrier, *observer, point) {
                    return None;
                }
                Some(self.falloff(d, observers.radius))
            })
            .fold(0.0, f64::max)
    }

    fn falloff(&self, distance: f64, radius: f64) -> f64 {
        let band = radius * self.params.softness;
        if band <= 0.0 || distance <= radius - band {
            return 1.0;
        }
        ((radius - distance) / band).clamp(0.0, 1.0)
    }

    /// Whether a barrier texel strictly between `from` and `to` blocks the
    /// sight line. The texels containing either end never block.
    fn occluded(&self, barrier: &RenderTexture, from: Point, to: Point) -> bool {
        let distance = from.distance(to);
        let step = self.params.ray_step * barrier.texel_size();
        if distance <= step {
            return false;
        }
        let start = barrier.texel_at(from);
        let end = barrier.texel_at(to);
        let dx = (to.x - from.x) / distance;
        let dy = (to.y - from.y) / distance;

        let mut t = step;
        while t < distance {
            let p = Point::new(from.x + dx * t, from.y + dy * t);
            t += step;
            let Some(texel) = barrier.texel_at(p) else {
                continue;
            };
            if Some(texel) == end {
                break;
            }
            if Some(texel) == start {
                continue;
            }
            if f64::from(barrier.get(texel.0, texel.1)) / 255.0 >= self.params.barrier_threshold {
                return true;
            }
        }
        false
    }

    /// Write fog density (`255` = fully fogged at `fog_alpha` 1) for every
    /// texel of `out`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render(&self, barrier: &RenderTexture, observers: &ObserverUniforms, out: &mut RenderTexture) {
        let opaque = self.params.fog_alpha * 255.0;
        if observers.count() == 0 {
            out.fill(opaque.round() as u8);
            return;
        }
        for y in 0..out.height() {
            for x in 0..out.width() {
                let visible = self.visibility(barrier, observers, out.texel_center(x, y));
                out.set(x, y, (opaque * (1.0 - visible)).round().clamp(0.0, 255.0) as u8);
            }
        }
    }
}

// =============================================================
// Shader loading
// =============================================================

/// Asynchronous source of [`ShaderParams`].
pub trait ShaderLoader {
    fn load(&self) -> impl Future<Output = Result<ShaderParams, FogError>>;
}

/// Resolves immediately to [`ShaderParams::default`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinShader;

impl ShaderLoader for BuiltinShader {
    fn load(&self) -> impl Future<Output = Result<ShaderParams, FogError>> {
        std::future::ready(Ok(ShaderParams::default()))
    }
}

/// Parses an inline JSON descriptor.
#[derive(Debug, Clone)]
pub struct JsonShader {
    source: String,
}

impl JsonShader {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }
}

impl ShaderLoader for JsonShader {
    fn load(&self) -> impl Future<Output = Result<ShaderParams, FogError>> {
        std::future::ready(ShaderParams::from_json(&self.source))
    }
}

/// Fetches a JSON descriptor over HTTP.
#[cfg(feature = "browser")]
#[derive(Debug, Clone)]
pub struct FetchShader {
    url: String,
}

#[cfg(feature = "browser")]
impl FetchShader {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[cfg(feature = "browser")]
impl ShaderLoader for FetchShader {
    async fn load(&self) -> Result<ShaderParams, FogError> {
        let response = gloo_net::http::Request::get(&self.url)
            .send()
            .await
            .map_err(|e| FogError::Load(e.to_string()))?;
        if !(200..300).contains(&response.status()) {
            return Err(FogError::Load(format!("{} returned status {}", self.url, response.status())));
        }
        let body = response.text().await.map_err(|e| FogError::Load(e.to_string()))?;
        ShaderParams::from_json(&body)
    }
}

/// Shader origin chosen by configuration: a descriptor URL, or the
/// built-in parameters when none is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderSource {
    Builtin,
    Url(String),
}

impl ShaderSource {
    /// `Url` for a non-blank `url`, `Builtin` otherwise.
    #[must_use]
    pub fn from_url(url: Option<&str>) -> Self {
        match url.map(str::trim) {
            Some(url) if !url.is_empty() => Self::Url(url.to_string()),
            _ => Self::Builtin,
        }
    }
}

impl ShaderLoader for ShaderSource {
    async fn load(&self) -> Result<ShaderParams, FogError> {
        match self {
            Self::Builtin => BuiltinShader.load().await,
            #[cfg(feature = "browser")]
            Self::Url(url) => FetchShader::new(url.as_str()).load().await,
            #[cfg(not(feature = "browser"))]
            Self::Url(url) => Err(FogError::Load(format!("cannot fetch {url} without the browser feature"))),
        }
    }
}

// =============================================================
// Pipeline
// =============================================================

/// Lifecycle of the fog effect.
#[derive(Debug, Clone, PartialEq)]
pub enum FogPipeline {
    /// Shader parameters have not arrived yet.
    Loading,
    /// The visibility pass can run.
    Ready(VisibilityShader),
    /// Loading failed; the scene runs without fog.
    Disabled,
}

/// Barrier and fog render targets plus the pipeline that fills them.
pub struct FogOfWar {
    barrier: RenderTexture,
    mask: RenderTexture,
    observers: ObserverUniforms,
    pipeline: FogPipeline,
    logger: SharedLogger,
}

impl FogOfWar {
    /// Allocate both targets for `grid`. The mask starts fully fogged.
    #[must_use]
    pub fn new(grid: &GridCollider, texels_per_cell: u32, logger: &SharedLogger) -> Self {
        let logger = with_context(logger, "FogOfWar");
        let per_cell = RenderTexture::resolution_for(grid, texels_per_cell);
        if per_cell < texels_per_cell {
            logger.warn(&format!("fog resolution reduced from {texels_per_cell} to {per_cell} texels per cell"));
        }
        let barrier = RenderTexture::for_grid(grid, per_cell);
        let mut mask = barrier.clone();
        mask.fill(u8::MAX);
        Self {
            barrier,
            mask,
            observers: ObserverUniforms { positions: Vec::new(), radius: VISIBILITY_RADIUS_CELLS * grid.cell_size() },
            pipeline: FogPipeline::Loading,
            logger,
        }
    }

    /// Apply the outcome of a shader load. Returns whether fog is now ready.
    pub fn install(&mut self, result: Result<ShaderParams, FogError>) -> bool {
        match result {
            Ok(params) => {
                self.logger.info(&format!("visibility shader installed: {params:?}"));
                self.pipeline = FogPipeline::Ready(VisibilityShader::new(params));
                true
            }
            Err(e) => {
                self.logger.warn(&format!("fog disabled: {e}"));
                self.pipeline = FogPipeline::Disabled;
                false
            }
        }
    }

    #[must_use]
    pub fn pipeline(&self) -> &FogPipeline {
        &self.pipeline
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.pipeline, FogPipeline::Ready(_))
    }

    /// Barrier coverage from the last pass.
    #[must_use]
    pub fn barrier(&self) -> &RenderTexture {
        &self.barrier
    }

    /// Fog density from the last pass.
    #[must_use]
    pub fn mask(&self) -> &RenderTexture {
        &self.mask
    }

    /// Observer uniforms used by the last pass.
    #[must_use]
    pub fn observers(&self) -> &ObserverUniforms {
        &self.observers
    }

    /// Visibility radius in scene pixels.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.observers.radius
    }

    /// Recompute both targets from the current barrier and player tokens.
    /// Returns false while the pipeline is not ready.
    pub fn render(&mut self, barriers: &TokenLayer, players: &TokenLayer) -> bool {
        let FogPipeline::Ready(shader) = &self.pipeline else {
            return false;
        };

        self.barrier.fill(0);
        for (_, token) in barriers.iter() {
            self.barrier.fill_rect(token.position, token.size.width, token.size.height, BARRIER_COVERAGE);
        }

        self.observers = ObserverUniforms::gather(players, self.observers.radius, &self.logger);
        shader.render(&self.barrier, &self.observers, &mut self.mask);
        true
    }

    /// The mask as RGBA pixels in the shader's fog colour, alpha taken
    /// from the fog density.
    #[must_use]
    pub fn rgba(&self) -> Vec<u8> {
        let [r, g, b] = match &self.pipeline {
            FogPipeline::Ready(shader) => shader.params().fog_color,
            FogPipeline::Loading | FogPipeline::Disabled => [0, 0, 0],
        };
        self.mask.data().iter().flat_map(|a| [r, g, b, *a]).collect()
    }
}
