//! Shared numeric constants for the tabletop crate.

// ── Grid ────────────────────────────────────────────────────────

/// Largest grid accepted along either axis, in cells.
pub const MAX_GRID_CELLS: u32 = 512;

/// Largest scene extent accepted along either axis, in scene pixels.
pub const MAX_SCENE_EXTENT_PX: u32 = 32_768;

/// Grid line width in screen pixels; divided by the scene scale when drawn.
pub const GRID_LINE_WIDTH_PX: f64 = 1.0;

/// Default grid line colour.
pub const DEFAULT_GRID_COLOR: &str = "#FFFFFF";

/// Fill colour of the scene rectangle under the tokens.
pub const SCENE_FILL_COLOR: &str = "#000000";

/// Default colour of the surface around the scene.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#00AA00";

// ── Drag ────────────────────────────────────────────────────────

/// Opacity applied to a token while it is being dragged.
pub const DEFAULT_DRAG_ALPHA: f64 = 0.5;

// ── Fog of war ──────────────────────────────────────────────────

/// Visibility radius of every observer, in grid cells.
pub const VISIBILITY_RADIUS_CELLS: f64 = 4.0;

/// Uniform array capacity of the visibility pass.
pub const MAX_OBSERVERS: usize = 32;

/// Render target resolution: texels along one grid cell edge.
pub const DEFAULT_FOG_TEXELS_PER_CELL: u32 = 8;

/// Upper bound of the configurable fog resolution, in texels per cell.
pub const MAX_FOG_TEXELS_PER_CELL: u32 = 64;

/// Longest edge of a fog render target, in texels. Finer resolutions are
/// reduced to fit.
pub const MAX_FOG_TEXTURE_SIDE: u32 = 2048;

/// Coverage written into the barrier texture for a barrier token.
pub const BARRIER_COVERAGE: u8 = u8::MAX;
