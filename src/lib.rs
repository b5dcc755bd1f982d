//! Grid-based virtual tabletop for the browser.
//!
//! This crate is compiled to WebAssembly and drawn onto a single canvas. It
//! owns the play surface: a square-cell grid, three token layers (background
//! art, barriers, players), drag-and-drop of tokens with grid snapping, and a
//! fog of war computed from the player tokens' sight lines. The host
//! application keeps the authoritative token records and feeds them in
//! through [`viewport::ViewportCore::update`]; drag results come back as
//! [`scene::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`viewport`] | Canvas binding, frame loop and record sync ([`viewport::ViewportCore`]) |
//! | [`scene`] | Layers, active-layer token operations, fog compositing |
//! | [`drag`] | Drag area and the pluggable drag behavior chain |
//! | [`fog`] | Visibility shader, render textures and shader loading |
//! | [`grid`] | Grid geometry: snapping and cell coordinates |
//! | [`grid_view`] | Grid line layout for drawing |
//! | [`token`] | Token and per-layer container types |
//! | [`transform`] | Scene placement inside the viewport |
//! | [`hit`] | Hit-testing tokens under the pointer |
//! | [`input`] | Pointer button decoding |
//! | [`render`] | Canvas 2D drawing |
//! | [`naming`] | Image and token display names |
//! | [`config`] | JSON configuration |
//! | [`logger`] | Diagnostic sinks |
//! | [`consts`] | Shared constants (default sizes, colours, limits) |

pub mod config;
pub mod consts;
pub mod drag;
pub mod fog;
pub mod grid;
pub mod grid_view;
pub mod hit;
pub mod input;
pub mod logger;
pub mod naming;
pub mod render;
pub mod scene;
pub mod token;
pub mod transform;
pub mod viewport;
