//! Rendering: draws the viewport to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It reads scene state and produces pixels; it never mutates the scene.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::viewport::Viewport::render`]) handles the result.

use std::collections::HashMap;

use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, ImageData};

use crate::consts::SCENE_FILL_COLOR;
use crate::fog::FogOfWar;
use crate::grid_view::GridView;
use crate::token::{LayerSet, TokenLayer};
use crate::viewport::ViewportCore;

/// Decoded token images keyed by URL.
///
/// Images load asynchronously; a token whose image is not decoded yet is
/// skipped for that frame.
#[derive(Default)]
pub struct ImageCache {
    images: HashMap<String, HtmlImageElement>,
}

impl ImageCache {
    /// Start loading every image referenced by `layers` that is not cached.
    ///
    /// # Errors
    ///
    /// Returns `Err` if an image element cannot be created.
    pub fn sync(&mut self, layers: &LayerSet<TokenLayer>) -> Result<(), JsValue> {
        for (_, layer) in layers.iter() {
            for (_, token) in layer.iter() {
                if self.images.contains_key(&token.source.url) {
                    continue;
                }
                let image = HtmlImageElement::new()?;
                image.set_src(&token.source.url);
                self.images.insert(token.source.url.clone(), image);
            }
        }
        Ok(())
    }

    /// The image for `url` if it has finished decoding.
    #[must_use]
    pub fn ready(&self, url: &str) -> Option<&HtmlImageElement> {
        self.images.get(url).filter(|image| image.complete() && image.natural_width() > 0)
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }
}

/// Draw the full viewport: background, scene, tokens, grid, fog.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    core: &ViewportCore,
    images: &ImageCache,
    fog_canvas: &HtmlCanvasElement,
) -> Result<(), JsValue> {
    let scene = &core.scene;
    let t = scene.transform();

    // Layer 1: clear to the background colour and enter scene space.
    ctx.set_transform(core.dpr, 0.0, 0.0, core.dpr, 0.0, 0.0)?;
    ctx.set_global_alpha(1.0);
    ctx.set_fill_style_str(&core.background_color);
    ctx.fill_rect(0.0, 0.0, core.width, core.height);
    ctx.translate(t.x, t.y)?;
    ctx.scale(t.scale, t.scale)?;

    ctx.set_fill_style_str(SCENE_FILL_COLOR);
    ctx.fill_rect(0.0, 0.0, scene.width(), scene.height());

    // Layer 2: tokens, bottom layer first.
    for (_, layer) in scene.layers().iter() {
        draw_tokens(ctx, layer, images)?;
    }

    // Layer 3: grid.
    draw_grid(ctx, scene.grid_view());

    // Layer 4: fog over the player layer.
    if scene.mask_enabled() && scene.fog().is_ready() {
        ctx.set_image_smoothing_enabled(true);
        ctx.draw_image_with_html_canvas_element_and_dw_and_dh(fog_canvas, 0.0, 0.0, scene.width(), scene.height())?;
    }

    Ok(())
}

fn draw_tokens(ctx: &CanvasRenderingContext2d, layer: &TokenLayer, images: &ImageCache) -> Result<(), JsValue> {
    for (_, token) in layer.iter() {
        let Some(image) = images.ready(&token.source.url) else {
            continue;
        };
        ctx.set_global_alpha(token.alpha);
        ctx.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            token.position.x,
            token.position.y,
            token.size.width,
            token.size.height,
        )?;
    }
    ctx.set_global_alpha(1.0);
    Ok(())
}

fn draw_grid(ctx: &CanvasRenderingContext2d, view: &GridView) {
    ctx.set_stroke_style_str(view.color());
    ctx.set_line_width(view.line_width());
    ctx.begin_path();
    for line in view.lines() {
        ctx.move_to(line.from.x, line.from.y);
        ctx.line_to(line.to.x, line.to.y);
    }
    ctx.stroke();
}

/// Copy the fog mask into the offscreen fog canvas as RGBA pixels.
///
/// # Errors
///
/// Returns `Err` if the canvas has no 2D context or the pixel upload fails.
pub fn upload_fog(fog_canvas: &HtmlCanvasElement, fog: &FogOfWar) -> Result<(), JsValue> {
    let mask = fog.mask();
    let pixels = fog.rgba();
    let image = ImageData::new_with_u8_clamped_array_and_sh(Clamped(pixels.as_slice()), mask.width(), mask.height())?;
    context_2d(fog_canvas)?.put_image_data(&image, 0.0, 0.0)
}

/// The canvas's 2D context.
///
/// # Errors
///
/// Returns `Err` if the context is unavailable.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}
