//! Viewport: owns the rendering surface and bridges application records
//! into scene token operations.
//!
//! [`ViewportCore`] holds every piece of logic and is testable off the
//! browser. [`Viewport`] binds it to an `HtmlCanvasElement`: it installs
//! the window resize and pointer listeners, runs the animation-frame loop
//! that refreshes the fog each frame, and hands [`Action`]s to the host.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{EventTarget, HtmlCanvasElement, MouseEvent, Window};

use crate::config::ViewportConfig;
use crate::input::Button;
use crate::logger::{SharedLogger, with_context};
use crate::render::{self, ImageCache};
use crate::scene::{Action, Scene};
use crate::token::{ImageSource, Layer, LayerSet};
use crate::transform::Point;

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

/// Application-side identity of a token record.
pub type RecordId = Uuid;

/// One token as the surrounding application describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub id: RecordId,
    pub name: String,
    pub source: ImageSource,
    /// Drop position in viewport space.
    pub x: f64,
    pub y: f64,
}

/// What one [`ViewportCore::update`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Names added to the scene, in record order.
    pub added: Vec<String>,
    /// Names removed from the scene.
    pub removed: Vec<String>,
    /// Names whose addition the scene refused (name already taken).
    pub rejected: Vec<String>,
    /// Actions produced by a layer switch.
    pub actions: Vec<Action>,
}

impl SyncReport {
    /// Whether the scene changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty() || !self.actions.is_empty()
    }
}

/// Viewport state and logic that doesn't depend on the canvas element.
pub struct ViewportCore {
    pub scene: Scene,
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
    /// Snap tokens added from records to the grid.
    pub snap_to_grid: bool,
    pub background_color: String,
    applied: LayerSet<HashMap<RecordId, TokenRecord>>,
    last_render_ms: Option<f64>,
    logger: SharedLogger,
}

impl ViewportCore {
    /// Wrap `scene` and fit it into a `width × height` surface.
    #[must_use]
    pub fn new(scene: Scene, config: &ViewportConfig, width: f64, height: f64, logger: &SharedLogger) -> Self {
        let mut core = Self {
            scene,
            width: 0.0,
            height: 0.0,
            dpr: 1.0,
            snap_to_grid: config.snap_to_grid,
            background_color: config.background_color.clone(),
            applied: LayerSet::default(),
            last_render_ms: None,
            logger: with_context(logger, "Viewport"),
        };
        core.resize(width, height);
        core
    }

    // --- Surface ---

    /// Fit and center the scene in a surface of `width × height` CSS pixels.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.scene.scale_to(width, height);
        self.scene.center_to(width / 2.0, height / 2.0);
        self.logger.debug(&format!("resized to {width}x{height}, scale {}", self.scene.scale()));
    }

    pub fn set_dpr(&mut self, dpr: f64) {
        self.dpr = if dpr > 0.0 { dpr } else { 1.0 };
    }

    /// Duration of the last frame, if one was recorded.
    #[must_use]
    pub fn last_render_ms(&self) -> Option<f64> {
        self.last_render_ms
    }

    pub fn record_render_time(&mut self, elapsed_ms: f64) {
        self.last_render_ms = Some(elapsed_ms.max(0.0));
    }

    // --- Token bridge ---

    /// Add a token at viewport position `(x, y)` unless the active layer
    /// already has one with that name.
    pub fn add_token_if_missing(&mut self, name: &str, source: ImageSource, x: f64, y: f64) -> bool {
        if self.scene.has_token(name) {
            return false;
        }
        self.scene.add_token(name, source, Point::new(x, y), self.snap_to_grid)
    }

    /// Remove a token from the active layer if present.
    pub fn remove_token_if_exists(&mut self, name: &str) -> bool {
        self.scene.remove_token(name)
    }

    pub fn change_layer(&mut self, layer: Layer) -> Vec<Action> {
        self.scene.change_layer(layer)
    }

    /// Records last applied to `layer`.
    #[must_use]
    pub fn applied(&self, layer: Layer) -> &HashMap<RecordId, TokenRecord> {
        self.applied.get(layer)
    }

    /// Bring `layer` in line with the application's `records`.
    ///
    /// Switches to `layer` first if it is not active. Records that
    /// disappeared (or were renamed) since the last update are removed,
    /// then new records are added in the order given. Records already
    /// applied are left untouched.
    pub fn update(&mut self, layer: Layer, records: &[TokenRecord]) -> SyncReport {
        let mut report = SyncReport::default();
        if layer != self.scene.active_layer() {
            report.actions = self.scene.change_layer(layer);
        }

        let wanted: HashMap<RecordId, &TokenRecord> = records.iter().map(|r| (r.id, r)).collect();
        let applied = self.applied.get_mut(layer);
        let mut stale: Vec<TokenRecord> = applied
            .values()
            .filter(|old| wanted.get(&old.id).is_none_or(|new| new.name != old.name))
            .cloned()
            .collect();
        stale.sort_by(|a, b| a.name.cmp(&b.name));
        for old in stale {
            applied.remove(&old.id);
            if self.scene.remove_token(&old.name) {
                report.removed.push(old.name);
            }
        }

        for record in records {
            if self.applied.get(layer).contains_key(&record.id) {
                continue;
            }
            if self.add_token_if_missing(&record.name, record.source.clone(), record.x, record.y) {
                report.added.push(record.name.clone());
                self.applied.get_mut(layer).insert(record.id, record.clone());
            } else {
                report.rejected.push(record.name.clone());
            }
        }

        if report.changed() {
            self.logger.debug(&format!(
                "update {layer}: +{} -{} rejected {}",
                report.added.len(),
                report.removed.len(),
                report.rejected.len()
            ));
        }
        report
    }

    // --- Pointer events ---

    /// Pointer pressed at CSS position `screen_pt`. Only the primary button
    /// starts a drag.
    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Option<Button>) -> Vec<Action> {
        if button != Some(Button::Primary) {
            return Vec::new();
        }
        self.scene.pointer_down(screen_pt)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        self.scene.pointer_move(screen_pt)
    }

    /// Pointer released. `inside` tells whether the release happened over
    /// the surface.
    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Option<Button>, inside: bool) -> Vec<Action> {
        if button != Some(Button::Primary) {
            return Vec::new();
        }
        if inside { self.scene.pointer_up(screen_pt) } else { self.scene.pointer_up_outside(screen_pt) }
    }

    /// Per-frame fog refresh. Returns whether the fog textures changed.
    pub fn update_fog(&mut self) -> bool {
        self.scene.render()
    }
}

// =============================================================
// Frame loop
// =============================================================

/// Owner of a self-rescheduling animation-frame callback.
///
/// A frame for the callback may still be queued when the loop stops, so
/// [`FrameLoop::stop`] only clears the running flag. The callback releases
/// itself on its next invocation through [`FrameLoop::begin_frame`].
pub struct FrameLoop<C> {
    callback: RefCell<Option<C>>,
    running: Cell<bool>,
}

impl<C> Default for FrameLoop<C> {
    fn default() -> Self {
        Self { callback: RefCell::new(None), running: Cell::new(false) }
    }
}

impl<C> FrameLoop<C> {
    /// Store `callback` and mark the loop running.
    pub fn install(&self, callback: C) {
        *self.callback.borrow_mut() = Some(callback);
        self.running.set(true);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Whether the callback is still held.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.callback.borrow().is_some()
    }

    /// Stop scheduling frames. The callback stays alive for a queued frame.
    pub fn stop(&self) {
        self.running.set(false);
    }

    /// Call at the top of every frame. Returns false once the loop has
    /// stopped, after releasing the callback.
    pub fn begin_frame(&self) -> bool {
        if self.running.get() {
            return true;
        }
        self.callback.borrow_mut().take();
        false
    }

    /// Run `f` with the callback, if still held.
    pub fn with_callback<R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        self.callback.borrow().as_ref().map(f)
    }
}

// =============================================================
// Browser wrapper
// =============================================================

type PointerListener = Closure<dyn FnMut(MouseEvent)>;
type ActionHandler = Box<dyn FnMut(Action)>;
type FrameCallback = Closure<dyn FnMut(f64)>;

/// State shared between the viewport and its event closures.
struct Shared {
    canvas: HtmlCanvasElement,
    fog_canvas: HtmlCanvasElement,
    images: RefCell<ImageCache>,
    core: RefCell<ViewportCore>,
    handler: RefCell<Option<ActionHandler>>,
}

impl Shared {
    fn dispatch(&self, actions: Vec<Action>) {
        if actions.is_empty() {
            return;
        }
        if let Some(handler) = self.handler.borrow_mut().as_mut() {
            for action in actions {
                handler(action);
            }
        }
    }

    fn sync_size(&self, window: &Window) {
        let width = f64::from(self.canvas.client_width());
        let height = f64::from(self.canvas.client_height());
        let dpr = window.device_pixel_ratio();
        self.canvas.set_width(css_to_device(width, dpr));
        self.canvas.set_height(css_to_device(height, dpr));
        let mut core = self.core.borrow_mut();
        core.set_dpr(dpr);
        core.resize(width, height);
    }

    /// Pointer position relative to the canvas, and whether it is inside.
    fn locate(&self, event: &MouseEvent) -> (Point, bool) {
        let rect = self.canvas.get_bounding_client_rect();
        let p = Point::new(f64::from(event.client_x()) - rect.left(), f64::from(event.client_y()) - rect.top());
        let inside = p.x >= 0.0 && p.y >= 0.0 && p.x < rect.width() && p.y < rect.height();
        (p, inside)
    }

    fn render(&self) -> Result<(), JsValue> {
        let started_ms = Date::now();
        let ctx = render::context_2d(&self.canvas)?;
        let mut core = self.core.borrow_mut();
        let fog_changed = core.update_fog();
        let mut images = self.images.borrow_mut();
        images.sync(core.scene.layers())?;
        if fog_changed {
            render::upload_fog(&self.fog_canvas, core.scene.fog())?;
        }
        render::draw(&ctx, &core, &images, &self.fog_canvas)?;
        core.record_render_time(Date::now() - started_ms);
        Ok(())
    }
}

/// The full viewport. Wraps [`ViewportCore`] and owns the canvas element.
pub struct Viewport {
    shared: Rc<Shared>,
    window: Window,
    on_resize: Option<Closure<dyn FnMut()>>,
    listeners: Vec<(EventTarget, &'static str, PointerListener)>,
    frames: Rc<FrameLoop<FrameCallback>>,
    closed: bool,
    logger: SharedLogger,
}

impl Viewport {
    /// Bind `core` to `canvas`, install listeners and start the frame loop.
    ///
    /// # Errors
    ///
    /// Returns `Err` if there is no window, the offscreen fog canvas cannot
    /// be created or a listener cannot be registered.
    pub fn new(canvas: HtmlCanvasElement, core: ViewportCore, logger: &SharedLogger) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
        let fog_canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        let fog = core.scene.fog().mask();
        fog_canvas.set_width(fog.width());
        fog_canvas.set_height(fog.height());

        let shared = Rc::new(Shared {
            canvas,
            fog_canvas,
            images: RefCell::new(ImageCache::default()),
            core: RefCell::new(core),
            handler: RefCell::new(None),
        });
        shared.sync_size(&window);

        let mut viewport = Self {
            shared,
            window,
            on_resize: None,
            listeners: Vec::new(),
            frames: Rc::new(FrameLoop::default()),
            closed: false,
            logger: with_context(logger, "Viewport"),
        };
        viewport.install_listeners()?;
        viewport.start_frames()?;
        Ok(viewport)
    }

    fn install_listeners(&mut self) -> Result<(), JsValue> {
        let shared = Rc::clone(&self.shared);
        let window = self.window.clone();
        let on_resize = Closure::wrap(Box::new(move || shared.sync_size(&window)) as Box<dyn FnMut()>);
        self.window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
        self.on_resize = Some(on_resize);

        let shared = Rc::clone(&self.shared);
        let down = Closure::wrap(Box::new(move |event: MouseEvent| {
            let (p, _) = shared.locate(&event);
            let actions = shared.core.borrow_mut().on_pointer_down(p, Button::from_dom(event.button()));
            shared.dispatch(actions);
        }) as Box<dyn FnMut(MouseEvent)>);
        self.listen(self.shared.canvas.clone().into(), "pointerdown", down)?;

        // Moves and releases are tracked window-wide so a drag survives the
        // pointer leaving the canvas.
        let shared = Rc::clone(&self.shared);
        let moved = Closure::wrap(Box::new(move |event: MouseEvent| {
            let (p, _) = shared.locate(&event);
            let actions = shared.core.borrow_mut().on_pointer_move(p);
            shared.dispatch(actions);
        }) as Box<dyn FnMut(MouseEvent)>);
        self.listen(self.window.clone().into(), "pointermove", moved)?;

        let shared = Rc::clone(&self.shared);
        let up = Closure::wrap(Box::new(move |event: MouseEvent| {
            let (p, inside) = shared.locate(&event);
            let actions = shared.core.borrow_mut().on_pointer_up(p, Button::from_dom(event.button()), inside);
            shared.dispatch(actions);
        }) as Box<dyn FnMut(MouseEvent)>);
        self.listen(self.window.clone().into(), "pointerup", up)?;
        Ok(())
    }

    fn listen(&mut self, target: EventTarget, event: &'static str, listener: PointerListener) -> Result<(), JsValue> {
        target.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
        self.listeners.push((target, event, listener));
        Ok(())
    }

    fn start_frames(&mut self) -> Result<(), JsValue> {
        let shared = Rc::clone(&self.shared);
        let frames = Rc::clone(&self.frames);
        let window = self.window.clone();
        let logger = Rc::clone(&self.logger);
        let tick = Closure::wrap(Box::new(move |_ts: f64| {
            if !frames.begin_frame() {
                return;
            }
            if let Err(e) = shared.render() {
                logger.error(&format!("render failed: {e:?}"));
            }
            let next = frames.with_callback(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()));
            if let Some(Err(e)) = next {
                logger.error(&format!("request_animation_frame failed: {e:?}"));
            }
        }) as Box<dyn FnMut(f64)>);

        self.window.request_animation_frame(tick.as_ref().unchecked_ref())?;
        self.frames.install(tick);
        Ok(())
    }

    /// Route scene actions (drag start, token moved, redraw) to the host.
    pub fn set_action_handler(&self, handler: impl FnMut(Action) + 'static) {
        *self.shared.handler.borrow_mut() = Some(Box::new(handler));
    }

    /// Borrow the core for token and layer operations.
    pub fn with_core<R>(&self, f: impl FnOnce(&mut ViewportCore) -> R) -> R {
        f(&mut self.shared.core.borrow_mut())
    }

    /// Forward an explicit resize (e.g. from a host layout pass).
    pub fn resize(&self, width: f64, height: f64) {
        self.shared.canvas.set_width(css_to_device(width, self.shared.core.borrow().dpr));
        self.shared.canvas.set_height(css_to_device(height, self.shared.core.borrow().dpr));
        self.shared.core.borrow_mut().resize(width, height);
    }

    /// Draw one frame immediately.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        self.shared.render()
    }

    /// Load the shader `config` points at and install it when it arrives.
    #[cfg(feature = "browser")]
    pub fn load_configured_shader(&self, config: &ViewportConfig) {
        self.load_shader(config.shader_source());
    }

    /// Load the fog shader in the background and install it when it arrives.
    #[cfg(feature = "browser")]
    pub fn load_shader(&self, loader: impl crate::fog::ShaderLoader + 'static) {
        let shared = Rc::clone(&self.shared);
        wasm_bindgen_futures::spawn_local(async move {
            let result = loader.load().await;
            shared.core.borrow_mut().scene.install_shader(result);
        });
    }

    /// Stop the frame loop, remove every listener and release the surface.
    ///
    /// The frame callback is released by its own next invocation, since a
    /// frame for it is still queued.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.frames.stop();

        if let Some(on_resize) = self.on_resize.take() {
            if let Err(e) =
                self.window.remove_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
            {
                self.logger.warn(&format!("remove resize listener: {e:?}"));
            }
        }
        for (target, event, listener) in self.listeners.drain(..) {
            if let Err(e) = target.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref()) {
                self.logger.warn(&format!("remove {event} listener: {e:?}"));
            }
        }

        self.shared.handler.borrow_mut().take();
        self.shared.images.borrow_mut().clear();
        self.shared.canvas.set_width(0);
        self.shared.canvas.set_height(0);
        self.shared.canvas.remove();
        self.logger.info("closed");
    }
}

impl Drop for Viewport {
    fn drop(&mut self) {
        self.close();
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn css_to_device(css: f64, dpr: f64) -> u32 {
    (css * dpr).round().max(0.0) as u32
}
