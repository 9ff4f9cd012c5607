#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the BorderRunner.
//!
//! This module wraps [`super::runner_core::RunnerCore`] with a canvas
//! surface, an animation-frame loop, and mouse listeners. Only compiled on
//! `wasm32` targets.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use cardfx_core::{Bounds, Point};
use cardfx_render::{LineCap, LineJoin, PackedRgba, Rect, StrokeStyle, Surface};
use cardfx_runtime::{CancelToken, Subscription};
use js_sys::{Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, EventTarget, HtmlCanvasElement, MouseEvent, Window};

use super::runner_core::RunnerCore;

type TickClosure = Closure<dyn FnMut(f64)>;

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))
}

fn now_ms(window: &Window) -> f64 {
    window.performance().map_or(0.0, |p| p.now())
}

fn request_frame(callback: &TickClosure) -> Result<i32, JsValue> {
    window()?.request_animation_frame(callback.as_ref().unchecked_ref())
}

// ---------------------------------------------------------------------------
// Canvas surface
// ---------------------------------------------------------------------------

const fn cap_name(cap: LineCap) -> &'static str {
    match cap {
        LineCap::Butt => "butt",
        LineCap::Round => "round",
        LineCap::Square => "square",
    }
}

const fn join_name(join: LineJoin) -> &'static str {
    match join {
        LineJoin::Miter => "miter",
        LineJoin::Round => "round",
        LineJoin::Bevel => "bevel",
    }
}

/// [`Surface`] over a 2D canvas context. Coordinates are device pixels,
/// matching the canvas backing store.
struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    bounds: Bounds,
}

impl CanvasSurface {
    fn set_shadow(&self, blur: f64, color: PackedRgba) {
        if blur > 0.0 {
            self.ctx.set_shadow_blur(blur);
            self.ctx.set_shadow_color(&color.to_css());
        } else {
            self.ctx.set_shadow_blur(0.0);
            self.ctx.set_shadow_color("transparent");
        }
    }
}

impl Surface for CanvasSurface {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.bounds.width, self.bounds.height);
    }

    fn stroke_path(&mut self, points: &[Point], closed: bool, style: &StrokeStyle) {
        let [first, rest @ ..] = points else {
            return;
        };
        if rest.is_empty() {
            return;
        }
        let css = style.color.to_css();
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        if closed {
            self.ctx.close_path();
        }
        self.ctx.set_stroke_style_str(&css);
        self.ctx.set_line_width(style.width);
        self.ctx.set_line_cap(cap_name(style.cap));
        self.ctx.set_line_join(join_name(style.join));
        self.set_shadow(style.blur, style.color);
        self.ctx.stroke();
    }

    fn fill_rect(&mut self, rect: Rect, color: PackedRgba) {
        self.set_shadow(0.0, color);
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
    }

    fn fill_glyph(&mut self, glyph: char, at: Point, size: f64, color: PackedRgba) {
        self.set_shadow(0.0, color);
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.set_font(&format!("{size}px monospace"));
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        let mut buf = [0u8; 4];
        let _ = self.ctx.fill_text(glyph.encode_utf8(&mut buf), at.x, at.y);
    }
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// A DOM event listener removed on detach.
struct DomListener {
    target: EventTarget,
    kind: &'static str,
    closure: Option<Closure<dyn FnMut(MouseEvent)>>,
}

impl DomListener {
    fn add(
        target: &EventTarget,
        kind: &'static str,
        closure: Closure<dyn FnMut(MouseEvent)>,
    ) -> Result<Self, JsValue> {
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            closure: Some(closure),
        })
    }
}

impl Subscription for DomListener {
    fn detach(&mut self) {
        if let Some(closure) = self.closure.take() {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.kind, closure.as_ref().unchecked_ref());
        }
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

struct Shared {
    core: RunnerCore,
    canvas: HtmlCanvasElement,
    surface: CanvasSurface,
    raf_handle: Option<i32>,
}

impl Shared {
    /// Match the canvas backing store to its layout size.
    fn measure(&mut self) {
        let Ok(window) = window() else {
            return;
        };
        let dpr = window.device_pixel_ratio();
        let css_w = f64::from(self.canvas.client_width().max(0));
        let css_h = f64::from(self.canvas.client_height().max(0));
        if self.core.resize(css_w, css_h, dpr) {
            let bounds = self.core.bounds();
            self.canvas.set_width(bounds.width.round() as u32);
            self.canvas.set_height(bounds.height.round() as u32);
            self.surface.bounds = bounds;
        }
    }

    fn tick(&mut self, ts: f64) {
        self.raf_handle = None;
        self.measure();
        let step = self.core.step(ts);
        if !step.skipped {
            self.core.frame().replay(&mut self.surface);
        }
    }
}

/// Animated border bound to a canvas element.
///
/// JavaScript creates it with a canvas and a JSON config, calls `start()`
/// once the canvas is in the document, and `destroy()` on teardown.
#[wasm_bindgen]
pub struct BorderRunner {
    shared: Rc<RefCell<Shared>>,
    tick: Rc<RefCell<Option<TickClosure>>>,
    token: CancelToken,
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

#[wasm_bindgen]
impl BorderRunner {
    /// Bind to `canvas` with a JSON border config (`"{}"` for defaults).
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config_json: &str) -> Result<BorderRunner, JsValue> {
        install_panic_hook();
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let dpr = window()?.device_pixel_ratio();
        let css_w = f64::from(canvas.client_width().max(0));
        let css_h = f64::from(canvas.client_height().max(0));
        let core = RunnerCore::from_json(config_json, css_w, css_h, dpr)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let bounds = core.bounds();
        canvas.set_width(bounds.width.round() as u32);
        canvas.set_height(bounds.height.round() as u32);
        let token = core.cancel_token();
        Ok(Self {
            shared: Rc::new(RefCell::new(Shared {
                core,
                canvas,
                surface: CanvasSurface { ctx, bounds },
                raf_handle: None,
            })),
            tick: Rc::new(RefCell::new(None)),
            token,
        })
    }

    /// Mount the effect, attach mouse listeners, and start the frame loop.
    /// Calling it while running is a no-op.
    pub fn start(&mut self) -> Result<(), JsValue> {
        let window = window()?;
        let target: EventTarget = {
            let mut shared = self.shared.borrow_mut();
            if shared.core.is_mounted() {
                return Ok(());
            }
            shared.core.mount(now_ms(&window));
            self.token = shared.core.cancel_token();
            shared.canvas.clone().into()
        };
        self.attach_listeners(&target)?;

        let shared = Rc::downgrade(&self.shared);
        let slot: Weak<RefCell<Option<TickClosure>>> = Rc::downgrade(&self.tick);
        let token = self.token.clone();
        let closure = TickClosure::new(move |ts: f64| {
            if token.is_cancelled() {
                return;
            }
            let (Some(shared), Some(slot)) = (shared.upgrade(), slot.upgrade()) else {
                return;
            };
            let Ok(mut shared) = shared.try_borrow_mut() else {
                return;
            };
            shared.tick(ts);
            if shared.core.wants_frame()
                && let Some(callback) = slot.borrow().as_ref()
            {
                match request_frame(callback) {
                    Ok(handle) => shared.raf_handle = Some(handle),
                    Err(e) => console_error(&format!("requestAnimationFrame failed: {e:?}")),
                }
            }
        });
        let handle = request_frame(&closure)?;
        self.shared.borrow_mut().raf_handle = Some(handle);
        *self.tick.borrow_mut() = Some(closure);
        Ok(())
    }

    /// Set drawing quality: `off`, `minimal`, `reduced`, or `full`.
    #[wasm_bindgen(js_name = setQuality)]
    pub fn set_quality(&mut self, name: &str) -> bool {
        self.shared.borrow_mut().core.set_quality(name)
    }

    /// Frames drawn since start.
    #[wasm_bindgen(js_name = frameCount)]
    pub fn frame_count(&self) -> u64 {
        self.shared.borrow().core.frame_count()
    }

    /// FNV-1a hash of the last frame's draw calls.
    #[wasm_bindgen(js_name = frameHash)]
    pub fn frame_hash(&self) -> String {
        self.shared.borrow().core.frame_hash()
    }

    /// `{ effect, css_width, css_height, dpr, running }`.
    pub fn info(&self) -> JsValue {
        let shared = self.shared.borrow();
        let (w, h, dpr) = shared.core.css_size();
        let obj = Object::new();
        let _ = Reflect::set(&obj, &"effect".into(), &shared.core.effect().name().into());
        let _ = Reflect::set(&obj, &"css_width".into(), &w.into());
        let _ = Reflect::set(&obj, &"css_height".into(), &h.into());
        let _ = Reflect::set(&obj, &"dpr".into(), &dpr.into());
        let _ = Reflect::set(&obj, &"running".into(), &shared.core.is_mounted().into());
        obj.into()
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.shared.borrow().core.is_mounted()
    }

    /// Stop the loop: cancel the pending animation frame, remove listeners,
    /// and clear the canvas. Safe to call more than once.
    pub fn destroy(&mut self) {
        self.token.cancel();
        let handle = match self.shared.try_borrow_mut() {
            Ok(mut shared) => {
                shared.core.unmount();
                shared.surface.clear();
                shared.raf_handle.take()
            }
            Err(_) => None,
        };
        if let (Some(handle), Ok(window)) = (handle, window()) {
            let _ = window.cancel_animation_frame(handle);
        }
        self.tick.borrow_mut().take();
    }
}

impl BorderRunner {
    fn attach_listeners(&self, target: &EventTarget) -> Result<(), JsValue> {
        let weak = Rc::downgrade(&self.shared);
        let token = self.token.clone();
        let on_move = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            if token.is_cancelled() {
                return;
            }
            if let Some(shared) = weak.upgrade()
                && let Ok(mut shared) = shared.try_borrow_mut()
            {
                shared
                    .core
                    .pointer_move(f64::from(event.offset_x()), f64::from(event.offset_y()));
            }
        });
        let weak = Rc::downgrade(&self.shared);
        let token = self.token.clone();
        let on_leave = Closure::<dyn FnMut(MouseEvent)>::new(move |_event: MouseEvent| {
            if token.is_cancelled() {
                return;
            }
            if let Some(shared) = weak.upgrade()
                && let Ok(mut shared) = shared.try_borrow_mut()
            {
                shared.core.pointer_leave();
            }
        });
        let move_listener = DomListener::add(target, "mousemove", on_move)?;
        let leave_listener = DomListener::add(target, "mouseleave", on_leave)?;
        let mut shared = self.shared.borrow_mut();
        shared.core.attach(Box::new(move_listener));
        shared.core.attach(Box::new(leave_listener));
        Ok(())
    }
}

impl Drop for BorderRunner {
    fn drop(&mut self) {
        self.destroy();
    }
}
