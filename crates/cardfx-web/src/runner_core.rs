#![forbid(unsafe_code)]

//! Platform-independent runner core wrapping a [`FrameDriver`].
//!
//! This module contains the logic shared between the wasm-bindgen exports
//! and the native test harness. No JS/WASM types here. Host input arrives
//! in CSS pixels and milliseconds; the core converts to device pixels and
//! [`Duration`] before it reaches the driver.

use core::time::Duration;

use cardfx_core::{Bounds, Point};
use cardfx_fx::{EffectKind, FxQuality};
use cardfx_render::{RecordingSurface, Surface};
use cardfx_runtime::{
    BorderConfig, CancelToken, ConfigError, FrameDriver, HostEvent, ManualScheduler, StepResult,
    Subscription,
};

const FRAME_HASH_ALGO: &str = "fnv1a64";

/// Host-driven border runner. The host calls [`step`](Self::step) from its
/// animation-frame callback while [`wants_frame`](Self::wants_frame) holds.
pub struct RunnerCore {
    driver: FrameDriver<ManualScheduler>,
    effect: EffectKind,
    /// Last frame's draw calls, replayed onto the real canvas by the host.
    frame: RecordingSurface,
    css_size: (f64, f64),
    dpr: f64,
}

fn millis(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        Duration::from_secs_f64(ms / 1000.0)
    } else {
        Duration::ZERO
    }
}

impl RunnerCore {
    /// Create an unmounted runner for a container of `css_width` x
    /// `css_height` CSS pixels at device pixel ratio `dpr`.
    pub fn new(config: &BorderConfig, css_width: f64, css_height: f64, dpr: f64) -> Self {
        let bounds = Bounds::from_css(css_width, css_height, dpr);
        Self {
            driver: config.driver(ManualScheduler::new()),
            effect: config.effect,
            frame: RecordingSurface::with_bounds(bounds),
            css_size: (css_width, css_height),
            dpr: bounds.dpr,
        }
    }

    /// Parse a JSON [`BorderConfig`] and create a runner from it.
    pub fn from_json(
        json: &str,
        css_width: f64,
        css_height: f64,
        dpr: f64,
    ) -> Result<Self, ConfigError> {
        let config = BorderConfig::from_json_str(json)?;
        Ok(Self::new(&config, css_width, css_height, dpr))
    }

    pub fn mount(&mut self, now_ms: f64) {
        self.driver.mount(millis(now_ms));
    }

    /// Cancel the pending frame and detach every registered listener.
    pub fn unmount(&mut self) {
        self.driver.unmount();
    }

    pub fn is_mounted(&self) -> bool {
        self.driver.is_mounted()
    }

    /// Whether the driver is waiting for an animation frame.
    pub fn wants_frame(&self) -> bool {
        self.driver.scheduler().pending().is_some()
    }

    /// Register a host listener released on unmount.
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    pub fn attach(&mut self, subscription: Box<dyn Subscription>) {
        self.driver.attach(subscription);
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.driver.cancel_token()
    }

    /// Run the pending frame at host time `now_ms`.
    pub fn step(&mut self, now_ms: f64) -> StepResult {
        match self.driver.scheduler_mut().fire() {
            Some(request) => self.driver.on_frame(request, millis(now_ms), &mut self.frame),
            None => StepResult {
                skipped: true,
                ..StepResult::default()
            },
        }
    }

    /// Report the container size. Returns `true` when it changed.
    pub fn resize(&mut self, css_width: f64, css_height: f64, dpr: f64) -> bool {
        if (css_width, css_height) == self.css_size && dpr == self.dpr {
            return false;
        }
        let bounds = Bounds::from_css(css_width, css_height, dpr);
        self.css_size = (css_width, css_height);
        self.dpr = bounds.dpr;
        self.frame.set_bounds(bounds);
        self.driver.push_event(HostEvent::Resize(bounds));
        true
    }

    /// Pointer position in CSS pixels relative to the container.
    pub fn pointer_move(&mut self, css_x: f64, css_y: f64) {
        let p = Point::new(css_x * self.dpr, css_y * self.dpr);
        self.driver.push_event(HostEvent::PointerMove(p));
    }

    pub fn pointer_leave(&mut self) {
        self.driver.push_event(HostEvent::PointerLeave);
    }

    /// Set quality by name (`off`, `minimal`, `reduced`, `full`).
    /// Returns `false` for unknown names.
    pub fn set_quality(&mut self, name: &str) -> bool {
        let value = serde_json::Value::String(name.trim().to_ascii_lowercase());
        match serde_json::from_value::<FxQuality>(value) {
            Ok(quality) => {
                self.driver.set_quality(quality);
                true
            }
            Err(_) => false,
        }
    }

    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    pub fn quality(&self) -> FxQuality {
        self.driver.quality()
    }

    pub fn effect(&self) -> EffectKind {
        self.effect
    }

    /// Draw calls of the last frame.
    pub fn frame(&self) -> &RecordingSurface {
        &self.frame
    }

    /// `fnv1a64:<hex>` digest of the last frame.
    pub fn frame_hash(&self) -> String {
        format!("{FRAME_HASH_ALGO}:{:016x}", self.frame.frame_hash())
    }

    pub fn frame_count(&self) -> u64 {
        self.driver.frame_count()
    }

    /// Container bounds in device pixels.
    pub fn bounds(&self) -> Bounds {
        self.frame.bounds()
    }

    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    pub fn pointer(&self) -> Option<Point> {
        self.driver.pointer()
    }

    /// Container size in CSS pixels and the device pixel ratio.
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    pub fn css_size(&self) -> (f64, f64, f64) {
        (self.css_size.0, self.css_size.1, self.dpr)
    }
}
