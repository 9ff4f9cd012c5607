#![forbid(unsafe_code)]

//! Host-driven frame loop for a single border effect.
//!
//! [`FrameDriver`] owns one [`BorderFx`] and runs it without threads or
//! blocking. The host delivers input through [`push_event`] and calls
//! [`on_frame`] whenever a frame it scheduled fires:
//!
//! ```text
//! mount(now)                       // schedule the first frame
//! host frame callback
//!   → on_frame(request, now, surface)
//!       drain host events          // pointer move / leave, resize notice
//!       measure surface bounds     // resize effect only on change
//!       clear, update, draw
//!       schedule the next frame
//! unmount()                        // cancel frame, detach, flip token
//! ```
//!
//! Frames that arrive after [`unmount`], or carry a request id the driver is
//! not waiting for, are ignored: the effect sees no callbacks at all.
//!
//! [`push_event`]: FrameDriver::push_event
//! [`on_frame`]: FrameDriver::on_frame
//! [`unmount`]: FrameDriver::unmount

use std::collections::VecDeque;
use std::time::Duration;

use cardfx_core::{Bounds, Point};
use cardfx_fx::{BorderFx, FxContext, FxQuality};
use cardfx_render::Surface;
use serde::{Deserialize, Serialize};

use crate::scheduler::{CancelToken, FrameRequest, FrameScheduler, Subscription};

/// Largest per-frame scale in elapsed-time mode, so a stalled tab does not
/// fast-forward the animation.
const MAX_STEP_SCALE: f64 = 4.0;

/// How per-frame constants relate to wall time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimeStep {
    /// Every delivered frame advances one step, whatever the display rate.
    #[default]
    PerFrame,
    /// Steps scale with elapsed time, normalized to `reference_hz`.
    Elapsed { reference_hz: f64 },
}

impl TimeStep {
    /// Step multiplier for a frame `dt` after the previous one.
    #[must_use]
    pub fn scale(self, dt: Option<Duration>) -> f64 {
        match (self, dt) {
            (Self::PerFrame, _) | (Self::Elapsed { .. }, None) => 1.0,
            (Self::Elapsed { reference_hz }, Some(dt)) => {
                if reference_hz.is_finite() && reference_hz > 0.0 {
                    (dt.as_secs_f64() * reference_hz).clamp(0.0, MAX_STEP_SCALE)
                } else {
                    1.0
                }
            }
        }
    }
}

/// Input delivered by the host between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// Pointer position in device pixels relative to the container.
    PointerMove(Point),
    PointerLeave,
    /// The host saw the container change size. Bounds are always read back
    /// from the surface; the reported size is only compared against it.
    Resize(Bounds),
}

/// Outcome of a single [`FrameDriver::on_frame`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepResult {
    /// The frame was stale or arrived after unmount; nothing ran.
    pub skipped: bool,
    /// Bounds changed and the effect was resized.
    pub resized: bool,
    /// Host events drained in this frame.
    pub events_processed: u32,
    /// Sequential index of the frame drawn (starts at 0).
    pub frame: u64,
    /// Next frame requested.
    pub next: Option<FrameRequest>,
}

/// Drives one effect from host frame callbacks.
pub struct FrameDriver<S: FrameScheduler> {
    effect: Box<dyn BorderFx>,
    scheduler: S,
    token: CancelToken,
    subscriptions: Vec<Box<dyn Subscription>>,
    events: VecDeque<HostEvent>,
    pending: Option<FrameRequest>,
    mounted: bool,
    time_step: TimeStep,
    ctx: FxContext,
    started_at: Duration,
    last_frame_at: Option<Duration>,
    frames: u64,
}

impl<S: FrameScheduler> std::fmt::Debug for FrameDriver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDriver")
            .field("effect", &self.effect.name())
            .field("mounted", &self.mounted)
            .field("pending", &self.pending)
            .field("bounds", &self.ctx.bounds)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl<S: FrameScheduler> FrameDriver<S> {
    /// Create an unmounted driver.
    #[must_use]
    pub fn new(effect: Box<dyn BorderFx>, scheduler: S, time_step: TimeStep) -> Self {
        Self {
            effect,
            scheduler,
            token: CancelToken::new(),
            subscriptions: Vec::new(),
            events: VecDeque::new(),
            pending: None,
            mounted: false,
            time_step,
            ctx: FxContext::new(Bounds::EMPTY),
            started_at: Duration::ZERO,
            last_frame_at: None,
            frames: 0,
        }
    }

    // -- Lifecycle ------------------------------------------------------------

    /// Start animating: request the first frame.
    ///
    /// Mounting an already mounted driver is a no-op. A driver mounted after
    /// an unmount gets a fresh cancellation token.
    pub fn mount(&mut self, now: Duration) {
        if self.mounted {
            return;
        }
        if self.token.is_cancelled() {
            self.token = CancelToken::new();
        }
        self.mounted = true;
        self.started_at = now;
        self.last_frame_at = None;
        self.pending = Some(self.scheduler.request_frame());
        tracing::debug!(effect = self.effect.name(), "border mounted");
    }

    /// Stop animating: cancel the pending frame, detach every subscription,
    /// and flip the cancellation token.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        if let Some(req) = self.pending.take() {
            self.scheduler.cancel_frame(req);
        }
        for mut sub in self.subscriptions.drain(..) {
            sub.detach();
        }
        self.token.cancel();
        self.events.clear();
        self.mounted = false;
        tracing::debug!(
            effect = self.effect.name(),
            frames = self.frames,
            "border unmounted"
        );
    }

    /// Register a host subscription released on unmount.
    pub fn attach(&mut self, subscription: Box<dyn Subscription>) {
        if self.mounted {
            self.subscriptions.push(subscription);
        } else {
            let mut subscription = subscription;
            subscription.detach();
        }
    }

    // -- Input ----------------------------------------------------------------

    /// Queue an event for the next frame. Ignored while unmounted.
    pub fn push_event(&mut self, event: HostEvent) {
        if self.mounted {
            self.events.push_back(event);
        }
    }

    // -- Frames ---------------------------------------------------------------

    /// Run one frame for `request`, delivered at host time `now`.
    pub fn on_frame(
        &mut self,
        request: FrameRequest,
        now: Duration,
        surface: &mut dyn Surface,
    ) -> StepResult {
        if !self.mounted || self.token.is_cancelled() || self.pending != Some(request) {
            tracing::trace!(request = request.0, "stale frame ignored");
            return StepResult {
                skipped: true,
                ..StepResult::default()
            };
        }
        self.pending = None;
        let mut result = StepResult::default();

        let measured = surface.bounds();
        while let Some(event) = self.events.pop_front() {
            match event {
                HostEvent::PointerMove(p) => self.ctx.pointer = p.is_finite().then_some(p),
                HostEvent::PointerLeave => self.ctx.pointer = None,
                HostEvent::Resize(reported) => {
                    if reported != measured {
                        tracing::debug!(
                            reported_width = reported.width,
                            reported_height = reported.height,
                            width = measured.width,
                            height = measured.height,
                            "resize notice disagrees with surface"
                        );
                    }
                }
            }
            result.events_processed += 1;
        }

        if measured != self.ctx.bounds {
            self.resize(measured);
            result.resized = true;
        }

        let dt = self.last_frame_at.map(|prev| now.saturating_sub(prev));
        self.last_frame_at = Some(now);
        self.ctx.frame = self.frames;
        self.ctx.now = now;
        self.ctx.time_seconds = now.saturating_sub(self.started_at).as_secs_f64();
        self.ctx.step_scale = self.time_step.scale(dt);
        if self.ctx.step_scale >= MAX_STEP_SCALE {
            tracing::warn!(
                dt_ms = dt.map_or(0.0, |d| d.as_secs_f64() * 1000.0),
                max_scale = MAX_STEP_SCALE,
                "frame gap clamped"
            );
        }

        surface.clear();
        self.effect.update(&self.ctx);
        self.effect.draw(surface);

        result.frame = self.frames;
        self.frames += 1;
        let next = self.scheduler.request_frame();
        self.pending = Some(next);
        result.next = Some(next);
        tracing::trace!(frame = result.frame, step_scale = self.ctx.step_scale, "frame");
        result
    }

    fn resize(&mut self, bounds: Bounds) {
        tracing::debug!(
            width = bounds.width,
            height = bounds.height,
            dpr = bounds.dpr,
            "border resized"
        );
        self.ctx.bounds = bounds;
        self.effect.resize(bounds);
    }

    // -- Accessors ------------------------------------------------------------

    pub fn set_quality(&mut self, quality: FxQuality) {
        self.ctx.quality = quality;
    }

    #[must_use]
    pub const fn quality(&self) -> FxQuality {
        self.ctx.quality
    }

    #[must_use]
    pub const fn time_step(&self) -> TimeStep {
        self.time_step
    }

    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Frame the driver is waiting for.
    #[must_use]
    pub const fn pending_request(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// A clone of the cancellation token for host callbacks.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.ctx.bounds
    }

    #[must_use]
    pub const fn pointer(&self) -> Option<Point> {
        self.ctx.pointer
    }

    /// Frames drawn since construction.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn effect(&self) -> &dyn BorderFx {
        self.effect.as_ref()
    }

    #[must_use]
    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

impl<S: FrameScheduler> Drop for FrameDriver<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}
