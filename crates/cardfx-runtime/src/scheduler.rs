#![forbid(unsafe_code)]

//! Frame scheduling seam and cancellation.
//!
//! The driver never owns a loop. It asks a [`FrameScheduler`] for the next
//! frame and the host later calls back with the [`FrameRequest`] it was
//! given. In a browser the scheduler wraps `requestAnimationFrame`; in tests
//! and offline rendering it is a [`ManualScheduler`].
//!
//! Host callbacks (event listeners, the animation-frame closure) hold a clone
//! of the driver's [`CancelToken`] and become no-ops once it flips.

use std::cell::Cell;
use std::rc::Rc;

/// Identifier of a scheduled frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameRequest(pub u64);

/// Source of animation-frame callbacks.
pub trait FrameScheduler {
    /// Schedule one callback for the next display frame.
    fn request_frame(&mut self) -> FrameRequest;

    /// Cancel a pending callback. Unknown or already-delivered requests are
    /// ignored.
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Shared cancellation flag.
///
/// Clones observe the same flag. Once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// A host-side registration (event listener, observer) that must be
/// released on unmount.
pub trait Subscription {
    /// Detach from the host. Called at most once.
    fn detach(&mut self);
}

/// Scheduler driven by hand: frames are "delivered" when the caller takes
/// the pending request and passes it to the driver.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Option<FrameRequest>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The request waiting to be delivered.
    #[must_use]
    pub const fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Take the pending request, as if the display fired it.
    pub fn fire(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }

    /// Total frames requested so far.
    #[must_use]
    pub const fn requested(&self) -> u64 {
        self.requested
    }

    /// Total pending frames cancelled so far.
    #[must_use]
    pub const fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        self.requested += 1;
        let req = FrameRequest(self.next_id);
        self.pending = Some(req);
        req
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}
