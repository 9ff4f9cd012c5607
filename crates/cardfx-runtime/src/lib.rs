#![forbid(unsafe_code)]

//! Frame loop, lifecycle, and configuration for cardfx borders.
//!
//! A [`BorderConfig`] names an effect and its tuning; [`BorderConfig::driver`]
//! turns it into a [`FrameDriver`] that a host pumps from its own frame
//! callbacks. The host owns the loop and the surface; the driver owns the
//! effect, the pending frame, and every registration it must release on
//! unmount.
//!
//! ```
//! use std::time::Duration;
//! use cardfx_core::Bounds;
//! use cardfx_render::RecordingSurface;
//! use cardfx_runtime::{BorderConfig, ManualScheduler};
//!
//! let config = BorderConfig::from_json_str(r#"{"effect": "glow", "seed": 1}"#).unwrap();
//! let mut driver = config.driver(ManualScheduler::new());
//! let mut surface = RecordingSurface::with_bounds(Bounds::new(320.0, 200.0));
//!
//! driver.mount(Duration::ZERO);
//! let req = driver.scheduler_mut().fire().unwrap();
//! let step = driver.on_frame(req, Duration::from_millis(16), &mut surface);
//! assert!(step.resized);
//! assert!(surface.stroke_count() > 0);
//!
//! driver.unmount();
//! assert!(driver.scheduler().pending().is_none());
//! ```

pub mod clock;
pub mod config;
pub mod frame_driver;
pub mod scheduler;

pub use clock::MonotonicClock;
pub use config::{BorderConfig, ConfigError};
pub use frame_driver::{FrameDriver, HostEvent, StepResult, TimeStep};
pub use scheduler::{CancelToken, FrameRequest, FrameScheduler, ManualScheduler, Subscription};
