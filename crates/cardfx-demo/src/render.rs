#![forbid(unsafe_code)]

//! Offline frame rendering: drive a border through the runtime with a
//! manual scheduler and write selected frames as PNG.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cardfx_core::Bounds;
use cardfx_render::{PackedRgba, Pixmap};
use cardfx_runtime::{BorderConfig, ConfigError, HostEvent, ManualScheduler, MonotonicClock};
use cardfx_style::ColorParseError;
use image::RgbaImage;

use crate::cli::Opts;

/// Anything that stops a render run.
#[derive(Debug)]
pub enum DemoError {
    Config(ConfigError),
    Background(ColorParseError),
    Io { path: PathBuf, source: std::io::Error },
    Image { path: PathBuf, source: image::ImageError },
    /// Size and dpr give a zero-pixel canvas.
    EmptyCanvas { width: f64, height: f64, dpr: f64 },
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Background(e) => write!(f, "--background: {e}"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Image { path, source } => write!(f, "{}: {source}", path.display()),
            Self::EmptyCanvas { width, height, dpr } => {
                write!(f, "canvas {width}x{height} @ {dpr}x has no pixels")
            }
        }
    }
}

impl std::error::Error for DemoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Background(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            Self::Image { source, .. } => Some(source),
            Self::EmptyCanvas { .. } => None,
        }
    }
}

impl From<ConfigError> for DemoError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSummary {
    pub frames: u32,
    pub saved: Vec<PathBuf>,
    /// Mean count of non-transparent pixels per drawn frame.
    pub mean_coverage: f64,
    /// Wall time spent simulating and encoding.
    pub elapsed: Duration,
}

/// Load the config file (if any) and apply CLI overrides on top.
pub fn resolve_config(opts: &Opts) -> Result<BorderConfig, DemoError> {
    let mut config = match &opts.config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| DemoError::Io {
                path: path.clone(),
                source,
            })?;
            BorderConfig::from_json_str(&text)?
        }
        None => BorderConfig::default(),
    };
    if let Some(effect) = opts.effect {
        config.effect = effect;
    }
    if let Some(seed) = opts.seed {
        config.seed = Some(seed);
    }
    if let Some(quality) = opts.quality {
        config.quality = quality;
    }
    config.validate()?;
    Ok(config)
}

/// Composite `pixmap` over an opaque `background` into RGBA8 bytes.
#[must_use]
pub fn flatten(pixmap: &Pixmap, background: PackedRgba) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixmap.pixels().len() * 4);
    for px in pixmap.pixels() {
        let c = px.over(background);
        out.extend_from_slice(&[c.r(), c.g(), c.b(), 255]);
    }
    out
}

fn save_png(path: &Path, pixmap: &Pixmap, background: PackedRgba) -> Result<(), DemoError> {
    let (w, h) = (pixmap.width() as u32, pixmap.height() as u32);
    let Some(img) = RgbaImage::from_raw(w, h, flatten(pixmap, background)) else {
        return Err(DemoError::EmptyCanvas {
            width: f64::from(w),
            height: f64::from(h),
            dpr: 1.0,
        });
    };
    img.save(path).map_err(|source| DemoError::Image {
        path: path.to_path_buf(),
        source,
    })
}

/// Simulate `opts.frames` frames and save the scheduled ones to `opts.out`.
pub fn render(opts: &Opts, config: &BorderConfig) -> Result<RenderSummary, DemoError> {
    let background = cardfx_style::parse_color(&opts.background).map_err(DemoError::Background)?;
    let bounds = Bounds::from_css(opts.width, opts.height, opts.dpr);
    let (px_w, px_h) = (bounds.width.round() as usize, bounds.height.round() as usize);
    if px_w == 0 || px_h == 0 {
        return Err(DemoError::EmptyCanvas {
            width: opts.width,
            height: opts.height,
            dpr: opts.dpr,
        });
    }
    fs::create_dir_all(&opts.out).map_err(|source| DemoError::Io {
        path: opts.out.clone(),
        source,
    })?;

    let mut pixmap = Pixmap::with_dpr(px_w, px_h, bounds.dpr);
    let mut driver = config.driver(ManualScheduler::new());
    let interval = opts.frame_interval();
    driver.mount(Duration::ZERO);
    if let Some(p) = opts.pointer {
        driver.push_event(HostEvent::PointerMove(p * bounds.dpr));
    }

    let clock = MonotonicClock::new();
    let mut summary = RenderSummary::default();
    let mut coverage = 0u64;
    for i in 0..opts.frames {
        let Some(request) = driver.scheduler_mut().fire() else {
            break;
        };
        let now = interval * (i + 1);
        let step = driver.on_frame(request, now, &mut pixmap);
        if step.skipped {
            break;
        }
        summary.frames += 1;
        coverage += pixmap.pixels().iter().filter(|p| !p.is_transparent()).count() as u64;
        if opts.saves_frame(i) {
            let path = opts.out.join(format!("{}_{i:04}.png", config.effect));
            save_png(&path, &pixmap, background)?;
            tracing::debug!(path = %path.display(), frame = i, "frame saved");
            summary.saved.push(path);
        }
    }
    driver.unmount();

    if summary.frames > 0 {
        summary.mean_coverage = coverage as f64 / f64::from(summary.frames);
    }
    summary.elapsed = clock.now();
    tracing::info!(
        effect = %config.effect,
        frames = summary.frames,
        saved = summary.saved.len(),
        elapsed_ms = summary.elapsed.as_secs_f64() * 1000.0,
        "render finished"
    );
    Ok(summary)
}
