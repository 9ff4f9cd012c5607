#![forbid(unsafe_code)]

//! Command-line argument parsing for the border demo.
//!
//! Parses args manually (no external dependencies) to keep the binary lean.
//! Supports environment variable overrides via `CARDFX_DEMO_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;

use cardfx_core::Point;
use cardfx_fx::{EffectKind, FxQuality};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
cardfx demo: render an animated card border to PNG frames

USAGE:
    cardfx-demo [OPTIONS]

OPTIONS:
    --effect=NAME        Effect: lightning, fire, binary, frost, glow (default: lightning)
    --config=PATH        JSON border config; flags below override it
    --size=WxH           Card size in CSS pixels (default: 340x540)
    --dpr=F              Device pixel ratio (default: 1.0)
    --frames=N           Frames to simulate (default: 60)
    --fps=N              Simulated display rate (default: 60)
    --save-every=N       Save every Nth frame; 0 saves only the last (default: 0)
    --seed=N             Noise seed (default: from clock)
    --quality=NAME       off, minimal, reduced, or full (default: full)
    --pointer=X,Y        Hold the pointer at X,Y CSS pixels
    --background=COLOR   Backdrop color for saved frames (default: #101418)
    --out=DIR            Output directory (default: cardfx-frames)
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    CARDFX_DEMO_EFFECT       Override --effect
    CARDFX_DEMO_CONFIG       Override --config
    CARDFX_DEMO_SIZE         Override --size (e.g., 340x540)
    CARDFX_DEMO_DPR          Override --dpr
    CARDFX_DEMO_FRAMES       Override --frames
    CARDFX_DEMO_FPS          Override --fps
    CARDFX_DEMO_SEED         Override --seed
    CARDFX_DEMO_QUALITY      Override --quality
    CARDFX_DEMO_OUT          Override --out
    CARDFX_LOG               Log filter (falls back to RUST_LOG, default: info)";

/// Parsed command-line options.
#[derive(Debug, Clone)]
pub struct Opts {
    /// Effect to render. `None` keeps the config file's choice.
    pub effect: Option<EffectKind>,
    /// JSON border config path.
    pub config: Option<PathBuf>,
    /// Card width in CSS pixels.
    pub width: f64,
    /// Card height in CSS pixels.
    pub height: f64,
    pub dpr: f64,
    /// Frames to simulate.
    pub frames: u32,
    /// Simulated display rate.
    pub fps: u32,
    /// Save every Nth frame (0 = only the last).
    pub save_every: u32,
    pub seed: Option<u32>,
    pub quality: Option<FxQuality>,
    /// Pointer held in place, CSS pixels.
    pub pointer: Option<Point>,
    pub background: String,
    pub out: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Help,
    Version,
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            effect: None,
            config: None,
            width: 340.0,
            height: 540.0,
            dpr: 1.0,
            frames: 60,
            fps: 60,
            save_every: 0,
            seed: None,
            quality: None,
            pointer: None,
            background: "#101418".into(),
            out: PathBuf::from("cardfx-frames"),
        }
    }
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse() -> Self {
        match Self::parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("cardfx-demo {VERSION}");
                process::exit(0);
            }
            Err(ParseError::InvalidValue { flag, value }) => {
                eprintln!("Invalid {flag} value: {value}");
                process::exit(1);
            }
            Err(ParseError::UnknownArg(arg)) => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    pub fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = get_env("CARDFX_DEMO_EFFECT")
            && let Ok(kind) = val.parse()
        {
            opts.effect = Some(kind);
        }
        if let Some(val) = get_env("CARDFX_DEMO_CONFIG")
            && !val.trim().is_empty()
        {
            opts.config = Some(PathBuf::from(val));
        }
        if let Some(val) = get_env("CARDFX_DEMO_SIZE")
            && let Some((w, h)) = parse_size(&val)
        {
            opts.width = w;
            opts.height = h;
        }
        if let Some(val) = get_env("CARDFX_DEMO_DPR")
            && let Some(n) = parse_positive(&val)
        {
            opts.dpr = n;
        }
        if let Some(val) = get_env("CARDFX_DEMO_FRAMES")
            && let Ok(n) = val.parse()
        {
            opts.frames = n;
        }
        if let Some(val) = get_env("CARDFX_DEMO_FPS")
            && let Ok(n) = val.parse::<u32>()
            && n > 0
        {
            opts.fps = n;
        }
        if let Some(val) = get_env("CARDFX_DEMO_SEED")
            && let Ok(n) = val.parse()
        {
            opts.seed = Some(n);
        }
        if let Some(val) = get_env("CARDFX_DEMO_QUALITY")
            && let Some(q) = parse_quality(&val)
        {
            opts.quality = Some(q);
        }
        if let Some(val) = get_env("CARDFX_DEMO_OUT")
            && !val.trim().is_empty()
        {
            opts.out = PathBuf::from(val);
        }

        // Parse command-line args (override env vars)
        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "--help" | "-h" => return Err(ParseError::Help),
                "--version" | "-V" => return Err(ParseError::Version),
                other => {
                    let Some((flag, val)) = other.split_once('=') else {
                        return Err(ParseError::UnknownArg(other.to_string()));
                    };
                    let invalid = |flag: &'static str| ParseError::InvalidValue {
                        flag,
                        value: val.to_string(),
                    };
                    match flag {
                        "--effect" => {
                            opts.effect = Some(val.parse().map_err(|_| invalid("--effect"))?);
                        }
                        "--config" => opts.config = Some(PathBuf::from(val)),
                        "--size" => {
                            let (w, h) = parse_size(val).ok_or_else(|| invalid("--size"))?;
                            opts.width = w;
                            opts.height = h;
                        }
                        "--dpr" => opts.dpr = parse_positive(val).ok_or_else(|| invalid("--dpr"))?,
                        "--frames" => opts.frames = val.parse().map_err(|_| invalid("--frames"))?,
                        "--fps" => {
                            opts.fps = val
                                .parse()
                                .ok()
                                .filter(|&n: &u32| n > 0)
                                .ok_or_else(|| invalid("--fps"))?;
                        }
                        "--save-every" => {
                            opts.save_every = val.parse().map_err(|_| invalid("--save-every"))?;
                        }
                        "--seed" => opts.seed = Some(val.parse().map_err(|_| invalid("--seed"))?),
                        "--quality" => {
                            opts.quality = Some(parse_quality(val).ok_or_else(|| invalid("--quality"))?);
                        }
                        "--pointer" => {
                            opts.pointer = Some(parse_point(val).ok_or_else(|| invalid("--pointer"))?);
                        }
                        "--background" => opts.background = val.to_string(),
                        "--out" => opts.out = PathBuf::from(val),
                        _ => return Err(ParseError::UnknownArg(other.to_string())),
                    }
                }
            }
        }

        Ok(opts)
    }

    /// Time between simulated frames.
    #[must_use]
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }

    /// Whether frame `index` (0-based) is written to disk.
    #[must_use]
    pub fn saves_frame(&self, index: u32) -> bool {
        if index + 1 == self.frames {
            return true;
        }
        self.save_every > 0 && (index + 1) % self.save_every == 0
    }
}

fn parse_size(raw: &str) -> Option<(f64, f64)> {
    let trimmed = raw.trim();
    let mut parts = trimmed.split(['x', 'X']);
    let w = parse_positive(parts.next()?)?;
    let h = parse_positive(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some((w, h))
}

fn parse_positive(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn parse_point(raw: &str) -> Option<Point> {
    let (x, y) = raw.split_once(',')?;
    let p = Point::new(x.trim().parse().ok()?, y.trim().parse().ok()?);
    p.is_finite().then_some(p)
}

fn parse_quality(raw: &str) -> Option<FxQuality> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "off" => Some(FxQuality::Off),
        "minimal" => Some(FxQuality::Minimal),
        "reduced" => Some(FxQuality::Reduced),
        "full" => Some(FxQuality::Full),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_with_env<I, S>(
        args: I,
        env_pairs: &[(&'static str, &'static str)],
    ) -> Result<Opts, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = std::collections::HashMap::new();
        for (key, value) in env_pairs {
            map.insert(*key, *value);
        }
        Opts::parse_from_env_and_args(args, |key| map.get(key).map(|value| (*value).to_string()))
    }

    #[test]
    fn default_opts() {
        let opts = Opts::default();
        assert!(opts.effect.is_none());
        assert_eq!((opts.width, opts.height), (340.0, 540.0));
        assert_eq!(opts.dpr, 1.0);
        assert_eq!(opts.frames, 60);
        assert_eq!(opts.fps, 60);
        assert_eq!(opts.save_every, 0);
        assert!(opts.seed.is_none());
        assert_eq!(opts.out, PathBuf::from("cardfx-frames"));
    }

    #[test]
    fn help_text_lists_every_effect() {
        for kind in EffectKind::ALL {
            assert!(HELP_TEXT.contains(kind.name()), "missing {kind}");
        }
        assert!(HELP_TEXT.contains("CARDFX_DEMO_SIZE"));
    }

    #[test]
    fn size_variants() {
        assert_eq!(parse_size("340x540"), Some((340.0, 540.0)));
        assert_eq!(parse_size("80X24"), Some((80.0, 24.0)));
        assert_eq!(parse_size("80x24x10"), None);
        assert_eq!(parse_size("0x24"), None);
        assert_eq!(parse_size("bad"), None);
    }

    #[test]
    fn env_overrides_apply() {
        let env = [
            ("CARDFX_DEMO_EFFECT", "fire"),
            ("CARDFX_DEMO_SIZE", "200x100"),
            ("CARDFX_DEMO_DPR", "2"),
            ("CARDFX_DEMO_SEED", "9"),
            ("CARDFX_DEMO_QUALITY", "Reduced"),
        ];
        let opts = parse_with_env(Vec::<String>::new(), &env).expect("parse");
        assert_eq!(opts.effect, Some(EffectKind::Fire), "env={env:?}");
        assert_eq!((opts.width, opts.height), (200.0, 100.0));
        assert_eq!(opts.dpr, 2.0);
        assert_eq!(opts.seed, Some(9));
        assert_eq!(opts.quality, Some(FxQuality::Reduced));
    }

    #[test]
    fn bad_env_values_are_ignored() {
        let env = [("CARDFX_DEMO_EFFECT", "smoke"), ("CARDFX_DEMO_FPS", "0")];
        let opts = parse_with_env(Vec::<String>::new(), &env).expect("parse");
        assert!(opts.effect.is_none());
        assert_eq!(opts.fps, 60);
    }

    #[test]
    fn args_override_env() {
        let env = [("CARDFX_DEMO_EFFECT", "fire"), ("CARDFX_DEMO_FRAMES", "5")];
        let opts = parse_with_env(["--effect=glow", "--frames=12"], &env).expect("parse");
        assert_eq!(opts.effect, Some(EffectKind::Glow));
        assert_eq!(opts.frames, 12);
    }

    #[test]
    fn args_parse_pointer_and_out() {
        let opts = parse_with_env(["--pointer=10, 20.5", "--out=/tmp/x"], &[]).expect("parse");
        assert_eq!(opts.pointer, Some(Point::new(10.0, 20.5)));
        assert_eq!(opts.out, PathBuf::from("/tmp/x"));
    }

    #[test]
    fn invalid_value_reports_flag() {
        let err = parse_with_env(["--dpr=-1"], &[]);
        assert!(
            matches!(err, Err(ParseError::InvalidValue { flag: "--dpr", .. })),
            "got {err:?}"
        );
        let err = parse_with_env(["--effect=smoke"], &[]);
        assert!(matches!(err, Err(ParseError::InvalidValue { flag: "--effect", .. })));
    }

    #[test]
    fn unknown_arg_reports_error() {
        let err = parse_with_env(["--mystery-flag"], &[]);
        assert!(
            matches!(err, Err(ParseError::UnknownArg(ref arg)) if arg == "--mystery-flag"),
            "got {err:?}"
        );
        let err = parse_with_env(["--mystery=1"], &[]);
        assert!(matches!(err, Err(ParseError::UnknownArg(_))));
    }

    #[test]
    fn help_and_version() {
        assert_eq!(parse_with_env(["-h"], &[]).unwrap_err(), ParseError::Help);
        assert_eq!(parse_with_env(["--version"], &[]).unwrap_err(), ParseError::Version);
    }

    #[test]
    fn save_schedule() {
        let opts = Opts {
            frames: 10,
            save_every: 4,
            ..Opts::default()
        };
        let saved: Vec<u32> = (0..10).filter(|&i| opts.saves_frame(i)).collect();
        assert_eq!(saved, vec![3, 7, 9]);
        let last_only = Opts {
            frames: 3,
            ..Opts::default()
        };
        assert_eq!((0..3).filter(|&i| last_only.saves_frame(i)).count(), 1);
    }
}
