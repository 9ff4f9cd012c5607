#![forbid(unsafe_code)]

//! cardfx demo binary entry point.

use cardfx_demo::cli;
use cardfx_demo::render::{render, resolve_config};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = std::env::var("CARDFX_LOG")
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();
    let opts = cli::Opts::parse();

    let config = match resolve_config(&opts) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };
    match render(&opts, &config) {
        Ok(summary) => {
            for path in &summary.saved {
                println!("{}", path.display());
            }
        }
        Err(e) => {
            eprintln!("Render error: {e}");
            std::process::exit(1);
        }
    }
}
