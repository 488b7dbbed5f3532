mod animation;
mod config;
mod error;
mod geometry;
mod session;
mod viewer;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use session::Spirograph;
use viewer::App;

const DEFAULT_LOG_FILTER: &str = "spirograph=info";

#[derive(Parser, Debug)]
#[command(name = "spirograph")]
#[command(author, version, about = "Draws a hypotrochoid while animating the rolling circles")]
pub struct Args {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Radius of the fixed outer circle
    #[arg(long)]
    outer_radius: Option<u32>,

    /// Starting radius of the rolling inner circle, a multiple of 5
    #[arg(long)]
    inner_radius: Option<u32>,

    /// Framerate limit, 0 for none
    #[arg(long)]
    fps: Option<u32>,

    /// Start in fullscreen mode
    #[arg(long)]
    fullscreen: bool,
}

/// `RUST_LOG` when set, otherwise info for this crate.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    }
    .with_args(&args);

    let palette = config.colors.palette()?;
    let mut session = Spirograph::new(
        config.spirograph.outer_radius,
        config.spirograph.inner_radius,
    )?;

    info!(
        outer = session.outer_radius(),
        inner = session.inner_radius(),
        "starting spirograph"
    );

    let mut app = App::new(&config, palette);
    app.run(&mut session);

    Ok(())
}
