use std::process::ExitCode;
use std::thread;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cache;
mod config;
mod display;
mod error;
mod slideshow;
mod state;

use crate::cache::thumbnail::ThumbnailCache;
use crate::config::Config;
use crate::display::frame_dump::FrameDumpDisplay;
use crate::display::Display;
use crate::error::{Result, WallError};
use crate::slideshow::{Slideshow, StopSignal};
use crate::state::library::ImageSetGrouper;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = Config::load()?;
    info!(
        "🎨 Display wall starting: {} displays, images from {}",
        config.displays.len(),
        config.image_dir.display()
    );

    // Sets are built before any panel is touched so naming problems fail fast
    let sets = ImageSetGrouper::new(config.displays.len())?.build(&config.image_dir)?;

    let displays = open_displays(&config)?;
    let mut slideshow = Slideshow::new(displays, sets, ThumbnailCache::new(config.jpeg_quality))?
        .with_settle_delay(config.settle_delay())
        .with_prewarm(config.prewarm);

    let stop = StopSignal::new();
    listen_for_ctrl_c(stop.clone());

    slideshow.run(&stop)
}

/// Open the configured panels, in slot order
fn open_displays(config: &Config) -> Result<Vec<Box<dyn Display>>> {
    info!("🖥️  Writing frames to {}", config.frame_dir.display());

    config
        .displays
        .iter()
        .map(|panel_config| {
            FrameDumpDisplay::new(
                &panel_config.name,
                panel_config.width,
                panel_config.height,
                panel_config.rotation,
                &config.frame_dir,
            )
            .map(|panel| {
                debug!("🖥️  {} → {}", panel.name(), panel.frame_path().display());
                Box::new(panel) as Box<dyn Display>
            })
            .map_err(|source| WallError::Display {
                display: panel_config.name.clone(),
                source,
            })
        })
        .collect()
}

/// Raise `stop` on Ctrl-C. The listener gets its own thread and a
/// single-threaded runtime; the slideshow itself never leaves the main thread.
fn listen_for_ctrl_c(stop: StopSignal) {
    let spawned = thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!("⚠️  Ctrl-C handling unavailable: {}", e);
                    return;
                }
            };

            match runtime.block_on(tokio::signal::ctrl_c()) {
                Ok(()) => {
                    info!("🛑 Ctrl-C received, finishing the current set");
                    stop.stop();
                }
                Err(e) => warn!("⚠️  Ctrl-C handling unavailable: {}", e),
            }
        });

    if let Err(e) = spawned {
        warn!("⚠️  Could not start Ctrl-C listener: {}", e);
    }
}
