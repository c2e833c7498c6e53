//! E-Paper Name Badge for Raspberry Pi
//!
//! Renders the owner's name badge (or a line of free text) on a Waveshare
//! 2.66" panel, then puts the panel to sleep.

use anyhow::Context;
use clap::Parser;
use overglade_badge::badge::BadgeRenderer;
use overglade_badge::canvas::{Color, FramePair};
use overglade_badge::config::{Config, DEFAULT_CONFIG_PATH};
use overglade_badge::display::{Epd2in66, HardwareBus, RefreshMode, WaveformLut};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Pause after a refresh before the panel is touched again
const SETTLE: Duration = Duration::from_millis(2000);

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "overglade-badge")]
#[command(about = "E-Paper name badge for the Waveshare 2.66\" panel")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Directory holding overglade.bmp and image.bmp
    #[arg(short, long, default_value = ".")]
    assets: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Clear display and exit
    #[arg(long)]
    clear: bool,

    /// Draw using the partial refresh waveform
    #[arg(long)]
    partial: bool,

    /// Show this text, fitted to the screen, instead of the badge
    #[arg(long)]
    text: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose);

    tracing::info!("Starting badge");

    let config = Config::load_or_default(&args.config);

    let bus = HardwareBus::new(&config.hardware.bus_config()).context("Failed to open display bus")?;
    let mut epd = Epd2in66::new(bus, WaveformLut::default());

    if args.clear {
        tracing::info!("Clearing display...");
        epd.init(RefreshMode::Full)?;
        epd.clear(Color::Background.fill_byte())?;
        epd.sleep()?;
        tracing::info!("Display cleared");
        return Ok(());
    }

    let mode = if args.partial {
        RefreshMode::Partial
    } else {
        RefreshMode::Full
    };
    epd.init(mode).context("Failed to initialize display")?;

    let mut frames = FramePair::new(epd.width() as u32, epd.height() as u32);
    let renderer = BadgeRenderer::new(&args.assets);
    match &args.text {
        Some(text) => {
            let block = renderer.render_text(&mut frames.landscape, text);
            tracing::info!("Text fitted at scale {} on {} line(s)", block.scale, block.lines.len());
        }
        None => renderer.render(&mut frames.landscape, config.identity().as_ref()),
    }

    epd.display_landscape(frames.landscape.as_bytes())
        .context("Failed to refresh display")?;

    std::thread::sleep(SETTLE);
    epd.init(RefreshMode::Full)?;
    std::thread::sleep(SETTLE);
    epd.sleep()?;

    tracing::info!("Badge shown, display asleep");
    Ok(())
}

/// Initialize tracing/logging
///
/// Default level is "warn"; use --verbose for "debug".
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("overglade_badge={}", level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
