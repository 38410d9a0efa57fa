// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use edgecam::constants::timing;
use edgecam::{
    CaptureLoop, Config, FrameRelay, Orientation, Preview, RenderMode, TestPattern,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "edgecam")]
#[command(about = "Real-time camera frame relay and preview demo")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the synthetic capture pipeline and render a preview frame
    Demo {
        /// Number of frames to deliver before rendering
        #[arg(short, long, default_value = "30")]
        frames: u64,

        /// Capture frame width
        #[arg(long)]
        width: Option<u32>,

        /// Capture frame height
        #[arg(long)]
        height: Option<u32>,

        /// Render mode (raw-camera, edge-detection, grayscale, ...)
        #[arg(short, long)]
        mode: Option<RenderMode>,

        /// Quad orientation (normal, flipped, 90, 180, 270)
        #[arg(short = 'r', long)]
        orientation: Option<Orientation>,

        /// Write the rendered frame to this PNG file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the available render modes and orientations
    Modes,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=edgecam=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            frames,
            width,
            height,
            mode,
            orientation,
            output,
        } => run_demo(frames, width, height, mode, orientation, output),
        Commands::Modes => {
            list_modes();
            Ok(())
        }
    }
}

fn run_demo(
    frames: u64,
    width: Option<u32>,
    height: Option<u32>,
    mode: Option<RenderMode>,
    orientation: Option<Orientation>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let width = width.unwrap_or(config.frame_width);
    let height = height.unwrap_or(config.frame_height);
    let mode = mode.unwrap_or(config.render_mode);
    let orientation = orientation.unwrap_or(config.orientation);

    let relay = Arc::new(FrameRelay::with_thresholds(
        config.edge_low,
        config.edge_high,
    ));
    relay.controls().set_mode(mode);
    relay.controls().set_orientation(orientation);

    info!(
        width,
        height,
        mode = mode.display_name(),
        orientation = orientation.display_name(),
        "Starting capture loop"
    );
    let capture = CaptureLoop::start(
        relay.clone(),
        TestPattern::Gradient,
        width,
        height,
        timing::DEFAULT_FRAME_INTERVAL,
    );

    while relay.frames_delivered() < frames {
        std::thread::sleep(Duration::from_millis(5));
    }
    capture.stop();
    info!(frames = relay.frames_delivered(), "Capture finished");

    // A missing GPU disables rendering but the relay stays functional
    match Preview::new() {
        Ok(mut preview) => {
            preview.resize(width, height);
            let image = preview.render_to_image(relay.store(), relay.controls())?;
            info!(
                width = image.width,
                height = image.height,
                "Rendered preview frame"
            );
            if let Some(path) = output {
                save_png(&path, &image)?;
                info!(path = %path.display(), "Preview written");
            }
        }
        Err(e) => {
            error!(error = %e, "Rendering disabled, no GPU available");
        }
    }

    relay.teardown();
    Ok(())
}

fn save_png(
    path: &PathBuf,
    frame: &edgecam::PixelBuffer,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or("rendered frame has inconsistent dimensions")?;
    image.save(path)?;
    Ok(())
}

fn list_modes() {
    println!("Render modes:");
    for mode in RenderMode::ALL {
        println!("  {:<16} {}", format!("{:?}", mode.variant()), mode.display_name());
    }
    println!();
    println!("Orientations:");
    for orientation in Orientation::ALL {
        println!("  {}", orientation.display_name());
    }
}
