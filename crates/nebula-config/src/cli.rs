//! Command-line argument parsing for the sky viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::SkyConfig;

/// Sky viewer command-line arguments.
///
/// CLI values override settings loaded from `sky.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "nebula-skyview", about = "Render a physically based sky panorama")]
pub struct CliArgs {
    /// Output image width in pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Output image height in pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Camera altitude above the ground in kilometres.
    #[arg(long)]
    pub altitude: Option<f32>,

    /// Time of day, 0.0 = midnight, 0.5 = noon.
    #[arg(long)]
    pub time_of_day: Option<f64>,

    /// Number of frames to render, advancing the day/night clock between them.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Real-time seconds between frames.
    #[arg(long)]
    pub frame_interval: Option<f64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output image path (`.hdr`).
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl SkyConfig {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.view.width = w;
        }
        if let Some(h) = args.height {
            self.view.height = h;
        }
        if let Some(altitude) = args.altitude {
            self.view.camera_altitude_km = altitude;
        }
        if let Some(t) = args.time_of_day {
            self.time.time_of_day = t.rem_euclid(1.0);
        }
        if let Some(frames) = args.frames {
            self.time.frames = frames;
        }
        if let Some(interval) = args.frame_interval {
            self.time.frame_interval_seconds = interval;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref output) = args.output {
            self.view.output = output.display().to_string();
        }
    }
}
