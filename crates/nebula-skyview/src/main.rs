//! Renders equirectangular sky panoramas to Radiance `.hdr` files, one per day/night clock frame.

mod error;
mod panorama;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use nebula_atmosphere::{DayNightClock, Sky, sun_direction_from_time, sun_elevation};
use nebula_config::{CliArgs, SkyConfig, TimeConfig};
use tracing::{error, info};

use crate::error::SkyviewError;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let Some(config_dir) = args
        .config
        .clone()
        .or_else(|| dirs::config_dir().map(|dir| dir.join("nebula-sky")))
    else {
        eprintln!("Failed to resolve config directory, pass --config");
        return ExitCode::FAILURE;
    };

    // Load or create config, then apply CLI overrides
    let mut config = SkyConfig::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        SkyConfig::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    nebula_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config) {
        Ok(outputs) => {
            info!(frames = outputs.len(), "sky panoramas written");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(%err, "sky render failed");
            ExitCode::FAILURE
        }
    }
}

/// Build the sky once, then render and write one panorama per scheduled frame.
fn run(config: &SkyConfig) -> Result<Vec<PathBuf>, SkyviewError> {
    let sky = Sky::new(config.atmosphere, config.luts)?;
    let noon_elevation = config.time.noon_elevation_degrees.to_radians();
    let output = PathBuf::from(&config.view.output);
    let schedule = frame_schedule(&config.time);

    let mut written = Vec::with_capacity(schedule.len());
    for (frame, time_of_day) in schedule.iter().copied().enumerate() {
        let sun_direction = sun_direction_from_time(time_of_day, noon_elevation);
        info!(
            frame,
            hours = time_of_day * 24.0,
            sun_elevation_deg = sun_elevation(sun_direction).to_degrees(),
            "sun position"
        );

        let start = Instant::now();
        let panorama = panorama::render(&sky, &config.view, sun_direction)?;
        info!(
            width = panorama.width(),
            height = panorama.height(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "rendered panorama"
        );

        let path = frame_output_path(&output, frame, schedule.len());
        panorama.write_hdr(&path)?;
        info!(path = %path.display(), "sky panorama written");
        written.push(path);
    }
    Ok(written)
}

/// Time of day of every frame, ticking the day/night clock between frames.
fn frame_schedule(time: &TimeConfig) -> Vec<f64> {
    let mut clock = DayNightClock::at(time.time_of_day, time.day_duration_seconds);
    clock.paused = time.paused;
    (0..time.frames.max(1))
        .map(|_| {
            let time_of_day = clock.time_of_day;
            clock.tick(time.frame_interval_seconds);
            time_of_day
        })
        .collect()
}

/// `output` itself for a single frame, otherwise `stem_NNNN.ext` beside it.
fn frame_output_path(output: &Path, frame: usize, frames: usize) -> PathBuf {
    if frames <= 1 {
        return output.to_path_buf();
    }
    let stem = output
        .file_stem()
        .map_or_else(|| "sky".into(), |stem| stem.to_string_lossy());
    let extension = output
        .extension()
        .map_or_else(|| "hdr".into(), |ext| ext.to_string_lossy());
    output.with_file_name(format!("{stem}_{frame:04}.{extension}"))
}

#[cfg(test)]
mod tests {
    use nebula_atmosphere::LutSettings;

    use super::*;

    #[test]
    fn test_run_writes_configured_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SkyConfig::default();
        config.luts = LutSettings {
            transmittance_width: 32,
            transmittance_height: 16,
            multiscatter_width: 8,
            multiscatter_height: 8,
            multiscatter_directions_per_axis: 4,
            evaluate_steps: 8,
            ..LutSettings::default()
        };
        config.view.width = 16;
        config.view.height = 8;
        config.view.output = dir.path().join("dusk.hdr").display().to_string();
        config.time.time_of_day = 0.74;

        let outputs = run(&config).unwrap();
        assert_eq!(outputs.len(), 1);
        assert!(outputs[0].exists());
    }

    #[test]
    fn test_run_writes_one_file_per_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SkyConfig::default();
        config.luts = LutSettings {
            transmittance_width: 16,
            transmittance_height: 8,
            multiscatter_width: 4,
            multiscatter_height: 4,
            multiscatter_directions_per_axis: 2,
            evaluate_steps: 4,
            ..LutSettings::default()
        };
        config.view.width = 8;
        config.view.height = 4;
        config.view.output = dir.path().join("timelapse.hdr").display().to_string();
        config.time.frames = 3;

        let outputs = run(&config).unwrap();
        assert_eq!(
            outputs,
            vec![
                dir.path().join("timelapse_0000.hdr"),
                dir.path().join("timelapse_0001.hdr"),
                dir.path().join("timelapse_0002.hdr"),
            ]
        );
        assert!(outputs.iter().all(|path| path.exists()));
    }

    #[test]
    fn test_frame_schedule_ticks_clock() {
        let time = TimeConfig {
            time_of_day: 0.3,
            day_duration_seconds: 240.0,
            frames: 4,
            frame_interval_seconds: 60.0,
            ..TimeConfig::default()
        };
        let schedule = frame_schedule(&time);
        let expected = [0.3, 0.55, 0.8, 0.05];
        assert_eq!(schedule.len(), expected.len());
        for (got, want) in schedule.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{schedule:?}");
        }
    }

    #[test]
    fn test_paused_schedule_holds_time() {
        let time = TimeConfig {
            time_of_day: 0.6,
            frames: 3,
            paused: true,
            ..TimeConfig::default()
        };
        assert_eq!(frame_schedule(&time), vec![0.6, 0.6, 0.6]);
    }

    #[test]
    fn test_zero_frames_still_renders_one() {
        let time = TimeConfig {
            frames: 0,
            ..TimeConfig::default()
        };
        assert_eq!(frame_schedule(&time).len(), 1);
    }

    #[test]
    fn test_frame_output_paths() {
        let output = Path::new("renders/sky.hdr");
        assert_eq!(frame_output_path(output, 0, 1), PathBuf::from("renders/sky.hdr"));
        assert_eq!(
            frame_output_path(output, 7, 10),
            PathBuf::from("renders/sky_0007.hdr")
        );
    }

    #[test]
    fn test_run_reports_invalid_atmosphere() {
        let mut config = SkyConfig::default();
        config.atmosphere.top_radius = config.atmosphere.ground_radius - 1.0;
        assert!(matches!(run(&config), Err(SkyviewError::Atmosphere(_))));
    }
}
