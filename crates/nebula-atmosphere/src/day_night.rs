//! Day/night cycle: in-game clock and the sun direction it implies.
//!
//! Time of day is normalised to `[0.0, 1.0)` where 0.0 is midnight, 0.25 is
//! dawn, 0.5 is noon and 0.75 is dusk. Directions are expressed in the local
//! frame of an observer on the +Y axis of the planet: +Y is up, +X is east.
//! Everything the sky looks like follows from the sun direction alone; the
//! tables never need rebuilding as the clock moves.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;

/// In-game time tracking for the day/night cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct DayNightClock {
    /// Current time of day, normalized `[0.0, 1.0)`. 0.0 = midnight, 0.5 = noon.
    pub time_of_day: f64,
    /// Duration of one full day in real-time seconds.
    pub day_duration_seconds: f64,
    /// Whether the cycle is paused.
    pub paused: bool,
}

impl DayNightClock {
    /// Create a new clock starting at noon.
    pub fn new(day_duration_seconds: f64) -> Self {
        Self::at(0.5, day_duration_seconds)
    }

    /// Create a clock at an arbitrary time of day.
    pub fn at(time_of_day: f64, day_duration_seconds: f64) -> Self {
        Self {
            time_of_day: time_of_day.rem_euclid(1.0),
            day_duration_seconds,
            paused: false,
        }
    }

    /// Advance the clock by `dt` real-time seconds.
    pub fn tick(&mut self, dt: f64) {
        if self.paused || self.day_duration_seconds <= 0.0 {
            return;
        }
        let day_fraction = dt / self.day_duration_seconds;
        self.time_of_day = (self.time_of_day + day_fraction).rem_euclid(1.0);
    }

    /// Convert time-of-day to hours (0–24 range).
    pub fn hours(&self) -> f64 {
        self.time_of_day * 24.0
    }
}

/// Sun direction for `time_of_day`, on an orbit culminating at `noon_elevation` radians.
///
/// With `noon_elevation = π/2` the sun passes straight overhead; lower values
/// tilt the orbit toward +Z, as seen from higher latitudes. The sun always
/// rises due east at 0.25 and sets due west at 0.75.
pub fn sun_direction_from_time(time_of_day: f64, noon_elevation: f32) -> Vec3 {
    let angle = (time_of_day.rem_euclid(1.0) as f32) * TAU;
    let elevation = noon_elevation.clamp(-FRAC_PI_2, FRAC_PI_2);
    let east = Vec3::X;
    let noon = Vec3::new(0.0, elevation.sin(), elevation.cos());
    (east * angle.sin() - noon * angle.cos()).normalize()
}

/// Elevation of `sun_direction` above the local horizon, in radians.
pub fn sun_elevation(sun_direction: Vec3) -> f32 {
    sun_direction.y.clamp(-1.0, 1.0).asin()
}
