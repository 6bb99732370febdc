//! Physical constants describing a planetary atmosphere.
//!
//! All lengths are in kilometres and every coefficient is per kilometre.
//! Positions handed to the rest of the crate are planet-centric, with the
//! planet centre at the origin.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::AtmosphereError;

/// Soft terminator applied to the earth-shadow term of the multi-scatter pass.
///
/// The factor is `saturate(cos_sun_zenith * scale + bias)`. Both constants are
/// tuned by eye rather than derived.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorizonFade {
    pub scale: f32,
    pub bias: f32,
}

impl HorizonFade {
    /// Fade factor in `[0, 1]` for the given local cosine of the sun zenith angle.
    pub fn factor(&self, cos_sun_zenith: f32) -> f32 {
        (cos_sun_zenith * self.scale + self.bias).clamp(0.0, 1.0)
    }
}

impl Default for HorizonFade {
    fn default() -> Self {
        Self {
            scale: 10.0,
            bias: 0.1,
        }
    }
}

/// Immutable description of one atmosphere.
///
/// Every table builder and the evaluator take this explicitly, so several
/// configurations can coexist (and be tested) side by side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmosphereParameters {
    /// Planet surface radius.
    pub ground_radius: f32,
    /// Radius at which the atmosphere is considered to end.
    pub top_radius: f32,

    /// Rayleigh scattering at sea level (RGB).
    pub rayleigh_scattering: Vec3,
    /// Altitude over which Rayleigh density falls by a factor of e.
    pub rayleigh_scale_height: f32,

    /// Mie scattering at sea level (RGB).
    pub mie_scattering: Vec3,
    /// Mie absorption at sea level (RGB).
    pub mie_absorption: Vec3,
    /// Altitude over which Mie density falls by a factor of e.
    pub mie_scale_height: f32,
    /// Henyey-Greenstein asymmetry factor, in `(-1, 1)`.
    pub mie_asymmetry: f32,

    /// Ozone absorption at the centre of the layer (RGB).
    pub ozone_absorption: Vec3,
    /// Altitude of peak ozone density.
    pub ozone_center_altitude: f32,
    /// Distance from the peak at which ozone density reaches zero.
    pub ozone_half_width: f32,

    /// Angular radius of the sun disc, in radians.
    pub sun_angular_radius: f32,
    /// Average surface albedo, used for the ground bounce of multi-scattering.
    pub ground_albedo: Vec3,
    /// Lowest altitude the medium is ever sampled at.
    pub min_sample_altitude: f32,
    /// Terminator softness for the multi-scatter earth shadow.
    pub horizon_fade: HorizonFade,
    /// Radiance multiplier applied to the visible sun disc.
    pub sun_disc_multiplier: f32,
}

impl AtmosphereParameters {
    /// Earth, after Hillaire 2020 (Table 1).
    pub fn earth() -> Self {
        Self {
            ground_radius: 6360.0,
            top_radius: 6460.0,
            rayleigh_scattering: Vec3::new(5.802e-3, 13.558e-3, 33.1e-3),
            rayleigh_scale_height: 8.0,
            mie_scattering: Vec3::splat(3.996e-3),
            mie_absorption: Vec3::splat(0.444e-3),
            mie_scale_height: 1.2,
            mie_asymmetry: 0.8,
            ozone_absorption: Vec3::new(0.650e-3, 1.881e-3, 0.085e-3),
            ozone_center_altitude: 25.0,
            ozone_half_width: 15.0,
            sun_angular_radius: 0.004_65,
            ground_albedo: Vec3::splat(0.3),
            min_sample_altitude: 0.01,
            horizon_fade: HorizonFade::default(),
            sun_disc_multiplier: 1000.0,
        }
    }

    /// Thickness of the atmosphere shell.
    pub fn atmosphere_height(&self) -> f32 {
        self.top_radius - self.ground_radius
    }

    /// Check that the constants describe a usable atmosphere.
    pub fn validate(&self) -> Result<(), AtmosphereError> {
        let scalars = [
            ("ground_radius", self.ground_radius),
            ("top_radius", self.top_radius),
            ("rayleigh_scale_height", self.rayleigh_scale_height),
            ("mie_scale_height", self.mie_scale_height),
            ("mie_asymmetry", self.mie_asymmetry),
            ("ozone_center_altitude", self.ozone_center_altitude),
            ("ozone_half_width", self.ozone_half_width),
            ("sun_angular_radius", self.sun_angular_radius),
            ("min_sample_altitude", self.min_sample_altitude),
            ("horizon_fade.scale", self.horizon_fade.scale),
            ("horizon_fade.bias", self.horizon_fade.bias),
            ("sun_disc_multiplier", self.sun_disc_multiplier),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(AtmosphereError::invalid(name, "must be finite"));
            }
        }

        let coefficients = [
            ("rayleigh_scattering", self.rayleigh_scattering),
            ("mie_scattering", self.mie_scattering),
            ("mie_absorption", self.mie_absorption),
            ("ozone_absorption", self.ozone_absorption),
            ("ground_albedo", self.ground_albedo),
        ];
        for (name, value) in coefficients {
            if !value.is_finite() || value.min_element() < 0.0 {
                return Err(AtmosphereError::invalid(
                    name,
                    "components must be finite and non-negative",
                ));
            }
        }

        if self.ground_radius <= 0.0 {
            return Err(AtmosphereError::invalid("ground_radius", "must be positive"));
        }
        if self.top_radius <= self.ground_radius {
            return Err(AtmosphereError::invalid(
                "top_radius",
                "must be greater than ground_radius",
            ));
        }
        if self.rayleigh_scale_height <= 0.0 {
            return Err(AtmosphereError::invalid(
                "rayleigh_scale_height",
                "must be positive",
            ));
        }
        if self.mie_scale_height <= 0.0 {
            return Err(AtmosphereError::invalid("mie_scale_height", "must be positive"));
        }
        if self.ozone_half_width <= 0.0 {
            return Err(AtmosphereError::invalid("ozone_half_width", "must be positive"));
        }
        if self.mie_asymmetry.abs() >= 1.0 {
            return Err(AtmosphereError::invalid(
                "mie_asymmetry",
                "must lie strictly inside (-1, 1)",
            ));
        }
        if self.min_sample_altitude <= 0.0 || self.min_sample_altitude >= self.atmosphere_height()
        {
            return Err(AtmosphereError::invalid(
                "min_sample_altitude",
                "must be positive and below the top of the atmosphere",
            ));
        }
        if self.sun_angular_radius <= 0.0 {
            return Err(AtmosphereError::invalid("sun_angular_radius", "must be positive"));
        }
        Ok(())
    }
}

impl Default for AtmosphereParameters {
    fn default() -> Self {
        Self::earth()
    }
}

/// Resolutions and step counts for the two precomputed tables and the evaluator.
///
/// None of these are physically motivated; they trade precision for build and
/// evaluation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LutSettings {
    /// Transmittance table width (view zenith axis).
    pub transmittance_width: u32,
    /// Transmittance table height (altitude axis).
    pub transmittance_height: u32,
    /// March steps per transmittance texel.
    pub transmittance_steps: u32,
    /// Multi-scatter table width (sun zenith axis).
    pub multiscatter_width: u32,
    /// Multi-scatter table height (altitude axis).
    pub multiscatter_height: u32,
    /// Directions per axis of the stratified sphere; `K * K` rays per texel.
    pub multiscatter_directions_per_axis: u32,
    /// March steps per multi-scatter ray.
    pub multiscatter_steps: u32,
    /// March steps per evaluated sample.
    pub evaluate_steps: u32,
}

impl Default for LutSettings {
    fn default() -> Self {
        Self {
            transmittance_width: 256,
            transmittance_height: 64,
            transmittance_steps: 40,
            multiscatter_width: 32,
            multiscatter_height: 32,
            multiscatter_directions_per_axis: 8,
            multiscatter_steps: 20,
            evaluate_steps: 32,
        }
    }
}
