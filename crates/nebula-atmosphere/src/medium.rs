//! Participating medium: altitude to scattering and extinction coefficients.

use glam::Vec3;

use crate::params::AtmosphereParameters;

/// Coefficients of the medium at one point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MediumSample {
    pub rayleigh_scattering: Vec3,
    pub mie_scattering: Vec3,
    /// Absorption plus out-scattering of every species.
    pub extinction: Vec3,
}

impl MediumSample {
    /// Total scattering coefficient.
    pub fn scattering(&self) -> Vec3 {
        self.rayleigh_scattering + self.mie_scattering
    }
}

/// Anything that can be ray-marched.
pub trait Medium: Sync {
    /// Coefficients at a planet-centric `position`.
    fn sample(&self, position: Vec3) -> MediumSample;
}

impl AtmosphereParameters {
    /// Altitude of `position`, never below `min_sample_altitude`.
    ///
    /// Sampling at or under the surface makes the exponential densities blow up,
    /// and a single non-finite texel would spread into every sky sample that reads it.
    pub fn sample_altitude(&self, position: Vec3) -> f32 {
        (position.length() - self.ground_radius).max(self.min_sample_altitude)
    }
}

impl Medium for AtmosphereParameters {
    fn sample(&self, position: Vec3) -> MediumSample {
        let altitude = self.sample_altitude(position);

        let rayleigh_density = (-altitude / self.rayleigh_scale_height).exp();
        let mie_density = (-altitude / self.mie_scale_height).exp();
        let ozone_density =
            (1.0 - (altitude - self.ozone_center_altitude).abs() / self.ozone_half_width).max(0.0);

        let rayleigh_scattering = self.rayleigh_scattering * rayleigh_density;
        let mie_scattering = self.mie_scattering * mie_density;
        let mie_absorption = self.mie_absorption * mie_density;
        let ozone_absorption = self.ozone_absorption * ozone_density;

        MediumSample {
            rayleigh_scattering,
            mie_scattering,
            extinction: rayleigh_scattering + mie_scattering + mie_absorption + ozone_absorption,
        }
    }
}

/// Homogeneous medium with the same coefficients everywhere.
///
/// Useful wherever an integral has to be checked by hand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformMedium {
    pub rayleigh_scattering: Vec3,
    pub mie_scattering: Vec3,
    pub extinction: Vec3,
}

impl UniformMedium {
    /// Purely absorbing medium.
    pub fn absorbing(extinction: Vec3) -> Self {
        Self {
            rayleigh_scattering: Vec3::ZERO,
            mie_scattering: Vec3::ZERO,
            extinction,
        }
    }
}

impl Medium for UniformMedium {
    fn sample(&self, _position: Vec3) -> MediumSample {
        MediumSample {
            rayleigh_scattering: self.rayleigh_scattering,
            mie_scattering: self.mie_scattering,
            extinction: self.extinction,
        }
    }
}
