//! Transmittance from any point in the atmosphere to its outer boundary.

use glam::Vec3;
use tracing::debug;

use crate::error::AtmosphereError;
use crate::intersect::ray_sphere_intersect;
use crate::lut::{Lut2d, LutSize};
use crate::mapping::TransmittanceMapping;
use crate::medium::Medium;
use crate::params::AtmosphereParameters;

/// March steps per texel used by [`build_transmittance_table`].
pub const DEFAULT_TRANSMITTANCE_STEPS: u32 = 40;

/// Precomputed transmittance indexed by `(x_mu, x_r)`.
///
/// The march does not stop at the ground; callers that care about the planet
/// blocking the path test for it separately.
#[derive(Clone, Debug, PartialEq)]
pub struct TransmittanceTable {
    lut: Lut2d,
    mapping: TransmittanceMapping,
}

impl TransmittanceTable {
    /// March every texel through `medium`.
    pub fn build<M: Medium>(
        medium: &M,
        params: &AtmosphereParameters,
        size: LutSize,
        steps: u32,
    ) -> Result<Self, AtmosphereError> {
        if steps == 0 {
            return Err(AtmosphereError::ZeroSteps {
                name: "transmittance_steps",
            });
        }
        debug!(
            width = size.width(),
            height = size.height(),
            steps,
            "building transmittance table"
        );

        let mapping = TransmittanceMapping::new(params);
        let lut = Lut2d::par_from_fn(size, |x, y| {
            let (x_mu, x_r) = size.texel_to_unit(x, y);
            let (r, mu) = mapping.coords_to_params(x_mu, x_r);
            transmittance_to_top(medium, params, r, mu, steps)
        });

        Ok(Self { lut, mapping })
    }

    /// Transmittance from radius `r` along zenith cosine `mu`.
    pub fn lookup(&self, r: f32, mu: f32) -> Vec3 {
        let (x_mu, x_r) = self.mapping.params_to_coords(r, mu);
        self.lut.sample(x_mu, x_r)
    }

    /// Transmittance from a planet-centric `position` along a unit `direction`.
    pub fn lookup_toward(&self, position: Vec3, direction: Vec3) -> Vec3 {
        let r = position.length();
        let mu = if r > 0.0 {
            position.dot(direction) / r
        } else {
            1.0
        };
        self.lookup(r, mu)
    }

    pub fn lut(&self) -> &Lut2d {
        &self.lut
    }

    pub fn mapping(&self) -> &TransmittanceMapping {
        &self.mapping
    }
}

/// Build the table for the atmosphere described by `params`.
pub fn build_transmittance_table(
    params: &AtmosphereParameters,
    width: u32,
    height: u32,
) -> Result<TransmittanceTable, AtmosphereError> {
    TransmittanceTable::build(
        params,
        params,
        LutSize::new(width, height)?,
        DEFAULT_TRANSMITTANCE_STEPS,
    )
}

/// `exp(-∫ extinction)` from `(0, r, 0)` along `mu` to the atmosphere boundary.
fn transmittance_to_top<M: Medium>(
    medium: &M,
    params: &AtmosphereParameters,
    r: f32,
    mu: f32,
    steps: u32,
) -> Vec3 {
    let origin = Vec3::new(0.0, r, 0.0);
    let dir = Vec3::new((1.0 - mu * mu).max(0.0).sqrt(), mu, 0.0);

    let t_max = ray_sphere_intersect(origin, dir, params.top_radius)
        .map_or(0.0, |hit| hit.far.max(0.0));
    if t_max <= 0.0 {
        return Vec3::ONE;
    }

    let dt = t_max / steps as f32;
    let mut optical_depth = Vec3::ZERO;
    for i in 0..steps {
        let t = (i as f32 + 0.5) * dt;
        optical_depth += medium.sample(origin + dir * t).extinction * dt;
    }

    (-optical_depth).exp()
}
