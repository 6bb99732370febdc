//! Isotropic higher-order scattering, summed in closed form.
//!
//! Each texel holds `L_2nd / (1 - f_ms)`: the second-order radiance reaching a
//! point from a uniformly lit sphere of directions, divided by the geometric
//! series over all further scattering orders. The table is low frequency, so a
//! coarse grid and a linear mapping are enough.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use tracing::debug;

use crate::error::AtmosphereError;
use crate::intersect::{ground_hit_distance, hits_ground, ray_sphere_intersect};
use crate::lut::{Lut2d, LutSize};
use crate::mapping::MultiScatterMapping;
use crate::medium::Medium;
use crate::params::AtmosphereParameters;
use crate::transmittance::TransmittanceTable;

/// Upper clamp on the transfer factor so the series `1 / (1 - f_ms)` converges.
pub const MAX_TRANSFER_FACTOR: f32 = 0.99;

/// Floor applied to extinction in the analytic step integral.
pub(crate) const MIN_EXTINCTION: f32 = 1e-6;

/// How densely each multi-scatter texel is integrated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MultiScatterSettings {
    pub size: LutSize,
    /// The sphere is sampled with `directions_per_axis²` stratified rays.
    pub directions_per_axis: u32,
    /// March steps along each ray.
    pub steps: u32,
}

/// Precomputed multi-scattering indexed by `(cos sun zenith, altitude)`.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiScatterTable {
    lut: Lut2d,
    mapping: MultiScatterMapping,
}

impl MultiScatterTable {
    /// Integrate every texel through `medium`.
    ///
    /// `transmittance` must be complete before this is called; texels read it
    /// freely but never read each other.
    pub fn build<M: Medium>(
        medium: &M,
        params: &AtmosphereParameters,
        transmittance: &TransmittanceTable,
        settings: MultiScatterSettings,
    ) -> Result<Self, AtmosphereError> {
        if settings.directions_per_axis == 0 {
            return Err(AtmosphereError::ZeroSteps {
                name: "multiscatter_directions_per_axis",
            });
        }
        if settings.steps == 0 {
            return Err(AtmosphereError::ZeroSteps {
                name: "multiscatter_steps",
            });
        }
        debug!(
            width = settings.size.width(),
            height = settings.size.height(),
            directions = settings.directions_per_axis * settings.directions_per_axis,
            steps = settings.steps,
            "building multi-scatter table"
        );

        let mapping = MultiScatterMapping::new(params);
        let lut = Lut2d::par_from_fn(settings.size, |x, y| {
            let (u, v) = settings.size.texel_to_unit(x, y);
            let (mu_s, r) = mapping.coords_to_params(u, v);
            let position = Vec3::new(0.0, r, 0.0);
            let sun_dir = Vec3::new((1.0 - mu_s * mu_s).max(0.0).sqrt(), mu_s, 0.0);
            integrate_texel(medium, params, transmittance, position, sun_dir, &settings)
        });

        Ok(Self { lut, mapping })
    }

    /// Multi-scattered radiance at radius `r` for a sun at zenith cosine `mu_s`.
    pub fn lookup(&self, r: f32, mu_s: f32) -> Vec3 {
        let (u, v) = self.mapping.params_to_coords(mu_s, r);
        self.lut.sample(u, v)
    }

    pub fn lut(&self) -> &Lut2d {
        &self.lut
    }

    pub fn mapping(&self) -> &MultiScatterMapping {
        &self.mapping
    }
}

/// Build the table for the atmosphere described by `params`.
pub fn build_multiscatter_table(
    params: &AtmosphereParameters,
    transmittance: &TransmittanceTable,
    width: u32,
    height: u32,
    directions_per_axis: u32,
    inner_steps: u32,
) -> Result<MultiScatterTable, AtmosphereError> {
    let settings = MultiScatterSettings {
        size: LutSize::new(width, height)?,
        directions_per_axis,
        steps: inner_steps,
    };
    MultiScatterTable::build(params, params, transmittance, settings)
}

/// Uniformly distributed direction for stratum `(i, j)` of a `k * k` grid.
pub(crate) fn stratified_sphere_direction(i: u32, j: u32, k: u32) -> Vec3 {
    let azimuth = TAU * (i as f32 + 0.5) / k as f32;
    let cos_polar = 1.0 - 2.0 * (j as f32 + 0.5) / k as f32;
    let sin_polar = (1.0 - cos_polar * cos_polar).max(0.0).sqrt();
    Vec3::new(
        sin_polar * azimuth.cos(),
        cos_polar,
        sin_polar * azimuth.sin(),
    )
}

/// Sunlight reaching `position`, softened across the terminator.
fn earth_shadow(params: &AtmosphereParameters, position: Vec3, sun_dir: Vec3) -> f32 {
    if hits_ground(position, sun_dir, params.ground_radius) {
        return 0.0;
    }
    let r = position.length();
    let cos_sun_zenith = if r > 0.0 {
        position.dot(sun_dir) / r
    } else {
        1.0
    };
    params.horizon_fade.factor(cos_sun_zenith)
}

fn integrate_texel<M: Medium>(
    medium: &M,
    params: &AtmosphereParameters,
    transmittance: &TransmittanceTable,
    position: Vec3,
    sun_dir: Vec3,
    settings: &MultiScatterSettings,
) -> Vec3 {
    let k = settings.directions_per_axis;
    let mut second_order = Vec3::ZERO;
    let mut transfer = Vec3::ZERO;

    for i in 0..k {
        for j in 0..k {
            let dir = stratified_sphere_direction(i, j, k);
            let (l, f) =
                march_direction(medium, params, transmittance, position, dir, sun_dir, settings);
            second_order += l;
            transfer += f;
        }
    }

    // Solid angle (4π) and isotropic phase (1/4π) cancel, leaving a plain mean.
    let weight = 1.0 / (k * k) as f32;
    second_order *= weight;
    transfer *= weight;

    second_order / (Vec3::ONE - transfer.clamp(Vec3::ZERO, Vec3::splat(MAX_TRANSFER_FACTOR)))
}

/// Returns `(L_2nd, f_ms)` contributions of one direction.
fn march_direction<M: Medium>(
    medium: &M,
    params: &AtmosphereParameters,
    transmittance: &TransmittanceTable,
    origin: Vec3,
    dir: Vec3,
    sun_dir: Vec3,
    settings: &MultiScatterSettings,
) -> (Vec3, Vec3) {
    let t_top = ray_sphere_intersect(origin, dir, params.top_radius)
        .map_or(0.0, |hit| hit.far.max(0.0));
    let t_ground = ground_hit_distance(origin, dir, params.ground_radius);
    let t_max = t_ground.map_or(t_top, |t| t.min(t_top));
    if t_max <= 0.0 && t_ground.is_none() {
        return (Vec3::ZERO, Vec3::ZERO);
    }

    let dt = t_max / settings.steps as f32;
    let mut throughput = Vec3::ONE;
    let mut second_order = Vec3::ZERO;
    let mut transfer = Vec3::ZERO;

    for step in 0..settings.steps {
        let t = (step as f32 + 0.5) * dt;
        let sample_pos = origin + dir * t;
        let sample = medium.sample(sample_pos);

        let extinction = sample.extinction.max(Vec3::splat(MIN_EXTINCTION));
        let step_transmittance = (-extinction * dt).exp();
        let integral = (Vec3::ONE - step_transmittance) / extinction;
        let scattering = sample.scattering();

        let sun_transmittance = transmittance.lookup_toward(sample_pos, sun_dir);
        let shadow = earth_shadow(params, sample_pos, sun_dir);

        second_order += throughput * scattering * sun_transmittance * shadow * integral;
        transfer += throughput * scattering * integral;
        throughput *= step_transmittance;
    }

    // Light bounced once off a diffuse ground.
    if let Some(t) = t_ground
        && t <= t_top
    {
        let ground_pos = origin + dir * t;
        let normal = ground_pos.normalize_or_zero();
        let n_dot_l = normal.dot(sun_dir).clamp(0.0, 1.0);
        if n_dot_l > 0.0 {
            let sun_transmittance = transmittance.lookup(params.ground_radius, n_dot_l);
            second_order +=
                throughput * sun_transmittance * n_dot_l * params.ground_albedo / PI;
        }
    }

    (second_order, transfer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transmittance::build_transmittance_table;

    fn tables(params: &AtmosphereParameters) -> (TransmittanceTable, MultiScatterTable) {
        let transmittance = build_transmittance_table(params, 64, 16).unwrap();
        let multiscatter = build_multiscatter_table(params, &transmittance, 16, 16, 8, 20).unwrap();
        (transmittance, multiscatter)
    }

    #[test]
    fn test_all_texels_finite_and_non_negative() {
        let (_, table) = tables(&AtmosphereParameters::earth());
        for value in table.lut().texels() {
            assert!(value.is_finite(), "non-finite texel {value}");
            assert!(value.min_element() >= 0.0, "negative texel {value}");
        }
    }

    #[test]
    fn test_boundary_texels_are_finite() {
        let params = AtmosphereParameters::earth();
        let (_, table) = tables(&params);
        let size = table.lut().size();
        for (x, y) in [
            (0, 0),
            (size.width() - 1, 0),
            (0, size.height() - 1),
            (size.width() - 1, size.height() - 1),
        ] {
            let value = table.lut().texel(x, y);
            assert!(value.is_finite() && value.min_element() >= 0.0);
        }
        // The bottom row sits exactly on the ground and the edge columns on cos = ±1.
        assert!(table.lookup(params.ground_radius, 1.0).is_finite());
        assert!(table.lookup(params.ground_radius, -1.0).is_finite());
    }

    #[test]
    fn test_sun_overhead_brighter_than_sun_below() {
        let params = AtmosphereParameters::earth();
        let (_, table) = tables(&params);
        let day = table.lookup(params.ground_radius + 1.0, 1.0);
        let night = table.lookup(params.ground_radius + 1.0, -1.0);
        assert!(day.z > 0.0);
        assert!(night.max_element() < day.min_element() * 1e-2, "{night} vs {day}");
    }

    #[test]
    fn test_ground_row_matches_one_metre_up() {
        let params = AtmosphereParameters::earth();
        let transmittance = build_transmittance_table(&params, 64, 16).unwrap();
        let settings = MultiScatterSettings {
            size: LutSize::new(16, 16).unwrap(),
            directions_per_axis: 8,
            steps: 20,
        };
        let at = |r: f32| {
            integrate_texel(
                &params,
                &params,
                &transmittance,
                Vec3::new(0.0, r, 0.0),
                Vec3::Y,
                &settings,
            )
        };

        let on_ground = at(params.ground_radius);
        let lifted = at(params.ground_radius + 0.001);
        let diff = ((on_ground - lifted) / lifted).abs().max_element();
        assert!(diff < 0.02, "ground {on_ground} vs one metre up {lifted}");
    }

    #[test]
    fn test_downward_ray_from_ground_only_bounces() {
        let params = AtmosphereParameters::earth();
        let transmittance = build_transmittance_table(&params, 64, 16).unwrap();
        let settings = MultiScatterSettings {
            size: LutSize::new(4, 4).unwrap(),
            directions_per_axis: 4,
            steps: 20,
        };
        let origin = Vec3::new(0.0, params.ground_radius, 0.0);
        let (second_order, transfer) = march_direction(
            &params,
            &params,
            &transmittance,
            origin,
            -Vec3::Y,
            Vec3::Y,
            &settings,
        );
        assert_eq!(transfer, Vec3::ZERO);
        let expected = transmittance.lookup(params.ground_radius, 1.0) * params.ground_albedo / PI;
        assert!((second_order - expected).abs().max_element() < 1e-6);
    }

    #[test]
    fn test_transfer_factor_clamped_for_dense_medium() {
        // A scattering-only medium this thick would push f_ms past 1.
        let params = AtmosphereParameters::earth();
        let transmittance = build_transmittance_table(&params, 16, 8).unwrap();
        let dense = crate::medium::UniformMedium {
            rayleigh_scattering: Vec3::splat(5.0),
            mie_scattering: Vec3::ZERO,
            extinction: Vec3::splat(5.0),
        };
        let settings = MultiScatterSettings {
            size: LutSize::new(4, 4).unwrap(),
            directions_per_axis: 4,
            steps: 8,
        };
        let table = MultiScatterTable::build(&dense, &params, &transmittance, settings).unwrap();
        for value in table.lut().texels() {
            assert!(value.is_finite() && value.min_element() >= 0.0);
        }
    }

    #[test]
    fn test_stratified_directions_cover_sphere() {
        let k = 8;
        let mut mean = Vec3::ZERO;
        for i in 0..k {
            for j in 0..k {
                let dir = stratified_sphere_direction(i, j, k);
                assert!((dir.length() - 1.0).abs() < 1e-5);
                mean += dir;
            }
        }
        assert!((mean / (k * k) as f32).length() < 1e-5);
    }

    #[test]
    fn test_zero_directions_rejected() {
        let params = AtmosphereParameters::earth();
        let transmittance = build_transmittance_table(&params, 8, 8).unwrap();
        assert!(build_multiscatter_table(&params, &transmittance, 8, 8, 0, 20).is_err());
        assert!(build_multiscatter_table(&params, &transmittance, 8, 8, 8, 0).is_err());
        assert!(build_multiscatter_table(&params, &transmittance, 0, 8, 8, 20).is_err());
    }
}
