//! Per-sample sky evaluation: the runtime hot path.
//!
//! Reads the two immutable tables and nothing else, so any number of threads
//! may evaluate concurrently without coordination.

use glam::Vec3;

use crate::intersect::{ground_hit_distance, hits_ground, ray_sphere_intersect};
use crate::medium::Medium;
use crate::multiscatter::{MIN_EXTINCTION, MultiScatterTable};
use crate::params::AtmosphereParameters;
use crate::phase::{mie_phase_hg, rayleigh_phase};
use crate::transmittance::TransmittanceTable;

/// Limb darkening coefficient of the sun disc.
const LIMB_DARKENING: f32 = 0.6;

/// Inputs of one evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleRequest {
    /// Planet-centric camera position.
    pub camera_position: Vec3,
    /// Unit view direction.
    pub view_direction: Vec3,
    /// Unit direction toward the sun.
    pub sun_direction: Vec3,
    /// Illuminance of the sun outside the atmosphere.
    pub sun_intensity: f32,
    /// Ray-march steps along the view ray.
    pub steps: u32,
    /// Add the sun disc when it lies in the view direction.
    pub sun_disc: bool,
}

/// Result of one evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleResult {
    /// Radiance scattered toward the camera, plus the sun disc if requested.
    pub radiance: Vec3,
    /// Transmittance along the view ray, in `[0, 1]`.
    pub transmittance: Vec3,
}

impl SampleResult {
    /// Nothing scattered, nothing absorbed.
    pub const EMPTY: Self = Self {
        radiance: Vec3::ZERO,
        transmittance: Vec3::ONE,
    };
}

/// Evaluate the sky for `request` in the atmosphere described by `params`.
pub fn evaluate(
    params: &AtmosphereParameters,
    transmittance: &TransmittanceTable,
    multiscatter: &MultiScatterTable,
    request: &SampleRequest,
) -> SampleResult {
    evaluate_in(params, params, transmittance, multiscatter, request)
}

/// Like [`evaluate`], but marching through an arbitrary `medium`.
///
/// Geometry (ground and boundary radii, sun size) still comes from `params`.
pub fn evaluate_in<M: Medium>(
    medium: &M,
    params: &AtmosphereParameters,
    transmittance: &TransmittanceTable,
    multiscatter: &MultiScatterTable,
    request: &SampleRequest,
) -> SampleResult {
    let view_dir = request.view_direction;
    let sun_dir = request.sun_direction;
    let camera = lift_above_ground(params, request.camera_position);

    let mut result = SampleResult::EMPTY;

    if let Some(bounds) = march_bounds(params, camera, view_dir) {
        let (t_start, t_end) = bounds;
        let cos_theta = view_dir.dot(sun_dir);
        let phase_rayleigh = rayleigh_phase(cos_theta);
        let phase_mie = mie_phase_hg(cos_theta, params.mie_asymmetry);

        let steps = request.steps.max(1);
        let dt = (t_end - t_start) / steps as f32;
        let mut throughput = Vec3::ONE;
        let mut radiance = Vec3::ZERO;

        for i in 0..steps {
            let t = t_start + (i as f32 + 0.5) * dt;
            let position = camera + view_dir * t;
            let sample = medium.sample(position);

            let r = position.length();
            let mu_s = if r > 0.0 { position.dot(sun_dir) / r } else { 1.0 };

            let sun_transmittance = transmittance.lookup(r, mu_s);
            let multi_scattered = multiscatter.lookup(r, mu_s);
            let shadow = if hits_ground(position, sun_dir, params.ground_radius) {
                0.0
            } else {
                1.0
            };

            let single = (sample.rayleigh_scattering * phase_rayleigh
                + sample.mie_scattering * phase_mie)
                * sun_transmittance
                * shadow;
            let multi = multi_scattered * sample.scattering();
            let source = (single + multi) * request.sun_intensity;

            let extinction = sample.extinction.max(Vec3::splat(MIN_EXTINCTION));
            let step_transmittance = (-extinction * dt).exp();
            radiance += throughput * source * (Vec3::ONE - step_transmittance) / extinction;
            throughput *= step_transmittance;
        }

        result = SampleResult {
            radiance,
            transmittance: throughput,
        };
    }

    if request.sun_disc {
        result.radiance += sun_disc(params, camera, view_dir, sun_dir, request.sun_intensity)
            * result.transmittance;
    }

    result
}

/// Move a camera that is under the surface up to `min_sample_altitude`.
fn lift_above_ground(params: &AtmosphereParameters, camera: Vec3) -> Vec3 {
    let floor = params.ground_radius + params.min_sample_altitude;
    let r = camera.length();
    if r >= params.ground_radius {
        camera
    } else if r > 0.0 {
        camera * (floor / r)
    } else {
        Vec3::new(0.0, floor, 0.0)
    }
}

/// `(t_start, t_end)` of the view ray inside the atmosphere, cut at the ground.
fn march_bounds(params: &AtmosphereParameters, camera: Vec3, view_dir: Vec3) -> Option<(f32, f32)> {
    let hit = ray_sphere_intersect(camera, view_dir, params.top_radius)?;
    if hit.far <= 0.0 {
        return None;
    }
    let t_start = hit.near.max(0.0);
    let mut t_end = hit.far;
    if let Some(t_ground) = ground_hit_distance(camera, view_dir, params.ground_radius)
        && t_ground < t_end
    {
        t_end = t_ground;
    }
    (t_end > t_start).then_some((t_start, t_end))
}

/// Unattenuated radiance of the sun disc seen along `view_dir`.
fn sun_disc(
    params: &AtmosphereParameters,
    camera: Vec3,
    view_dir: Vec3,
    sun_dir: Vec3,
    sun_intensity: f32,
) -> Vec3 {
    let cos_angle = view_dir.dot(sun_dir).clamp(-1.0, 1.0);
    let cos_radius = params.sun_angular_radius.cos();
    if cos_angle < cos_radius || hits_ground(camera, sun_dir, params.ground_radius) {
        return Vec3::ZERO;
    }

    let offset = cos_angle.acos() / params.sun_angular_radius;
    let limb = 1.0 - LIMB_DARKENING * (1.0 - (1.0 - offset * offset).max(0.0).sqrt());
    Vec3::splat(sun_intensity * params.sun_disc_multiplier * limb)
}
