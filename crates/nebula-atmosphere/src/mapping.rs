//! Parameter <-> table coordinate mappings, both directions side by side.
//!
//! The table generators walk texels and need `coords_to_params`; every lookup
//! needs `params_to_coords`. The two must be exact analytic inverses of each
//! other: any drift shows up as banding in the sky rather than as an error, so
//! both directions live here and nowhere else.

use crate::intersect::distance_to_top_boundary;
use crate::params::AtmosphereParameters;

/// Below this the mappings treat a length as zero.
const DEGENERATE_EPSILON: f32 = 1e-6;

/// Bruneton-style mapping for the transmittance table.
///
/// `x_r` is the horizontal distance to the horizon normalised by its value at
/// the top of the atmosphere; `x_mu` is the distance to the top boundary
/// normalised between its minimum (straight up) and maximum (grazing the
/// horizon) at that height. This spends most texels near the horizon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransmittanceMapping {
    ground_radius: f32,
    top_radius: f32,
    /// Distance to the horizon from the top of the atmosphere.
    horizon_at_top: f32,
}

impl TransmittanceMapping {
    pub fn new(params: &AtmosphereParameters) -> Self {
        let (ground, top) = (params.ground_radius, params.top_radius);
        Self {
            ground_radius: ground,
            top_radius: top,
            horizon_at_top: ((top - ground) * (top + ground)).max(0.0).sqrt(),
        }
    }

    fn horizon_distance(&self, r: f32) -> f32 {
        ((r - self.ground_radius) * (r + self.ground_radius))
            .max(0.0)
            .sqrt()
    }

    /// `(view radius, cos view zenith)` to `(x_mu, x_r)` in `[0, 1]²`.
    pub fn params_to_coords(&self, r: f32, mu: f32) -> (f32, f32) {
        let r = r.clamp(self.ground_radius, self.top_radius);
        let mu = mu.clamp(-1.0, 1.0);
        let rho = self.horizon_distance(r);

        let d = distance_to_top_boundary(r, mu, self.top_radius);
        let d_min = self.top_radius - r;
        let d_max = rho + self.horizon_at_top;

        let x_mu = ratio(d - d_min, d_max - d_min);
        let x_r = ratio(rho, self.horizon_at_top);
        (x_mu, x_r)
    }

    /// `(x_mu, x_r)` to `(view radius, cos view zenith)`.
    pub fn coords_to_params(&self, x_mu: f32, x_r: f32) -> (f32, f32) {
        let x_mu = x_mu.clamp(0.0, 1.0);
        let x_r = x_r.clamp(0.0, 1.0);

        let rho = self.horizon_at_top * x_r;
        let r = (rho * rho + self.ground_radius * self.ground_radius)
            .sqrt()
            .clamp(self.ground_radius, self.top_radius);

        let d_min = self.top_radius - r;
        let d_max = rho + self.horizon_at_top;
        let d = d_min + x_mu * (d_max - d_min);

        let mu = if d < DEGENERATE_EPSILON {
            1.0
        } else {
            // (H² - rho² - d²) / (2 r d), with H² - rho² = top² - r².
            let top_sq_minus_r_sq = (self.top_radius - r) * (self.top_radius + r);
            ((top_sq_minus_r_sq - d * d) / (2.0 * r * d)).clamp(-1.0, 1.0)
        };
        (r, mu)
    }
}

/// Linear mapping for the multi-scatter table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MultiScatterMapping {
    ground_radius: f32,
    top_radius: f32,
}

impl MultiScatterMapping {
    pub fn new(params: &AtmosphereParameters) -> Self {
        Self {
            ground_radius: params.ground_radius,
            top_radius: params.top_radius,
        }
    }

    /// `(cos sun zenith, radius)` to `(u, v)` in `[0, 1]²`.
    pub fn params_to_coords(&self, mu_s: f32, r: f32) -> (f32, f32) {
        let u = (mu_s.clamp(-1.0, 1.0) + 1.0) * 0.5;
        let v = ratio(
            r.clamp(self.ground_radius, self.top_radius) - self.ground_radius,
            self.top_radius - self.ground_radius,
        );
        (u, v)
    }

    /// `(u, v)` to `(cos sun zenith, radius)`.
    pub fn coords_to_params(&self, u: f32, v: f32) -> (f32, f32) {
        let mu_s = (u.clamp(0.0, 1.0) * 2.0 - 1.0).clamp(-1.0, 1.0);
        let r = self.ground_radius + v.clamp(0.0, 1.0) * (self.top_radius - self.ground_radius);
        (mu_s, r)
    }
}

/// `num / den` clamped to `[0, 1]`, or 0 when the range has collapsed.
fn ratio(num: f32, den: f32) -> f32 {
    if den.abs() < DEGENERATE_EPSILON {
        0.0
    } else {
        (num / den).clamp(0.0, 1.0)
    }
}
