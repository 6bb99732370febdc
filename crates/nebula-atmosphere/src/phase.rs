//! Angular scattering distributions.

use std::f32::consts::PI;

/// Rayleigh phase function.
pub fn rayleigh_phase(cos_theta: f32) -> f32 {
    3.0 / (16.0 * PI) * (1.0 + cos_theta * cos_theta)
}

/// Henyey-Greenstein phase function with asymmetry `g`.
pub fn mie_phase_hg(cos_theta: f32, g: f32) -> f32 {
    let g2 = g * g;
    let denom = (1.0 + g2 - 2.0 * g * cos_theta).max(1e-6);
    (1.0 - g2) / (4.0 * PI * denom * denom.sqrt())
}

/// Phase function of an isotropic medium.
pub const ISOTROPIC_PHASE: f32 = 1.0 / (4.0 * PI);

#[cfg(test)]
mod tests {
    use super::*;

    /// Integrate a phase function over the sphere with the midpoint rule in cos θ.
    fn integrate(phase: impl Fn(f32) -> f32) -> f32 {
        let n = 4096;
        let d = 2.0 / n as f32;
        (0..n)
            .map(|i| {
                let cos_theta = -1.0 + (i as f32 + 0.5) * d;
                phase(cos_theta) * 2.0 * PI * d
            })
            .sum()
    }

    #[test]
    fn test_rayleigh_normalized() {
        assert!((integrate(rayleigh_phase) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_hg_normalized() {
        assert!((integrate(|c| mie_phase_hg(c, 0.5)) - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_hg_zero_asymmetry_is_isotropic() {
        for c in [-1.0, -0.3, 0.0, 0.4, 1.0] {
            assert!((mie_phase_hg(c, 0.0) - ISOTROPIC_PHASE).abs() < 1e-6);
        }
    }

    #[test]
    fn test_hg_forward_peaked() {
        let g = 0.8;
        assert!(mie_phase_hg(1.0, g) > 100.0 * mie_phase_hg(-1.0, g));
    }

    #[test]
    fn test_rayleigh_symmetric() {
        assert_eq!(rayleigh_phase(0.6), rayleigh_phase(-0.6));
        assert!(rayleigh_phase(1.0) > rayleigh_phase(0.0));
    }
}
