//! Two-dimensional RGB lookup tables with bilinear, edge-clamped sampling.
//!
//! Texel `i` of an axis with `n` texels sits at unit coordinate `i / (n - 1)`,
//! so the first and last texels land exactly on the parameter bounds and a
//! lookup at a texel's own coordinate returns that texel unchanged.

use glam::Vec3;
use rayon::prelude::*;

use crate::error::AtmosphereError;

/// Validated, non-zero table dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LutSize {
    width: u32,
    height: u32,
}

impl LutSize {
    pub fn new(width: u32, height: u32) -> Result<Self, AtmosphereError> {
        if width == 0 || height == 0 {
            return Err(AtmosphereError::ZeroLutSize { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of texels.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Always `false`; a `LutSize` cannot be built with a zero dimension.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Unit coordinates of texel `(x, y)`.
    pub fn texel_to_unit(&self, x: u32, y: u32) -> (f32, f32) {
        (
            texel_to_unit(x, self.width),
            texel_to_unit(y, self.height),
        )
    }
}

/// Unit coordinate of texel `index` along an axis of `count` texels.
pub fn texel_to_unit(index: u32, count: u32) -> f32 {
    if count <= 1 {
        0.0
    } else {
        index as f32 / (count - 1) as f32
    }
}

/// Continuous texel coordinate of unit coordinate `unit` along an axis of `count` texels.
pub fn unit_to_texel(unit: f32, count: u32) -> f32 {
    if count <= 1 {
        0.0
    } else {
        unit.clamp(0.0, 1.0) * (count - 1) as f32
    }
}

/// Immutable grid of RGB values, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Lut2d {
    size: LutSize,
    texels: Vec<Vec3>,
}

impl Lut2d {
    /// Fill every texel from `f(x, y)`, one rayon task per texel.
    ///
    /// Texels never read each other, so no synchronisation is needed beyond
    /// the join at the end of the parallel collect.
    pub fn par_from_fn<F>(size: LutSize, f: F) -> Self
    where
        F: Fn(u32, u32) -> Vec3 + Sync,
    {
        let width = size.width;
        let texels = (0..size.len())
            .into_par_iter()
            .map(|index| {
                let x = (index % width as usize) as u32;
                let y = (index / width as usize) as u32;
                f(x, y)
            })
            .collect();
        Self { size, texels }
    }

    /// Table with every texel set to `value`.
    pub fn filled(size: LutSize, value: Vec3) -> Self {
        Self {
            size,
            texels: vec![value; size.len()],
        }
    }

    pub fn size(&self) -> LutSize {
        self.size
    }

    /// Raw texels in row-major order, for uploading to whatever storage a host uses.
    pub fn texels(&self) -> &[Vec3] {
        &self.texels
    }

    /// Texel `(x, y)`, clamped to the table edges.
    pub fn texel(&self, x: u32, y: u32) -> Vec3 {
        let x = x.min(self.size.width - 1) as usize;
        let y = y.min(self.size.height - 1) as usize;
        self.texels[y * self.size.width as usize + x]
    }

    /// Bilinear lookup at unit coordinates, clamped to the edges.
    pub fn sample(&self, u: f32, v: f32) -> Vec3 {
        let fx = unit_to_texel(u, self.size.width);
        let fy = unit_to_texel(v, self.size.height);

        let x0 = fx.floor() as u32;
        let y0 = fy.floor() as u32;
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let top = self.texel(x0, y0).lerp(self.texel(x0 + 1, y0), tx);
        let bottom = self.texel(x0, y0 + 1).lerp(self.texel(x0 + 1, y0 + 1), tx);
        top.lerp(bottom, ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Lut2d {
        let size = LutSize::new(4, 3).unwrap();
        Lut2d::par_from_fn(size, |x, y| Vec3::new(x as f32, y as f32, (x * 10 + y) as f32))
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            LutSize::new(0, 4),
            Err(AtmosphereError::ZeroLutSize {
                width: 0,
                height: 4
            })
        ));
        assert!(LutSize::new(4, 0).is_err());
    }

    #[test]
    fn test_par_from_fn_is_row_major() {
        let lut = gradient();
        assert_eq!(lut.texels().len(), 12);
        assert_eq!(lut.texels()[5], Vec3::new(1.0, 1.0, 11.0));
        assert_eq!(lut.texel(3, 2), Vec3::new(3.0, 2.0, 32.0));
    }

    #[test]
    fn test_sample_at_texel_returns_texel() {
        let lut = gradient();
        for y in 0..3 {
            for x in 0..4 {
                let (u, v) = lut.size().texel_to_unit(x, y);
                let diff = (lut.sample(u, v) - lut.texel(x, y)).abs().max_element();
                assert!(diff < 1e-5, "texel ({x}, {y}) off by {diff}");
            }
        }
    }

    #[test]
    fn test_sample_interpolates_between_texels() {
        let lut = gradient();
        // Halfway between x = 1 and x = 2, on row 0.
        let value = lut.sample(0.5, 0.0);
        assert!((value.x - 1.5).abs() < 1e-5);
        assert!((value.y - 0.0).abs() < 1e-5);
    }

    #[test]
    fn test_sample_clamps_outside_unit_square() {
        let lut = gradient();
        assert_eq!(lut.sample(-3.0, -1.0), lut.texel(0, 0));
        assert_eq!(lut.sample(7.0, 2.0), lut.texel(3, 2));
    }

    #[test]
    fn test_single_texel_axis() {
        let size = LutSize::new(1, 1).unwrap();
        let lut = Lut2d::filled(size, Vec3::ONE);
        assert_eq!(lut.size().texel_to_unit(0, 0), (0.0, 0.0));
        assert_eq!(lut.sample(0.7, 0.2), Vec3::ONE);
    }
}
