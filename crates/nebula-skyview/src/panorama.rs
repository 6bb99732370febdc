//! Equirectangular sky panorama rendered one sample per pixel.

use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use glam::Vec3;
use image::Rgb;
use image::codecs::hdr::HdrEncoder;
use nebula_atmosphere::{SampleRequest, Sky};
use nebula_config::ViewConfig;
use rayon::prelude::*;
use tracing::debug;

use crate::error::SkyviewError;

/// Linear radiance, row-major, top row looking straight up.
#[derive(Clone, Debug)]
pub struct Panorama {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
}

impl Panorama {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Vec3 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Write the raw radiance as a Radiance `.hdr` file.
    pub fn write_hdr(&self, path: &Path) -> Result<(), SkyviewError> {
        let create_error = |source| SkyviewError::CreateOutput {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(create_error)?;
        }
        let file = File::create(path).map_err(create_error)?;

        let rgb: Vec<Rgb<f32>> = self.pixels.iter().map(|p| Rgb(p.to_array())).collect();
        HdrEncoder::new(BufWriter::new(file)).encode(
            &rgb,
            self.width as usize,
            self.height as usize,
        )?;
        debug!(path = %path.display(), "wrote panorama");
        Ok(())
    }
}

/// Local view direction through the centre of pixel `(x, y)`.
///
/// Columns sweep the full azimuth starting north (+Z) through east (+X);
/// rows run from the zenith down to the nadir.
pub fn view_direction(x: u32, y: u32, width: u32, height: u32) -> Vec3 {
    let azimuth = (x as f32 + 0.5) / width as f32 * TAU;
    let elevation = FRAC_PI_2 - (y as f32 + 0.5) / height as f32 * PI;
    Vec3::new(
        elevation.cos() * azimuth.sin(),
        elevation.sin(),
        elevation.cos() * azimuth.cos(),
    )
}

/// Evaluate `sky` for every pixel of the panorama described by `view`.
pub fn render(sky: &Sky, view: &ViewConfig, sun_direction: Vec3) -> Result<Panorama, SkyviewError> {
    let (width, height) = (view.width, view.height);
    if width == 0 || height == 0 {
        return Err(SkyviewError::EmptyImage { width, height });
    }

    let camera_position = Vec3::new(
        0.0,
        sky.params().ground_radius + view.camera_altitude_km,
        0.0,
    );
    let mut pixels = vec![Vec3::ZERO; width as usize * height as usize];

    pixels
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                let request = SampleRequest {
                    camera_position,
                    view_direction: view_direction(x as u32, y as u32, width, height),
                    sun_direction,
                    sun_intensity: view.sun_intensity,
                    steps: 0,
                    sun_disc: view.sun_disc,
                };
                *pixel = sky.evaluate(&request).radiance;
            }
        });

    Ok(Panorama {
        width,
        height,
        pixels,
    })
}
