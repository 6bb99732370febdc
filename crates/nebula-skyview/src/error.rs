use thiserror::Error;

use nebula_atmosphere::AtmosphereError;
use nebula_config::ConfigError;

/// Errors that stop a render.
#[derive(Debug, Error)]
pub enum SkyviewError {
    /// The configuration could not be loaded or saved.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The atmosphere parameters or table settings were rejected.
    #[error("atmosphere error: {0}")]
    Atmosphere(#[from] AtmosphereError),

    /// Width or height of the requested image is zero.
    #[error("image size {width}x{height} is empty")]
    EmptyImage { width: u32, height: u32 },

    /// The output file could not be created.
    #[error("failed to create {path}: {source}")]
    CreateOutput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Encoding the HDR image failed.
    #[error("image write error: {0}")]
    ImageWrite(#[from] image::ImageError),
}
