//! Configuration for the sky renderer.
//!
//! Atmosphere constants, lookup table settings, view and time settings persist
//! to disk as a RON file. Supports CLI overrides via clap, hot-reload detection,
//! and forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CONFIG_FILE_NAME, DebugConfig, SkyConfig, TimeConfig, ViewConfig};
pub use error::ConfigError;
