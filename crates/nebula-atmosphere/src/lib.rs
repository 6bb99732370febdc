//! Physically based sky: radiance and transmittance for an observer inside a
//! planetary atmosphere.
//!
//! The crate is a handful of pure kernels feeding two precompute passes feeding
//! one hot evaluator:
//!
//! - [`Medium`] turns a position into scattering and extinction coefficients
//!   (Rayleigh, Mie, ozone), with [`ray_sphere_intersect`] and the phase
//!   functions alongside.
//! - [`TransmittanceTable`] stores transmittance to the top of the atmosphere
//!   per `(altitude, view zenith)`.
//! - [`MultiScatterTable`] stores the closed-form sum of all higher scattering
//!   orders per `(altitude, sun zenith)`, reading the transmittance table.
//! - [`evaluate`] ray-marches a view ray using both tables.
//!
//! [`Sky`] bundles parameters and tables for hosts that do not want to manage
//! them separately. Lengths are kilometres, coefficients are per kilometre.

mod day_night;
mod error;
mod evaluate;
mod intersect;
mod lut;
mod mapping;
mod medium;
mod multiscatter;
mod params;
mod phase;
mod sky;
mod transmittance;

pub use day_night::{DayNightClock, sun_direction_from_time, sun_elevation};
pub use error::AtmosphereError;
pub use evaluate::{SampleRequest, SampleResult, evaluate, evaluate_in};
pub use intersect::{
    SphereHit, distance_to_top_boundary, ground_hit_distance, hits_ground, ray_sphere_intersect,
};
pub use lut::{Lut2d, LutSize, texel_to_unit, unit_to_texel};
pub use mapping::{MultiScatterMapping, TransmittanceMapping};
pub use medium::{Medium, MediumSample, UniformMedium};
pub use multiscatter::{
    MAX_TRANSFER_FACTOR, MultiScatterSettings, MultiScatterTable, build_multiscatter_table,
};
pub use params::{AtmosphereParameters, HorizonFade, LutSettings};
pub use phase::{ISOTROPIC_PHASE, mie_phase_hg, rayleigh_phase};
pub use sky::Sky;
pub use transmittance::{
    DEFAULT_TRANSMITTANCE_STEPS, TransmittanceTable, build_transmittance_table,
};
