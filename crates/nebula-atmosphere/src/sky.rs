//! An atmosphere together with its precomputed tables.

use std::time::Instant;

use tracing::{info, warn};

use crate::error::AtmosphereError;
use crate::evaluate::{SampleRequest, SampleResult, evaluate};
use crate::lut::LutSize;
use crate::multiscatter::{MultiScatterSettings, MultiScatterTable};
use crate::params::{AtmosphereParameters, LutSettings};
use crate::transmittance::TransmittanceTable;

/// Parameters, settings, and both tables built from them.
///
/// Only a change of physical constants or table settings requires a rebuild;
/// camera and sun changes only affect [`SampleRequest`]s.
#[derive(Clone, Debug)]
pub struct Sky {
    params: AtmosphereParameters,
    settings: LutSettings,
    transmittance: TransmittanceTable,
    multiscatter: MultiScatterTable,
}

impl Sky {
    /// Validate `params` and build both tables.
    pub fn new(params: AtmosphereParameters, settings: LutSettings) -> Result<Self, AtmosphereError> {
        if let Err(err) = params.validate() {
            warn!(%err, "rejected atmosphere parameters");
            return Err(err);
        }

        let start = Instant::now();
        let transmittance = TransmittanceTable::build(
            &params,
            &params,
            LutSize::new(settings.transmittance_width, settings.transmittance_height)?,
            settings.transmittance_steps,
        )?;
        let transmittance_elapsed = start.elapsed();

        // The transmittance table is complete here; the second stage may read all of it.
        let multiscatter = MultiScatterTable::build(
            &params,
            &params,
            &transmittance,
            MultiScatterSettings {
                size: LutSize::new(settings.multiscatter_width, settings.multiscatter_height)?,
                directions_per_axis: settings.multiscatter_directions_per_axis,
                steps: settings.multiscatter_steps,
            },
        )?;

        info!(
            transmittance_ms = transmittance_elapsed.as_secs_f64() * 1000.0,
            total_ms = start.elapsed().as_secs_f64() * 1000.0,
            "built atmosphere lookup tables"
        );

        Ok(Self {
            params,
            settings,
            transmittance,
            multiscatter,
        })
    }

    /// Rebuild if `params` or `settings` differ from the current ones.
    ///
    /// Returns `Ok(true)` when the tables were rebuilt. On error the sky is
    /// left untouched.
    pub fn update(
        &mut self,
        params: AtmosphereParameters,
        settings: LutSettings,
    ) -> Result<bool, AtmosphereError> {
        if params == self.params && settings == self.settings {
            return Ok(false);
        }
        *self = Self::new(params, settings)?;
        Ok(true)
    }

    /// Evaluate one sample. `request.steps` of 0 uses the configured step count.
    pub fn evaluate(&self, request: &SampleRequest) -> SampleResult {
        let mut request = *request;
        if request.steps == 0 {
            request.steps = self.settings.evaluate_steps;
        }
        evaluate(&self.params, &self.transmittance, &self.multiscatter, &request)
    }

    pub fn params(&self) -> &AtmosphereParameters {
        &self.params
    }

    pub fn settings(&self) -> &LutSettings {
        &self.settings
    }

    pub fn transmittance(&self) -> &TransmittanceTable {
        &self.transmittance
    }

    pub fn multiscatter(&self) -> &MultiScatterTable {
        &self.multiscatter
    }
}
