//! Plume box model parameters.
//!
//! Defaults describe the ice tongue of the 79° North Glacier
//! (Nioghalvfjerdsbræen, north-east Greenland).

use plumebox_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters of the three-equation basal melt closure.
///
/// The closure balances heat and salt transfer across the ice-ocean boundary
/// layer against the latent heat and freshwater released by melting, with
/// the boundary layer held at the local freezing point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeltParameters {
    /// Thermal exchange velocity across the boundary layer (m/s).
    /// Default: 1.0e-4
    pub gamma_t: FloatValue,

    /// Haline exchange velocity across the boundary layer (m/s).
    /// Roughly `gamma_t / 35`, reflecting the slower diffusion of salt.
    /// Default: 2.9e-6
    pub gamma_s: FloatValue,
}

impl Default for MeltParameters {
    fn default() -> Self {
        Self {
            gamma_t: 1.0e-4,
            gamma_s: 2.9e-6,
        }
    }
}

/// Parameters of the zero-dimensional plume box.
///
/// The box represents the buoyant meltwater layer under the floating ice
/// tongue as a single well-mixed volume. Ambient water is entrained at a
/// prescribed velocity across the basal area, subglacial discharge enters
/// fresh at the grounding line, and meltwater is added by the basal melt
/// closure. The balance is iterated to a fixed point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlumeParameters {
    // Geometry
    /// Area of the ice tongue base in contact with the plume (m^2).
    /// Default: 2.0e9 (roughly 80 km x 25 km)
    pub basal_area: FloatValue,

    /// Thickness of the plume layer (m).
    /// Default: 20.0
    pub thickness: FloatValue,

    /// Depth of the ice tongue base (m, negative below sea level).
    /// Default: -300.0
    pub ice_base_depth: FloatValue,

    /// Depth of the grounding line (m, negative below sea level).
    /// Subglacial discharge enters at the pressure melting point of this
    /// depth.
    /// Default: -600.0
    pub grounding_line_depth: FloatValue,

    // Entrainment
    /// Entrainment velocity of ambient water into the plume (m/s).
    /// Default: 2.5e-5
    pub entrainment_velocity: FloatValue,

    // Iteration controls
    /// Number of fixed-point iterations.
    /// No convergence check is performed; the count must be large enough
    /// that the flushing timescale `volume / outflow` is well exceeded.
    /// Default: 1000
    pub n_iterations: usize,

    /// Pseudo time step of one fixed-point iteration (s).
    /// Default: 86400.0 (one day)
    pub timestep: FloatValue,

    /// Basal melt closure parameters.
    pub melt: MeltParameters,
}

impl Default for PlumeParameters {
    fn default() -> Self {
        Self {
            // Geometry
            basal_area: 2.0e9,
            thickness: 20.0,
            ice_base_depth: -300.0,
            grounding_line_depth: -600.0,

            // Entrainment
            entrainment_velocity: 2.5e-5,

            // Iteration
            n_iterations: 1000,
            timestep: 86400.0,

            melt: MeltParameters::default(),
        }
    }
}

impl PlumeParameters {
    /// Volume of the plume box (m^3).
    pub fn volume(&self) -> FloatValue {
        self.basal_area * self.thickness
    }

    /// Entrainment volume flux of ambient water into the box (m^3/s).
    pub fn entrainment_flux(&self) -> FloatValue {
        self.entrainment_velocity * self.basal_area
    }
}
