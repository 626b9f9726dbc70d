//! Plume box component
//!
//! A zero-dimensional steady-state model of the buoyant meltwater layer
//! under a floating ice tongue. The layer is treated as a single well-mixed
//! box of volume $V = A D$ which entrains ambient ocean water, receives
//! fresh subglacial discharge at the grounding line and meltwater from the
//! three-equation basal melt closure, and exports the combined outflow.
//!
//! With entrainment $Q_e$, discharge $Q_d$, meltwater $Q_m$ and outflow
//! $Q = Q_e + Q_d + Q_m$ (volume conservation), the salt and heat balances
//! are iterated to a fixed point with an implicit-style update
//! ($r = \Delta t / V$):
//!
//! $$ S_{k+1} = \frac{S_k + r Q_e S_a}{1 + r Q} $$
//! $$ T_{k+1} = \frac{T_k + r (Q_e T_a + Q_d T_d + Q_m T_m)}{1 + r Q} $$
//!
//! Where:
//! - $(S_a, T_a)$ is the ambient ocean state
//! - $T_d$ is the pressure melting point at the grounding line
//! - $T_m = T_b - L / c_w$ is the effective meltwater temperature, which
//!   folds the latent heat sink into the inflow
//!
//! A fixed number of iterations is performed. There is no convergence check
//! and no stability guard; inadmissible forcing propagates NaN.

use crate::components::melt::freezing_point;
use crate::constants::{LATENT_HEAT, SEAWATER_HEAT_CAPACITY, SECONDS_PER_YEAR};
use crate::parameters::PlumeParameters;
use ndarray::Array1;
use plumebox_core::component::{Component, InputState, OutputState, RequirementDefinition};
use plumebox_core::errors::PlumeboxResult;
use plumebox_core::timeseries::{FloatValue, Time};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Variable name constants
pub const VAR_AMBIENT_TEMPERATURE: &str = "Ambient Ocean Temperature";
pub const VAR_AMBIENT_SALINITY: &str = "Ambient Ocean Salinity";
pub const VAR_DISCHARGE: &str = "Subglacial Discharge";
pub const VAR_PLUME_TEMPERATURE: &str = "Plume Temperature";
pub const VAR_PLUME_SALINITY: &str = "Plume Salinity";
pub const VAR_BASAL_MELT_RATE: &str = "Basal Melt Rate";
pub const VAR_BASAL_MELT_FLUX: &str = "Basal Melt Flux";
pub const VAR_OVERTURNING: &str = "Overturning";

/// State of the plume box after an iteration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoxState {
    /// Plume salinity (g/kg)
    pub salinity: FloatValue,
    /// Plume temperature (degC)
    pub temperature: FloatValue,
    /// Melt velocity at the ice base (m/s)
    pub melt_velocity: FloatValue,
    /// Meltwater volume flux into the box (m^3/s)
    pub melt_flux: FloatValue,
    /// Total outflow from the box (m^3/s)
    pub overturning: FloatValue,
}

impl BoxState {
    /// Annual basal melt rate (m/yr).
    pub fn melt_rate(&self) -> FloatValue {
        self.melt_velocity * SECONDS_PER_YEAR
    }
}

/// Full iteration history of a box model run.
///
/// Each array holds one value per fixed-point iteration.
#[derive(Debug, Clone)]
pub struct BoxSolution {
    pub salinity: Array1<FloatValue>,
    pub temperature: Array1<FloatValue>,
    pub melt_velocity: Array1<FloatValue>,
    pub melt_flux: Array1<FloatValue>,
    pub overturning: Array1<FloatValue>,
}

impl BoxSolution {
    /// The state at the final iteration.
    pub fn final_state(&self) -> BoxState {
        let last = self.salinity.len() - 1;

        BoxState {
            salinity: self.salinity[last],
            temperature: self.temperature[last],
            melt_velocity: self.melt_velocity[last],
            melt_flux: self.melt_flux[last],
            overturning: self.overturning[last],
        }
    }
}

/// Plume box component
///
/// Inputs are the ambient ocean state below the ice tongue and the
/// subglacial discharge; outputs are the steady plume state, the basal melt
/// rate and flux, and the overturning (total outflow). Each model step
/// solves the steady state for the forcing at the start of the step, so
/// transient scenarios such as a warming Atlantic Inflow can be driven
/// through a model with exogenous timeseries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlumeBoxComponent {
    parameters: PlumeParameters,
}

impl PlumeBoxComponent {
    /// Create a new plume box component from parameters
    pub fn from_parameters(parameters: PlumeParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &PlumeParameters {
        &self.parameters
    }

    /// One fixed-point update of the plume state.
    ///
    /// The melt closure is evaluated for the incoming state, so the fluxes
    /// in the returned [`BoxState`] lag the updated salinity and temperature
    /// by one iteration. At the fixed point the distinction vanishes.
    fn iterate(
        &self,
        salinity: FloatValue,
        temperature: FloatValue,
        ambient_temperature: FloatValue,
        ambient_salinity: FloatValue,
        discharge: FloatValue,
    ) -> BoxState {
        let parameters = &self.parameters;
        let boundary =
            parameters
                .melt
                .basal_melt(temperature, salinity, parameters.ice_base_depth);

        // Volume fluxes; outflow balances the inflows exactly
        let entrainment = parameters.entrainment_flux();
        let melt_flux = boundary.melt_velocity * parameters.basal_area;
        let outflow = entrainment + discharge + melt_flux;

        // Source temperatures: discharge is fresh at the grounding line
        // pressure melting point, meltwater carries the latent heat sink
        let discharge_temperature = freezing_point(0.0, parameters.grounding_line_depth);
        let melt_temperature = boundary.temperature - LATENT_HEAT / SEAWATER_HEAT_CAPACITY;

        let r = parameters.timestep / parameters.volume();

        BoxState {
            salinity: (salinity + r * entrainment * ambient_salinity) / (1.0 + r * outflow),
            temperature: (temperature
                + r * (entrainment * ambient_temperature
                    + discharge * discharge_temperature
                    + melt_flux * melt_temperature))
                / (1.0 + r * outflow),
            melt_velocity: boundary.melt_velocity,
            melt_flux,
            overturning: outflow,
        }
    }

    /// Run the box model, recording every iterate.
    ///
    /// The plume starts as ambient water and is updated `n_iterations`
    /// times.
    pub fn solve_box(
        &self,
        ambient_temperature: FloatValue,
        ambient_salinity: FloatValue,
        discharge: FloatValue,
    ) -> BoxSolution {
        let n = self.parameters.n_iterations;
        let mut solution = BoxSolution {
            salinity: Array1::zeros(n),
            temperature: Array1::zeros(n),
            melt_velocity: Array1::zeros(n),
            melt_flux: Array1::zeros(n),
            overturning: Array1::zeros(n),
        };

        let mut salinity = ambient_salinity;
        let mut temperature = ambient_temperature;

        for index in 0..n {
            let state = self.iterate(
                salinity,
                temperature,
                ambient_temperature,
                ambient_salinity,
                discharge,
            );

            solution.salinity[index] = state.salinity;
            solution.temperature[index] = state.temperature;
            solution.melt_velocity[index] = state.melt_velocity;
            solution.melt_flux[index] = state.melt_flux;
            solution.overturning[index] = state.overturning;

            salinity = state.salinity;
            temperature = state.temperature;
        }

        solution
    }

    /// Run the box model, returning only the final iterate.
    ///
    /// Identical iteration to [`solve_box`](Self::solve_box) without the
    /// per-iteration arrays, for cheap evaluation across parameter sweeps.
    pub fn steady_state(
        &self,
        ambient_temperature: FloatValue,
        ambient_salinity: FloatValue,
        discharge: FloatValue,
    ) -> BoxState {
        let mut state = BoxState {
            salinity: ambient_salinity,
            temperature: ambient_temperature,
            melt_velocity: FloatValue::NAN,
            melt_flux: FloatValue::NAN,
            overturning: FloatValue::NAN,
        };

        for _ in 0..self.parameters.n_iterations {
            state = self.iterate(
                state.salinity,
                state.temperature,
                ambient_temperature,
                ambient_salinity,
                discharge,
            );
        }

        state
    }
}

#[typetag::serde]
impl Component for PlumeBoxComponent {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::scalar_input(VAR_AMBIENT_TEMPERATURE, "degC"),
            RequirementDefinition::scalar_input(VAR_AMBIENT_SALINITY, "g / kg"),
            RequirementDefinition::scalar_input(VAR_DISCHARGE, "m^3 / s"),
            RequirementDefinition::scalar_output(VAR_PLUME_TEMPERATURE, "degC"),
            RequirementDefinition::scalar_output(VAR_PLUME_SALINITY, "g / kg"),
            RequirementDefinition::scalar_output(VAR_BASAL_MELT_RATE, "m / yr"),
            RequirementDefinition::scalar_output(VAR_BASAL_MELT_FLUX, "m^3 / s"),
            RequirementDefinition::scalar_output(VAR_OVERTURNING, "m^3 / s"),
        ]
    }

    fn solve(
        &self,
        _t_current: Time,
        _t_next: Time,
        input_state: &InputState,
    ) -> PlumeboxResult<OutputState> {
        let ambient_temperature = input_state.get_latest(VAR_AMBIENT_TEMPERATURE);
        let ambient_salinity = input_state.get_latest(VAR_AMBIENT_SALINITY);
        let discharge = input_state.get_latest(VAR_DISCHARGE);

        let state = self.steady_state(ambient_temperature, ambient_salinity, discharge);

        Ok(HashMap::from([
            (VAR_PLUME_TEMPERATURE.to_string(), state.temperature),
            (VAR_PLUME_SALINITY.to_string(), state.salinity),
            (VAR_BASAL_MELT_RATE.to_string(), state.melt_rate()),
            (VAR_BASAL_MELT_FLUX.to_string(), state.melt_flux),
            (VAR_OVERTURNING.to_string(), state.overturning),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn component() -> PlumeBoxComponent {
        PlumeBoxComponent::from_parameters(PlumeParameters::default())
    }

    #[test]
    fn plume_is_fresher_and_colder_than_ambient() {
        let state = component().steady_state(0.5, 34.5, 500.0);

        assert!(state.salinity < 34.5);
        assert!(state.salinity > 0.0);
        assert!(state.temperature < 0.5);
    }

    #[test]
    fn outflow_balances_inflows() {
        let state = component().steady_state(0.5, 34.5, 500.0);
        let entrainment = component().parameters().entrainment_flux();

        assert_relative_eq!(
            state.overturning,
            entrainment + 500.0 + state.melt_flux,
            max_relative = 1e-12
        );
    }

    #[test]
    fn solution_records_every_iterate() {
        let component = component();
        let solution = component.solve_box(0.5, 34.5, 500.0);

        assert_eq!(
            solution.salinity.len(),
            component.parameters().n_iterations
        );
        // First iterate starts from ambient water
        assert!(solution.salinity[0] < 34.5);
        assert!(solution.salinity[0] > solution.salinity[100]);
    }

    #[test]
    fn definitions_cover_forcing_and_outputs() {
        let definitions = component().definitions();

        assert_eq!(definitions.len(), 8);
        assert_eq!(component().inputs().len(), 3);
        assert_eq!(component().outputs().len(), 5);
    }

    #[test]
    fn component_serialization_roundtrip() {
        let serialised = serde_json::to_string(&component()).unwrap();
        let deserialised: PlumeBoxComponent = serde_json::from_str(&serialised).unwrap();

        let expected = component().steady_state(0.5, 34.5, 500.0);
        let actual = deserialised.steady_state(0.5, 34.5, 500.0);
        assert_eq!(actual.salinity, expected.salinity);
        assert_eq!(actual.temperature, expected.temperature);
    }
}
