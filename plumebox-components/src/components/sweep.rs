//! Parameter sweeps over the steady-state plume solution.
//!
//! Serial loops evaluating [`PlumeBoxComponent::steady_state`] across
//! forcing arrays, for sensitivity studies and melt rate maps.

use crate::components::melt::freezing_point;
use crate::components::plume::PlumeBoxComponent;
use crate::parameters::PlumeParameters;
use ndarray::{Array1, Array2};
use plumebox_core::timeseries::FloatValue;

/// Steady-state response to a range of subglacial discharges.
#[derive(Debug, Clone)]
pub struct DischargeSensitivity {
    /// The swept discharges (m^3/s)
    pub discharge: Array1<FloatValue>,
    /// Basal melt rate (m/yr)
    pub melt_rate: Array1<FloatValue>,
    /// Plume salinity (g/kg)
    pub salinity: Array1<FloatValue>,
    /// Plume temperature (degC)
    pub temperature: Array1<FloatValue>,
    /// Total outflow (m^3/s)
    pub overturning: Array1<FloatValue>,
}

/// Evaluate the steady state for each discharge in `discharges`, holding
/// the ambient ocean state fixed.
pub fn discharge_sensitivity(
    parameters: &PlumeParameters,
    ambient_temperature: FloatValue,
    ambient_salinity: FloatValue,
    discharges: &Array1<FloatValue>,
) -> DischargeSensitivity {
    let component = PlumeBoxComponent::from_parameters(parameters.clone());
    let n = discharges.len();

    let mut sensitivity = DischargeSensitivity {
        discharge: discharges.clone(),
        melt_rate: Array1::zeros(n),
        salinity: Array1::zeros(n),
        temperature: Array1::zeros(n),
        overturning: Array1::zeros(n),
    };

    for (index, &discharge) in discharges.iter().enumerate() {
        let state = component.steady_state(ambient_temperature, ambient_salinity, discharge);

        sensitivity.melt_rate[index] = state.melt_rate();
        sensitivity.salinity[index] = state.salinity;
        sensitivity.temperature[index] = state.temperature;
        sensitivity.overturning[index] = state.overturning;
    }

    sensitivity
}

/// Steady-state basal melt rate (m/yr) over an ambient temperature x
/// salinity grid.
///
/// Row `i` corresponds to `temperatures[i]` and column `j` to
/// `salinities[j]`. Ambient water colder than the local freezing point at
/// the ice base cannot exist; those grid points are marked NaN instead of
/// being evaluated.
pub fn melt_rate_map(
    parameters: &PlumeParameters,
    salinities: &Array1<FloatValue>,
    temperatures: &Array1<FloatValue>,
    discharge: FloatValue,
) -> Array2<FloatValue> {
    let component = PlumeBoxComponent::from_parameters(parameters.clone());
    let mut map = Array2::zeros((temperatures.len(), salinities.len()));

    for (i, &temperature) in temperatures.iter().enumerate() {
        for (j, &salinity) in salinities.iter().enumerate() {
            map[[i, j]] = if temperature < freezing_point(salinity, parameters.ice_base_depth) {
                FloatValue::NAN
            } else {
                component
                    .steady_state(temperature, salinity, discharge)
                    .melt_rate()
            };
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn fast_parameters() -> PlumeParameters {
        PlumeParameters {
            n_iterations: 400,
            ..Default::default()
        }
    }

    #[test]
    fn discharge_sensitivity_covers_the_sweep() {
        let discharges = array![0.0, 250.0, 500.0, 1000.0];
        let sensitivity = discharge_sensitivity(&fast_parameters(), 0.5, 34.5, &discharges);

        assert_eq!(sensitivity.melt_rate.len(), 4);
        assert!(sensitivity.melt_rate.iter().all(|rate| rate.is_finite()));

        // More discharge freshens the plume
        assert!(sensitivity
            .salinity
            .windows(2)
            .into_iter()
            .all(|pair| pair[1] < pair[0]));
    }

    #[test]
    fn map_shape_matches_the_grid() {
        let salinities = array![34.0, 34.5, 35.0];
        let temperatures = array![-1.0, 0.0];
        let map = melt_rate_map(&fast_parameters(), &salinities, &temperatures, 500.0);

        assert_eq!(map.dim(), (2, 3));
    }
}
