//! Three-equation basal melt closure.
//!
//! The closure balances three equations across the ice-ocean boundary layer:
//!
//! 1. Heat: $c_w \gamma_T (T - T_b) = v L$
//! 2. Salt: $\gamma_S (S - S_b) = v S_b$
//! 3. Liquidus: $T_b = \lambda_1 S_b + \lambda_2 + \lambda_3 z$
//!
//! Where:
//! - $(T, S)$ is the plume state next to the boundary layer
//! - $(T_b, S_b)$ is the boundary layer state
//! - $v$ is the melt velocity (m/s)
//! - $z$ is the depth of the ice base (m, negative below sea level)
//!
//! Eliminating $v$ and $T_b$ gives a quadratic in $S_b$ which is solved in
//! closed form. The ice is assumed to be at the melting point throughout, so
//! no heat is conducted into the ice.

use crate::constants::{
    LATENT_HEAT, LIQUIDUS_DEPTH_SLOPE, LIQUIDUS_OFFSET, LIQUIDUS_SALINITY_SLOPE,
    SEAWATER_HEAT_CAPACITY,
};
use crate::parameters::MeltParameters;
use plumebox_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// In-situ freezing point of seawater (degC).
///
/// Linear liquidus in salinity (g/kg) and depth (m, negative below sea
/// level).
pub fn freezing_point(salinity: FloatValue, depth: FloatValue) -> FloatValue {
    LIQUIDUS_SALINITY_SLOPE * salinity + LIQUIDUS_OFFSET + LIQUIDUS_DEPTH_SLOPE * depth
}

/// State of the ice-ocean boundary layer returned by the melt closure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundaryLayer {
    /// Boundary layer salinity (g/kg)
    pub salinity: FloatValue,
    /// Boundary layer temperature, on the freezing line (degC)
    pub temperature: FloatValue,
    /// Melt velocity (m/s, positive for melting)
    pub melt_velocity: FloatValue,
}

impl MeltParameters {
    /// Coefficients of the boundary salinity quadratic
    /// $a S_b^2 + b S_b + c = 0$.
    ///
    /// Substituting the salt balance and the liquidus into the heat balance
    /// gives
    /// $a = c_w \gamma_T \lambda_1$,
    /// $b = -c_w \gamma_T (T - \lambda_2 - \lambda_3 z) - L \gamma_S$,
    /// $c = L \gamma_S S$.
    ///
    /// `a` is negative and `c` is non-negative, so the roots straddle zero
    /// and the minus branch of the quadratic formula is the physical,
    /// non-negative one whatever the sign of `b`.
    pub fn quadratic_coefficients(
        &self,
        temperature: FloatValue,
        salinity: FloatValue,
        depth: FloatValue,
    ) -> (FloatValue, FloatValue, FloatValue) {
        let a = SEAWATER_HEAT_CAPACITY * self.gamma_t * LIQUIDUS_SALINITY_SLOPE;
        let b = -SEAWATER_HEAT_CAPACITY
            * self.gamma_t
            * (temperature - LIQUIDUS_OFFSET - LIQUIDUS_DEPTH_SLOPE * depth)
            - LATENT_HEAT * self.gamma_s;
        let c = LATENT_HEAT * self.gamma_s * salinity;

        (a, b, c)
    }

    /// Solve the three-equation closure for the given plume state.
    ///
    /// There is no guard against a zero boundary salinity or a negative
    /// discriminant; inadmissible inputs propagate NaN.
    pub fn basal_melt(
        &self,
        temperature: FloatValue,
        salinity: FloatValue,
        depth: FloatValue,
    ) -> BoundaryLayer {
        let (a, b, c) = self.quadratic_coefficients(temperature, salinity, depth);

        let discriminant = b * b - 4.0 * a * c;
        let boundary_salinity = (-b - discriminant.sqrt()) / (2.0 * a);

        let boundary_temperature = freezing_point(boundary_salinity, depth);
        let melt_velocity = self.gamma_s * (salinity - boundary_salinity) / boundary_salinity;

        BoundaryLayer {
            salinity: boundary_salinity,
            temperature: boundary_temperature,
            melt_velocity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn freezing_point_surface_fresh_water() {
        assert_relative_eq!(freezing_point(0.0, 0.0), LIQUIDUS_OFFSET);
    }

    #[test]
    fn freezing_point_decreases_with_salinity_and_depth() {
        let surface = freezing_point(34.5, 0.0);
        assert!(surface < 0.0);
        assert!(freezing_point(35.0, 0.0) < surface);
        assert!(freezing_point(34.5, -300.0) < surface);
    }

    #[test]
    fn closure_sits_on_the_freezing_line() {
        let parameters = MeltParameters::default();
        let boundary = parameters.basal_melt(0.5, 34.5, -300.0);

        assert_relative_eq!(
            boundary.temperature,
            freezing_point(boundary.salinity, -300.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn closure_satisfies_heat_and_salt_balances() {
        let parameters = MeltParameters::default();
        let (temperature, salinity, depth) = (1.0, 34.8, -300.0);
        let boundary = parameters.basal_melt(temperature, salinity, depth);

        // Heat: c_w gamma_t (T - T_b) = v L
        assert_relative_eq!(
            SEAWATER_HEAT_CAPACITY * parameters.gamma_t * (temperature - boundary.temperature),
            boundary.melt_velocity * LATENT_HEAT,
            max_relative = 1e-10
        );

        // Salt: gamma_s (S - S_b) = v S_b
        assert_relative_eq!(
            parameters.gamma_s * (salinity - boundary.salinity),
            boundary.melt_velocity * boundary.salinity,
            max_relative = 1e-10
        );
    }

    #[test]
    fn melting_for_warm_water_refreezing_for_supercooled() {
        let parameters = MeltParameters::default();

        let warm = parameters.basal_melt(1.0, 34.5, -300.0);
        assert!(warm.melt_velocity > 0.0);

        // Ambient water exactly on the freezing line neither melts nor
        // freezes
        let neutral_temperature = freezing_point(34.5, -300.0);
        let neutral = parameters.basal_melt(neutral_temperature, 34.5, -300.0);
        assert_relative_eq!(neutral.melt_velocity, 0.0, epsilon = 1e-15);
        assert_relative_eq!(neutral.salinity, 34.5, max_relative = 1e-10);

        let supercooled = parameters.basal_melt(neutral_temperature - 0.5, 34.5, -300.0);
        assert!(supercooled.melt_velocity < 0.0);
    }
}
