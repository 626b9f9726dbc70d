#![allow(dead_code)]

//! Toy components used by the framework tests.
//!
//! These have no physical content; they exist to exercise the builder and
//! runtime with a single component and with a two-component chain.

use crate::component::{Component, InputState, OutputState, RequirementDefinition};
use crate::errors::PlumeboxResult;
use crate::timeseries::{FloatValue, Time};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub(crate) const VAR_DISCHARGE: &str = "Subglacial Discharge";
pub(crate) const VAR_EXPORT: &str = "Exported Meltwater";
pub(crate) const VAR_FRESHWATER_ANOMALY: &str = "Freshwater Anomaly";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ExportScalingParameters {
    /// Fraction of the discharge that is exported
    /// unit: dimensionless
    pub export_fraction: FloatValue,
}

/// Scales the subglacial discharge forcing by a constant fraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ExportScalingComponent {
    parameters: ExportScalingParameters,
}

impl ExportScalingComponent {
    pub fn from_parameters(parameters: ExportScalingParameters) -> Self {
        Self { parameters }
    }
}

#[typetag::serde]
impl Component for ExportScalingComponent {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::scalar_input(VAR_DISCHARGE, "m^3 / s"),
            RequirementDefinition::scalar_output(VAR_EXPORT, "m^3 / s"),
        ]
    }

    fn solve(
        &self,
        _t_current: Time,
        _t_next: Time,
        input_state: &InputState,
    ) -> PlumeboxResult<OutputState> {
        let discharge = input_state.get_latest(VAR_DISCHARGE);

        Ok(HashMap::from([(
            VAR_EXPORT.to_string(),
            discharge * self.parameters.export_fraction,
        )]))
    }
}

/// Downstream component consuming the export produced by
/// [`ExportScalingComponent`].
///
/// Used to test that chained components are solved in dependency order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct FreshwaterAnomalyComponent {
    /// Reference export against which the anomaly is calculated
    /// unit: m^3 / s
    reference: FloatValue,
}

impl FreshwaterAnomalyComponent {
    pub fn new(reference: FloatValue) -> Self {
        Self { reference }
    }
}

#[typetag::serde]
impl Component for FreshwaterAnomalyComponent {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::scalar_input(VAR_EXPORT, "m^3 / s"),
            RequirementDefinition::scalar_output(VAR_FRESHWATER_ANOMALY, "m^3 / s"),
        ]
    }

    fn solve(
        &self,
        _t_current: Time,
        _t_next: Time,
        input_state: &InputState,
    ) -> PlumeboxResult<OutputState> {
        let export = input_state.get_latest(VAR_EXPORT);

        Ok(HashMap::from([(
            VAR_FRESHWATER_ANOMALY.to_string(),
            export - self.reference,
        )]))
    }
}
