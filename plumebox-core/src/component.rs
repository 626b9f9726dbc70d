//! The component trait and its requirement definitions.
//!
//! A component declares the variables it consumes and produces via
//! [`RequirementDefinition`]s and calculates one time step at a time in
//! [`Component::solve`]. Components are wired together by the
//! [`ModelBuilder`](crate::model::ModelBuilder), which uses the
//! definitions to determine the solve order.

use crate::errors::PlumeboxResult;
use crate::timeseries::Time;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub use crate::state::{InputState, OutputState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequirementType {
    Input,
    Output,
    /// A placeholder edge used to connect otherwise independent components
    /// to the root of the component graph.
    EmptyLink,
}

/// A variable that a component consumes or produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementDefinition {
    pub name: String,
    pub unit: String,
    pub requirement_type: RequirementType,
}

impl RequirementDefinition {
    pub fn new(name: &str, unit: &str, requirement_type: RequirementType) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
            requirement_type,
        }
    }

    /// A scalar input variable.
    pub fn scalar_input(name: &str, unit: &str) -> Self {
        Self::new(name, unit, RequirementType::Input)
    }

    /// A scalar output variable.
    pub fn scalar_output(name: &str, unit: &str) -> Self {
        Self::new(name, unit, RequirementType::Output)
    }
}

/// A building block of a model.
///
/// Each component is solved over a time step given the state of its input
/// variables at the start of the step, and produces the values of its output
/// variables at the end of the step. Components must be serialisable so that
/// a whole model can be round-tripped to disk.
#[typetag::serde(tag = "type")]
pub trait Component: Debug + Send + Sync {
    fn definitions(&self) -> Vec<RequirementDefinition>;

    /// The variables required to solve this component.
    fn inputs(&self) -> Vec<RequirementDefinition> {
        self.definitions()
            .into_iter()
            .filter(|definition| definition.requirement_type == RequirementType::Input)
            .collect()
    }

    fn input_names(&self) -> Vec<String> {
        self.inputs()
            .into_iter()
            .map(|definition| definition.name)
            .collect()
    }

    /// The variables produced by this component.
    fn outputs(&self) -> Vec<RequirementDefinition> {
        self.definitions()
            .into_iter()
            .filter(|definition| definition.requirement_type == RequirementType::Output)
            .collect()
    }

    /// Solve the component for the time step `[t_current, t_next)`.
    ///
    /// The returned [`OutputState`] holds the values of the output variables
    /// at `t_next`.
    fn solve(
        &self,
        t_current: Time,
        t_next: Time,
        input_state: &InputState,
    ) -> PlumeboxResult<OutputState>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_constructors() {
        let input = RequirementDefinition::scalar_input("Subglacial Discharge", "m^3 / s");
        assert_eq!(input.requirement_type, RequirementType::Input);
        assert_eq!(input.name, "Subglacial Discharge");
        assert_eq!(input.unit, "m^3 / s");

        let output = RequirementDefinition::scalar_output("Basal Melt Rate", "m / yr");
        assert_eq!(output.requirement_type, RequirementType::Output);
    }
}
