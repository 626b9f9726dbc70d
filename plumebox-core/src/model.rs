//! Coupling components into a runnable model.
//!
//! A [`Model`] owns a set of components, the graph of dependencies between
//! them and a [`TimeseriesCollection`] holding every variable on a shared
//! time axis. The [`ModelBuilder`] wires the pieces together from the
//! component requirement definitions.

use crate::component::{Component, RequirementDefinition, RequirementType};
use crate::errors::{PlumeboxError, PlumeboxResult};
use crate::interpolate::strategies::{InterpolationStrategy, LinearSplineStrategy};
use crate::state::InputState;
use crate::timeseries::{Time, TimeAxis, Timeseries};
use crate::timeseries_collection::{TimeseriesCollection, VariableType};
use log::{error, warn};
use ndarray::Array;
use petgraph::dot::{Config, Dot};
use petgraph::graph::NodeIndex;
use petgraph::visit::Bfs;
use petgraph::Graph;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Index;
use std::sync::Arc;

pub type C = Arc<dyn Component + Send + Sync>;
pub type CGraph = Graph<C, RequirementDefinition>;

/// A component without any requirements.
///
/// Used as the root node of the component graph so that the graph is always
/// connected and has a single node from which to begin traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NullComponent {}

#[typetag::serde]
impl Component for NullComponent {
    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![]
    }

    fn solve(
        &self,
        _t_current: Time,
        _t_next: Time,
        _input_state: &InputState,
    ) -> PlumeboxResult<crate::state::OutputState> {
        Ok(HashMap::new())
    }
}

/// Extract the state of a set of variables from a collection.
pub fn extract_state<'a>(
    collection: &'a TimeseriesCollection,
    names: Vec<String>,
    current_time: Time,
) -> InputState<'a> {
    let state = collection
        .iter()
        .filter(|item| names.contains(&item.name))
        .collect();

    InputState::build(state, current_time)
}

/// A variable declared by one or more component definitions.
#[derive(Debug, Clone)]
struct VariableDefinition {
    name: String,
    unit: String,
}

/// Checks that a new definition is consistent with any existing definition
/// of the same variable.
///
/// Components sharing a variable must agree on its unit.
fn verify_definition(
    definitions: &mut HashMap<String, VariableDefinition>,
    definition: &RequirementDefinition,
) -> PlumeboxResult<()> {
    match definitions.get(&definition.name) {
        Some(existing) => {
            if existing.unit != definition.unit {
                return Err(PlumeboxError::WrongUnits {
                    variable: definition.name.clone(),
                    expected: existing.unit.clone(),
                    actual: definition.unit.clone(),
                });
            }
        }
        None => {
            definitions.insert(
                definition.name.clone(),
                VariableDefinition {
                    name: definition.name.clone(),
                    unit: definition.unit.clone(),
                },
            );
        }
    }
    Ok(())
}

/// Check that a component graph doesn't contain any cycles
/// (other than a self-referential node).
///
/// This avoids the case where component `A` depends on a component `B`,
/// but component `B` also depends on component `A`.
fn contains_cycle(graph: &CGraph) -> bool {
    use petgraph::visit::{depth_first_search, DfsEvent};

    depth_first_search(graph, graph.node_indices(), |event| match event {
        DfsEvent::BackEdge(a, b) => match a == b {
            true => Ok(()),
            false => Err(()),
        },
        _ => Ok(()),
    })
    .is_err()
}

/// Build a new model from a set of components.
///
/// The builder generates a graph that defines the inter-component
/// dependencies and determines which variables are endogenous and exogenous
/// to the model. This graph is used by the model to define the order in
/// which components are solved.
pub struct ModelBuilder {
    components: Vec<C>,
    pub(crate) exogenous_variables: TimeseriesCollection,
    /// The time axis for the model.
    pub time_axis: Arc<TimeAxis>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self {
            components: vec![],
            exogenous_variables: TimeseriesCollection::new(),
            time_axis: Arc::new(TimeAxis::from_values(Array::range(2000.0, 2100.0, 1.0))),
        }
    }

    /// Register a component with the builder.
    pub fn with_component(&mut self, component: C) -> &mut Self {
        self.components.push(component);
        self
    }

    /// Supply exogenous data to be used by the model.
    ///
    /// Any unneeded timeseries will be ignored.
    pub fn with_exogenous_variable(
        &mut self,
        name: &str,
        timeseries: Timeseries<f64>,
    ) -> &mut Self {
        self.exogenous_variables.add_timeseries(
            name.to_string(),
            timeseries,
            VariableType::Exogenous,
        );
        self
    }

    /// Supply a collection of exogenous data to be used by the model.
    pub fn with_exogenous_collection(&mut self, collection: TimeseriesCollection) -> &mut Self {
        self.exogenous_variables.extend(collection);
        self
    }

    /// Specify the time axis that will be used by the model.
    ///
    /// This time axis defines the steps (including bounds) on which the
    /// model will be iterated.
    pub fn with_time_axis(&mut self, time_axis: TimeAxis) -> &mut Self {
        self.time_axis = Arc::new(time_axis);
        self
    }

    /// Builds the component graph for the registered components and creates
    /// a concrete model.
    ///
    /// Returns an error if the component definitions are inconsistent.
    pub fn build(&self) -> PlumeboxResult<Model> {
        let mut graph: CGraph = Graph::new();
        let mut endogenous: HashMap<String, NodeIndex> = HashMap::new();
        let mut exogenous: Vec<String> = vec![];
        let mut definitions: HashMap<String, VariableDefinition> = HashMap::new();
        let initial_node = graph.add_node(Arc::new(NullComponent {}));

        for component in &self.components {
            let node = graph.add_node(component.clone());
            let mut has_dependencies = false;

            for requirement in component.inputs() {
                verify_definition(&mut definitions, &requirement)?;

                if let Some(&producer_node) = endogenous.get(&requirement.name) {
                    // Link to the node that provides the requirement
                    graph.add_edge(producer_node, node, requirement.clone());
                    has_dependencies = true;
                } else {
                    // Add a new variable that must be defined outside of the model
                    if !exogenous.contains(&requirement.name) {
                        exogenous.push(requirement.name.clone());
                    }
                }
            }

            if !has_dependencies {
                // If the node has no dependencies on other components,
                // create a link to the initial node.
                // This ensures that we have a single connected graph.
                graph.add_edge(
                    initial_node,
                    node,
                    RequirementDefinition::new("", "", RequirementType::EmptyLink),
                );
            }

            for requirement in component.outputs() {
                verify_definition(&mut definitions, &requirement)?;

                match endogenous.get(&requirement.name) {
                    None => {
                        endogenous.insert(requirement.name.clone(), node);
                    }
                    Some(node_index) => {
                        // A later component supersedes an earlier producer
                        graph.add_edge(*node_index, node, requirement.clone());
                        endogenous.insert(requirement.name.clone(), node);
                    }
                }
            }
        }

        assert!(!contains_cycle(&graph), "component graph contains a cycle");

        // Create the timeseries collection using the information from the components
        let mut collection = TimeseriesCollection::new();
        for (name, definition) in definitions {
            debug_assert_eq!(definition.name, name);

            if exogenous.contains(&name) {
                // Exogenous variable is expected to be supplied,
                // then interpolated onto the model's time axis
                match self.exogenous_variables.get_timeseries_by_name(&name) {
                    Some(timeseries) => collection.add_timeseries(
                        name,
                        timeseries.to_owned().interpolate_into(self.time_axis.clone()),
                        VariableType::Exogenous,
                    ),
                    None => {
                        // Missing exogenous data degrades to a NaN series,
                        // any downstream values will also be NaN
                        warn!("No exogenous data supplied for '{}'", name);
                        collection.add_timeseries(
                            name,
                            Timeseries::new_empty(
                                self.time_axis.clone(),
                                definition.unit,
                                InterpolationStrategy::from(LinearSplineStrategy::new(true)),
                            ),
                            VariableType::Exogenous,
                        )
                    }
                }
            } else {
                // Create a placeholder for data that will be generated by the model
                collection.add_timeseries(
                    name,
                    Timeseries::new_empty(
                        self.time_axis.clone(),
                        definition.unit,
                        InterpolationStrategy::from(LinearSplineStrategy::new(true)),
                    ),
                    VariableType::Endogenous,
                )
            }
        }

        Ok(Model::new(
            graph,
            initial_node,
            collection,
            self.time_axis.clone(),
        ))
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A coupled set of components that are solved on a common time axis.
///
/// These components are solved over time steps defined by the [`TimeAxis`].
/// Each component may require information from other components to be solved
/// (endogenous) or predefined data (exogenous).
///
/// For example, the plume box component requires ambient ocean temperature
/// as input state and provides a basal melt rate. The component is agnostic
/// about where that state comes from. If no other component provides ambient
/// ocean temperature, then an ambient ocean temperature timeseries must be
/// defined externally.
#[derive(Debug, Serialize, Deserialize)]
pub struct Model {
    /// A directed graph with components as nodes and the edges defining the
    /// state dependencies between nodes.
    ///
    /// This graph is traversed on every time step to ensure that any state
    /// dependencies are solved before another component needs the state.
    components: CGraph,
    /// The base node of the graph from where to begin traversing.
    initial_node: NodeIndex,
    /// The model state.
    ///
    /// Variable names within the model are unique and these variable names
    /// are used by components to request state.
    collection: TimeseriesCollection,
    time_axis: Arc<TimeAxis>,
    time_index: usize,
}

impl Model {
    /// Create a new Model with the given components and collection.
    pub fn new(
        components: CGraph,
        initial_node: NodeIndex,
        collection: TimeseriesCollection,
        time_axis: Arc<TimeAxis>,
    ) -> Self {
        Self {
            components,
            initial_node,
            collection,
            time_axis,
            time_index: 0,
        }
    }

    /// Gets the time value at the current step.
    pub fn current_time(&self) -> Time {
        self.time_axis.at(self.time_index).unwrap()
    }

    /// Gets the time bounds at the current step.
    pub fn current_time_bounds(&self) -> (Time, Time) {
        self.time_axis.at_bounds(self.time_index).unwrap()
    }

    /// Solve a single component for the current timestep.
    ///
    /// The updated state from the component is pushed into the model's
    /// timeseries collection to be later used by other components.
    /// The output state defines the values at the next time index as it
    /// represents the state at the start of the next timestep.
    fn step_model_component(&mut self, component: C) {
        let input_state = extract_state(
            &self.collection,
            component.input_names(),
            self.current_time(),
        );

        let (start, end) = self.current_time_bounds();
        let result = component.solve(start, end, &input_state);

        match result {
            Ok(output_state) => {
                for (key, value) in output_state.iter() {
                    self.collection.set_value(key, self.time_index + 1, *value);
                }
            }
            Err(err) => {
                error!("Solving {:?} failed: {}", component, err)
            }
        }
    }

    /// Step the model forward a step by solving each component for the
    /// current time step.
    ///
    /// A breadth-first search across the component graph starting at the
    /// initial node solves the components in an order which ensures that any
    /// dependencies are solved before the components that need them.
    fn step_model(&mut self) {
        let mut bfs = Bfs::new(&self.components, self.initial_node);
        while let Some(nx) = bfs.next(&self.components) {
            let component = self.components.index(nx);
            self.step_model_component(component.clone())
        }
    }

    /// Steps the model forward one time step.
    ///
    /// This solves the current time step and then updates the time index.
    pub fn step(&mut self) {
        assert!(self.time_index < self.time_axis.len() - 1);
        self.step_model();

        self.time_index += 1;
    }

    /// Steps the model until the end of the time axis.
    pub fn run(&mut self) {
        while self.time_index < self.time_axis.len() - 1 {
            self.step();
        }
    }

    /// Create a diagram that represents the component graph.
    ///
    /// Useful for debugging.
    pub fn as_dot(&self) -> Dot<'_, &CGraph> {
        Dot::with_attr_getters(
            &self.components,
            &[Config::NodeNoLabel, Config::EdgeNoLabel],
            &|_, er| format!("label = {:?}", er.weight().name),
            &|_, (_, component)| {
                // Escape quotes and backslashes for DOT format
                let debug_str = format!("{:?}", component);
                let escaped = debug_str.replace('\\', "\\\\").replace('"', "\\\"");
                format!("label = \"{}\"", escaped)
            },
        )
    }

    /// Returns true if the model has no more time steps to process.
    pub fn finished(&self) -> bool {
        self.time_index == self.time_axis.len() - 1
    }

    /// Returns a reference to the timeseries collection.
    pub fn timeseries(&self) -> &TimeseriesCollection {
        &self.collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::example_components::{
        ExportScalingComponent, ExportScalingParameters, FreshwaterAnomalyComponent,
    };
    use crate::example_components::{VAR_DISCHARGE, VAR_EXPORT, VAR_FRESHWATER_ANOMALY};
    use is_close::is_close;
    use ndarray::array;

    fn discharge_timeseries() -> Timeseries<f64> {
        Timeseries::from_values(
            array![100.0, 200.0, 300.0, 400.0, 500.0],
            Array::range(2000.0, 2005.0, 1.0),
        )
    }

    fn build_example_model() -> Model {
        ModelBuilder::new()
            .with_time_axis(TimeAxis::from_values(Array::range(2000.0, 2005.0, 1.0)))
            .with_component(Arc::new(ExportScalingComponent::from_parameters(
                ExportScalingParameters { export_fraction: 0.5 },
            )))
            .with_exogenous_variable(VAR_DISCHARGE, discharge_timeseries())
            .build()
            .unwrap()
    }

    #[test]
    fn build_and_run() {
        let mut model = build_example_model();

        assert_eq!(model.current_time(), 2000.0);
        assert_eq!(model.current_time_bounds(), (2000.0, 2001.0));
        assert!(!model.finished());

        model.run();

        assert!(model.finished());
        let export = model
            .timeseries()
            .get_timeseries_by_name(VAR_EXPORT)
            .unwrap();

        // The output at index i + 1 is calculated from the forcing at index i
        assert!(export.at(0).unwrap().is_nan());
        assert!(is_close!(export.at(1).unwrap(), 50.0));
        assert!(is_close!(export.at(4).unwrap(), 200.0));
    }

    #[test]
    fn component_chain() {
        let mut model = ModelBuilder::new()
            .with_time_axis(TimeAxis::from_values(Array::range(2000.0, 2005.0, 1.0)))
            .with_component(Arc::new(ExportScalingComponent::from_parameters(
                ExportScalingParameters { export_fraction: 0.5 },
            )))
            .with_component(Arc::new(FreshwaterAnomalyComponent::new(75.0)))
            .with_exogenous_variable(VAR_DISCHARGE, discharge_timeseries())
            .build()
            .unwrap();

        model.run();

        let anomaly = model
            .timeseries()
            .get_timeseries_by_name(VAR_FRESHWATER_ANOMALY)
            .unwrap();

        // Anomaly is solved after the export it depends upon
        assert!(is_close!(anomaly.at(1).unwrap(), 50.0 - 75.0));
        assert!(is_close!(anomaly.at(4).unwrap(), 200.0 - 75.0));
    }

    #[test]
    fn missing_exogenous_data_propagates_nan() {
        let mut model = ModelBuilder::new()
            .with_time_axis(TimeAxis::from_values(Array::range(2000.0, 2005.0, 1.0)))
            .with_component(Arc::new(ExportScalingComponent::from_parameters(
                ExportScalingParameters { export_fraction: 0.5 },
            )))
            .build()
            .unwrap();

        model.run();

        let export = model
            .timeseries()
            .get_timeseries_by_name(VAR_EXPORT)
            .unwrap();
        assert!(export.at(1).unwrap().is_nan());
        assert!(export.at(4).unwrap().is_nan());
    }

    #[test]
    fn inconsistent_units_are_rejected() {
        let mut definitions = HashMap::new();
        verify_definition(
            &mut definitions,
            &RequirementDefinition::scalar_output(VAR_EXPORT, "m^3 / s"),
        )
        .unwrap();

        let result = verify_definition(
            &mut definitions,
            &RequirementDefinition::scalar_input(VAR_EXPORT, "Sv"),
        );

        assert!(matches!(
            result,
            Err(PlumeboxError::WrongUnits { .. })
        ));
    }

    #[test]
    fn model_serialization_roundtrip() {
        let mut model = build_example_model();
        model.step();

        let serialised = toml::to_string(&model).unwrap();
        let mut deserialised = toml::from_str::<Model>(&serialised).unwrap();

        assert_eq!(deserialised.current_time(), model.current_time());

        // The deserialised model can continue from where it stopped
        deserialised.run();
        assert!(deserialised.finished());

        let export = deserialised
            .timeseries()
            .get_timeseries_by_name(VAR_EXPORT)
            .unwrap();
        assert!(is_close!(export.at(4).unwrap(), 200.0));
    }

    #[test]
    fn dot_diagram_contains_components() {
        let model = build_example_model();
        let dot = format!("{:?}", model.as_dot());

        assert!(dot.contains("ExportScalingComponent"));
    }
}
