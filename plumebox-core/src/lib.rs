pub mod component;
mod example_components;
pub mod interpolate;
pub mod model;
pub mod state;
pub mod timeseries;
pub mod timeseries_collection;

pub mod errors;
