pub mod components;
pub mod constants;
pub mod parameters;
