mod melt;
mod plume;
pub mod sweep;

pub use melt::{freezing_point, BoundaryLayer};
pub use plume::{
    BoxSolution, BoxState, PlumeBoxComponent, VAR_AMBIENT_SALINITY, VAR_AMBIENT_TEMPERATURE,
    VAR_BASAL_MELT_FLUX, VAR_BASAL_MELT_RATE, VAR_DISCHARGE, VAR_OVERTURNING, VAR_PLUME_SALINITY,
    VAR_PLUME_TEMPERATURE,
};
