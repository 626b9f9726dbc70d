//! Physical constants shared by the plume components.

use plumebox_core::timeseries::FloatValue;

/// Salinity coefficient of the linear liquidus
/// unit: K kg / g
pub const LIQUIDUS_SALINITY_SLOPE: FloatValue = -5.73e-2;

/// Constant offset of the linear liquidus
/// unit: degC
pub const LIQUIDUS_OFFSET: FloatValue = 8.32e-2;

/// Depth coefficient of the linear liquidus.
/// Depths are negative below sea level, so the freezing point is depressed
/// with depth.
/// unit: K / m
pub const LIQUIDUS_DEPTH_SLOPE: FloatValue = 7.61e-4;

/// Latent heat of fusion of ice
/// unit: J / kg
pub const LATENT_HEAT: FloatValue = 3.35e5;

/// Specific heat capacity of seawater
/// unit: J / (kg K)
pub const SEAWATER_HEAT_CAPACITY: FloatValue = 3.974e3;

/// Seconds in a Julian year.
/// Used to convert melt velocities (m/s) to annual melt rates (m/yr).
pub const SECONDS_PER_YEAR: FloatValue = 3.15576e7;
