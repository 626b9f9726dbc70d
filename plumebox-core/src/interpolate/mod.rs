//! Interpolation of timeseries values between stored time points.

pub mod strategies;
