//! Interpolation strategies.
//!
//! A strategy decides how a timeseries is evaluated between (and beyond)
//! its stored time points. Strategies which are queried outside of the
//! stored range return [`PlumeboxError::ExtrapolationNotAllowed`] unless
//! they were created with extrapolation enabled.

use crate::errors::{PlumeboxError, PlumeboxResult};
use crate::timeseries::{FloatValue, Time};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Where a target time falls relative to the stored time points.
enum Segment {
    Before,
    /// Index of the time point at the start of the containing segment.
    Interior(usize),
    After,
}

fn find_segment(target: Time, times: &ArrayView1<Time>) -> Segment {
    if target < times[0] {
        return Segment::Before;
    }
    if target > times[times.len() - 1] {
        return Segment::After;
    }
    for index in 0..times.len() - 1 {
        if target <= times[index + 1] {
            return Segment::Interior(index);
        }
    }
    // Only reachable for a NaN target, which compares false everywhere
    Segment::After
}

/// Piecewise-linear interpolation between time points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearSplineStrategy {
    extrapolate: bool,
}

impl LinearSplineStrategy {
    pub fn new(extrapolate: bool) -> Self {
        Self { extrapolate }
    }

    fn lerp(
        target: Time,
        times: &ArrayView1<Time>,
        values: &ArrayView1<FloatValue>,
        index: usize,
    ) -> FloatValue {
        let slope = (values[index + 1] - values[index]) / (times[index + 1] - times[index]);
        values[index] + slope * (target - times[index])
    }

    fn interpolate(
        &self,
        target: Time,
        times: ArrayView1<Time>,
        values: ArrayView1<FloatValue>,
    ) -> PlumeboxResult<FloatValue> {
        if times.len() < 2 {
            return Err(PlumeboxError::Error(
                "linear interpolation requires at least 2 time points".to_string(),
            ));
        }

        match find_segment(target, &times) {
            Segment::Interior(index) => Ok(Self::lerp(target, &times, &values, index)),
            Segment::Before => {
                if self.extrapolate {
                    Ok(Self::lerp(target, &times, &values, 0))
                } else {
                    Err(PlumeboxError::ExtrapolationNotAllowed(
                        target,
                        "linear".to_string(),
                        times[0],
                    ))
                }
            }
            Segment::After => {
                if self.extrapolate {
                    Ok(Self::lerp(target, &times, &values, times.len() - 2))
                } else {
                    Err(PlumeboxError::ExtrapolationNotAllowed(
                        target,
                        "linear".to_string(),
                        times[times.len() - 1],
                    ))
                }
            }
        }
    }
}

/// Previous-point (zero order hold) interpolation.
///
/// Suited to step-wise forcings such as a discharge scenario which switches
/// between regimes at known times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviousStrategy {
    extrapolate: bool,
}

impl PreviousStrategy {
    pub fn new(extrapolate: bool) -> Self {
        Self { extrapolate }
    }

    fn interpolate(
        &self,
        target: Time,
        times: ArrayView1<Time>,
        values: ArrayView1<FloatValue>,
    ) -> PlumeboxResult<FloatValue> {
        match find_segment(target, &times) {
            Segment::Interior(index) => {
                // A target exactly on a time point takes that point's value
                if target == times[index + 1] {
                    Ok(values[index + 1])
                } else {
                    Ok(values[index])
                }
            }
            Segment::Before => {
                if self.extrapolate {
                    Ok(values[0])
                } else {
                    Err(PlumeboxError::ExtrapolationNotAllowed(
                        target,
                        "previous".to_string(),
                        times[0],
                    ))
                }
            }
            Segment::After => {
                if self.extrapolate {
                    Ok(values[values.len() - 1])
                } else {
                    Err(PlumeboxError::ExtrapolationNotAllowed(
                        target,
                        "previous".to_string(),
                        times[times.len() - 1],
                    ))
                }
            }
        }
    }
}

/// The set of available interpolation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InterpolationStrategy {
    Linear(LinearSplineStrategy),
    Previous(PreviousStrategy),
}

impl InterpolationStrategy {
    pub fn interpolate(
        &self,
        target: Time,
        times: ArrayView1<Time>,
        values: ArrayView1<FloatValue>,
    ) -> PlumeboxResult<FloatValue> {
        match self {
            InterpolationStrategy::Linear(strategy) => {
                strategy.interpolate(target, times, values)
            }
            InterpolationStrategy::Previous(strategy) => {
                strategy.interpolate(target, times, values)
            }
        }
    }
}

impl From<LinearSplineStrategy> for InterpolationStrategy {
    fn from(strategy: LinearSplineStrategy) -> Self {
        InterpolationStrategy::Linear(strategy)
    }
}

impl From<PreviousStrategy> for InterpolationStrategy {
    fn from(strategy: PreviousStrategy) -> Self {
        InterpolationStrategy::Previous(strategy)
    }
}
