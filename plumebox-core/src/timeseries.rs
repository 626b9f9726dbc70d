//! Time axes and scalar timeseries.
//!
//! A [`Timeseries`] holds the values of a single variable on a shared
//! [`TimeAxis`]. Values which have not yet been calculated are represented
//! as NaN, so a freshly created endogenous timeseries can be filled in
//! step by step as a model is solved.

use crate::errors::PlumeboxResult;
use crate::interpolate::strategies::{InterpolationStrategy, LinearSplineStrategy};
use ndarray::{s, Array, Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Time (fractional years or seconds, depending on the model convention)
pub type Time = f64;
/// Value stored by a timeseries
pub type FloatValue = f64;

fn is_monotonically_increasing(values: &ArrayView1<Time>) -> bool {
    values.windows(2).into_iter().all(|pair| pair[1] > pair[0])
}

/// A contiguous time axis made up of `len` steps.
///
/// The axis is stored as `len + 1` bound values.
/// Step `i` spans `[bounds[i], bounds[i + 1])` and the value of a timeseries
/// at index `i` is associated with the start of that step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxis {
    bounds: Array1<Time>,
}

impl TimeAxis {
    /// Build an axis from the start time of each step.
    ///
    /// The final bound is extrapolated assuming the last step has the same
    /// width as the second to last step.
    pub fn from_values(values: Array1<Time>) -> Self {
        assert!(values.len() >= 2, "require at least 2 time values");
        assert!(
            is_monotonically_increasing(&values.view()),
            "time values must be monotonically increasing"
        );

        let step = values[values.len() - 1] - values[values.len() - 2];
        let mut bounds: Array1<Time> = Array::zeros(values.len() + 1);
        bounds.slice_mut(s![..-1]).assign(&values);
        bounds[values.len()] = values[values.len() - 1] + step;

        Self { bounds }
    }

    /// Build an axis from explicit step bounds.
    pub fn from_bounds(bounds: Array1<Time>) -> Self {
        assert!(bounds.len() >= 2, "require at least 2 bounds");
        assert!(
            is_monotonically_increasing(&bounds.view()),
            "bounds must be monotonically increasing"
        );

        Self { bounds }
    }

    /// Number of steps in the axis.
    pub fn len(&self) -> usize {
        self.bounds.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The start time of each step.
    pub fn values(&self) -> ArrayView1<'_, Time> {
        self.bounds.slice(s![..-1])
    }

    pub fn bounds(&self) -> ArrayView1<'_, Time> {
        self.bounds.view()
    }

    /// The start time of step `index`.
    pub fn at(&self, index: usize) -> Option<Time> {
        if index < self.len() {
            Some(self.bounds[index])
        } else {
            None
        }
    }

    /// The `[start, end)` bounds of step `index`.
    pub fn at_bounds(&self, index: usize) -> Option<(Time, Time)> {
        if index < self.len() {
            Some((self.bounds[index], self.bounds[index + 1]))
        } else {
            None
        }
    }
}

/// A single variable sampled on a [`TimeAxis`].
///
/// The time axis is shared between the timeseries of a model,
/// hence the `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeseries<T> {
    units: String,
    values: Array1<T>,
    time_axis: Arc<TimeAxis>,
    interpolation_strategy: InterpolationStrategy,
}

impl Timeseries<FloatValue> {
    /// Create a new timeseries from values matching the time axis.
    pub fn new(
        values: Array1<FloatValue>,
        time_axis: Arc<TimeAxis>,
        units: String,
        interpolation_strategy: InterpolationStrategy,
    ) -> Self {
        assert_eq!(
            values.len(),
            time_axis.len(),
            "values do not match the time axis"
        );
        Self {
            units,
            values,
            time_axis,
            interpolation_strategy,
        }
    }

    /// Convenience constructor using a linear interpolator and no units.
    pub fn from_values(values: Array1<FloatValue>, time: Array1<Time>) -> Self {
        Self::new(
            values,
            Arc::new(TimeAxis::from_values(time)),
            "dimensionless".to_string(),
            InterpolationStrategy::from(LinearSplineStrategy::new(false)),
        )
    }

    /// Create a NaN-filled timeseries to be written by a model.
    pub fn new_empty(
        time_axis: Arc<TimeAxis>,
        units: String,
        interpolation_strategy: InterpolationStrategy,
    ) -> Self {
        let values = Array::from_elem(time_axis.len(), FloatValue::NAN);
        Self {
            units,
            values,
            time_axis,
            interpolation_strategy,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn time_axis(&self) -> Arc<TimeAxis> {
        self.time_axis.clone()
    }

    pub fn values(&self) -> &Array1<FloatValue> {
        &self.values
    }

    /// Set the value at a given time index.
    pub fn set(&mut self, index: usize, value: FloatValue) {
        assert!(index < self.values.len(), "time index out of range");
        self.values[index] = value;
    }

    /// The value at a given time index.
    pub fn at(&self, index: usize) -> Option<FloatValue> {
        self.values.get(index).copied()
    }

    /// Interpolate the timeseries at an arbitrary time.
    ///
    /// Whether values outside of the stored time points can be queried
    /// depends on the interpolation strategy.
    pub fn at_time(&self, time: Time) -> PlumeboxResult<FloatValue> {
        self.interpolation_strategy
            .interpolate(time, self.time_axis.values(), self.values.view())
    }

    /// The index of the most recent value that has been filled in.
    pub fn latest(&self) -> Option<usize> {
        self.values.iter().rposition(|value| !value.is_nan())
    }

    /// The most recent value that has been filled in.
    pub fn latest_value(&self) -> Option<FloatValue> {
        self.latest().map(|index| self.values[index])
    }

    /// Resample onto a new time axis using the interpolation strategy.
    ///
    /// Times outside of the interpolation range are filled with NaN when the
    /// strategy does not allow extrapolation.
    pub fn interpolate_into(self, time_axis: Arc<TimeAxis>) -> Self {
        let values = Array::from_iter(
            time_axis
                .values()
                .iter()
                .map(|time| self.at_time(*time).unwrap_or(FloatValue::NAN)),
        );

        Self {
            units: self.units,
            values,
            time_axis,
            interpolation_strategy: self.interpolation_strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;
    use ndarray::array;

    #[test]
    fn axis_from_values() {
        let axis = TimeAxis::from_values(array![2020.0, 2021.0, 2022.0]);

        assert_eq!(axis.len(), 3);
        assert_eq!(axis.values(), array![2020.0, 2021.0, 2022.0]);
        assert_eq!(axis.bounds(), array![2020.0, 2021.0, 2022.0, 2023.0]);
        assert_eq!(axis.at(1), Some(2021.0));
        assert_eq!(axis.at_bounds(2), Some((2022.0, 2023.0)));
        assert_eq!(axis.at(3), None);
    }

    #[test]
    fn axis_from_bounds() {
        let axis = TimeAxis::from_bounds(array![1800.0, 1850.0, 2100.0]);

        assert_eq!(axis.len(), 2);
        assert_eq!(axis.values(), array![1800.0, 1850.0]);
        assert_eq!(axis.at_bounds(1), Some((1850.0, 2100.0)));
    }

    #[test]
    #[should_panic]
    fn axis_requires_increasing_values() {
        TimeAxis::from_values(array![2020.0, 2019.0, 2022.0]);
    }

    #[test]
    fn at_time_interpolates() {
        let timeseries = Timeseries::from_values(
            array![1.0, 2.0, 3.0],
            Array::range(2020.0, 2023.0, 1.0),
        );

        assert!(is_close!(timeseries.at_time(2020.0).unwrap(), 1.0));
        assert!(is_close!(timeseries.at_time(2020.5).unwrap(), 1.5));
        assert!(is_close!(timeseries.at_time(2022.0).unwrap(), 3.0));
        assert!(timeseries.at_time(2025.0).is_err());
    }

    #[test]
    fn latest_value_skips_unfilled_steps() {
        let axis = Arc::new(TimeAxis::from_values(Array::range(2020.0, 2025.0, 1.0)));
        let mut timeseries = Timeseries::new_empty(
            axis,
            "m / yr".to_string(),
            InterpolationStrategy::from(LinearSplineStrategy::new(false)),
        );

        assert_eq!(timeseries.latest_value(), None);

        timeseries.set(0, 12.0);
        timeseries.set(1, 14.0);
        assert_eq!(timeseries.latest(), Some(1));
        assert_eq!(timeseries.latest_value(), Some(14.0));
    }

    #[test]
    fn interpolate_into_resamples() {
        let timeseries =
            Timeseries::from_values(array![0.0, 10.0], Array::range(2020.0, 2040.0, 10.0));

        let target = Arc::new(TimeAxis::from_values(Array::range(2020.0, 2031.0, 5.0)));
        let resampled = timeseries.interpolate_into(target);

        assert_eq!(resampled.len(), 3);
        assert!(is_close!(resampled.at(0).unwrap(), 0.0));
        assert!(is_close!(resampled.at(1).unwrap(), 5.0));
        assert!(is_close!(resampled.at(2).unwrap(), 10.0));
    }

    #[test]
    fn serialization_roundtrip() {
        let timeseries = Timeseries::from_values(
            array![34.2, 34.4, 34.6],
            Array::range(2000.0, 2003.0, 1.0),
        );

        let serialised = serde_json::to_string(&timeseries).unwrap();
        let deserialised: Timeseries<FloatValue> = serde_json::from_str(&serialised).unwrap();

        assert_eq!(deserialised.values(), timeseries.values());
        assert_eq!(deserialised.time_axis(), timeseries.time_axis());
    }
}
