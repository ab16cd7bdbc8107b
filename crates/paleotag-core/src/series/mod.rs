//! Time series model.
//!
//! A [`TimeSeries`] is an ordered sequence of `(time, value)` samples with a
//! strictly increasing time axis. It carries the variable names and unit
//! labels from the archive column it was read from so fitted curves can be
//! labelled and written back alongside the source data.
//!
//! The fit engine only accepts a [`UniformSeries`], which is a series whose
//! axis is an exact arithmetic progression. Breakpoint times are located on
//! that axis by exact equality, so the uniform step is established once, up
//! front, by [`resample`] or by [`UniformSeries::try_from`].

mod resample;
mod units;

pub use resample::resample;
pub use units::TimeUnit;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Relative tolerance used when checking that an existing axis is uniform.
const UNIFORM_TOLERANCE: f64 = 1e-9;

/// Ordered time/value samples with unit metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    time: Vec<f64>,
    value: Vec<f64>,
    #[serde(default)]
    pub time_name: String,
    #[serde(default)]
    pub value_name: String,
    #[serde(default)]
    pub time_unit: String,
    #[serde(default)]
    pub value_unit: String,
}

impl TimeSeries {
    /// Build a series, checking lengths, finiteness and strict monotonicity.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the arrays differ in length, contain
    /// NaN/infinite samples, or the time axis is not strictly increasing.
    pub fn new(time: Vec<f64>, value: Vec<f64>) -> Result<Self> {
        validate_axis(&time, &value)?;
        Ok(Self {
            time,
            value,
            time_name: "time".into(),
            value_name: "value".into(),
            time_unit: String::new(),
            value_unit: String::new(),
        })
    }

    /// Set variable names.
    pub fn with_names(mut self, time_name: impl Into<String>, value_name: impl Into<String>) -> Self {
        self.time_name = time_name.into();
        self.value_name = value_name.into();
        self
    }

    /// Set unit labels.
    pub fn with_units(mut self, time_unit: impl Into<String>, value_unit: impl Into<String>) -> Self {
        self.time_unit = time_unit.into();
        self.value_unit = value_unit.into();
        self
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn value(&self) -> &[f64] {
        &self.value
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Index of `t` on the axis by exact equality. No nearest-match snapping.
    pub fn index_of(&self, t: f64) -> Option<usize> {
        exact_index(&self.time, t)
    }

    /// Value sampled exactly at `t`, if `t` is on the axis.
    pub fn value_at(&self, t: f64) -> Option<f64> {
        self.index_of(t).map(|i| self.value[i])
    }

    /// First and last time, or `None` for an empty series.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        Some((*self.time.first()?, *self.time.last()?))
    }

    /// Z-score the values using the population standard deviation.
    ///
    /// A constant series is only centred.
    pub fn standardize(&self) -> Self {
        let n = self.value.len();
        if n == 0 {
            return self.clone();
        }
        let mean = self.value.iter().sum::<f64>() / n as f64;
        let var = self.value.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        let std = var.sqrt();
        let scale = if std > 0.0 { std } else { 1.0 };

        let mut out = self.clone();
        out.value = self.value.iter().map(|v| (v - mean) / scale).collect();
        out
    }

    /// Keep samples with `start <= t <= end`. The bounds may be given in either order.
    pub fn slice(&self, start: f64, end: f64) -> Self {
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        let (time, value): (Vec<f64>, Vec<f64>) = self
            .time
            .iter()
            .zip(&self.value)
            .filter(|(t, _)| **t >= lo && **t <= hi)
            .map(|(t, v)| (*t, *v))
            .unzip();
        Self {
            time,
            value,
            ..self.clone()
        }
    }

    /// Convert the time axis to `target`, re-sorting so time stays increasing.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownTimeUnit`] if this series' unit label
    /// is not recognised.
    pub fn convert_time_unit(&self, target: TimeUnit) -> Result<Self> {
        let source = TimeUnit::parse(&self.time_unit)?;
        if source == target {
            return Ok(self.clone());
        }

        let mut pairs: Vec<(f64, f64)> = self
            .time
            .iter()
            .zip(&self.value)
            .map(|(t, v)| (target.from_years_bp(source.to_years_bp(*t)), *v))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (time, value): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        validate_axis(&time, &value)?;
        Ok(Self {
            time,
            value,
            time_unit: target.label().to_string(),
            ..self.clone()
        })
    }
}

/// A [`TimeSeries`] whose axis is an exact arithmetic progression.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSeries {
    series: TimeSeries,
    step: f64,
}

impl UniformSeries {
    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn into_inner(self) -> TimeSeries {
        self.series
    }

    /// Wrap a series already known to be uniform (only the resampler does this).
    pub(crate) fn from_parts(series: TimeSeries, step: f64) -> Self {
        Self { series, step }
    }
}

impl std::ops::Deref for UniformSeries {
    type Target = TimeSeries;

    fn deref(&self) -> &TimeSeries {
        &self.series
    }
}

impl TryFrom<TimeSeries> for UniformSeries {
    type Error = ValidationError;

    /// Accept a series whose consecutive time differences are all equal.
    fn try_from(series: TimeSeries) -> std::result::Result<Self, Self::Error> {
        if series.len() < 2 {
            return Err(ValidationError::EmptyCollection(
                "uniform series needs at least 2 samples".into(),
            ));
        }
        let step = series.time[1] - series.time[0];
        for (i, w) in series.time.windows(2).enumerate() {
            let d = w[1] - w[0];
            if (d - step).abs() > UNIFORM_TOLERANCE * step.abs().max(1.0) {
                return Err(ValidationError::InvalidValue {
                    field: "time".into(),
                    message: format!(
                        "axis is not uniform: step {step} at index 0 but {d} at index {i}"
                    ),
                });
            }
        }
        Ok(Self { series, step })
    }
}

/// Standard preparation before labelling: optional z-scoring, conversion to
/// `unit`, then resampling at `step`.
///
/// A series with no unit label is assumed to already be in `unit`.
pub fn prepare(series: &TimeSeries, unit: TimeUnit, standardize: bool, step: f64) -> Result<UniformSeries> {
    let series = if standardize {
        series.standardize()
    } else {
        series.clone()
    };
    let series = if series.time_unit.trim().is_empty() {
        tracing::warn!(target_unit = %unit, "series has no time unit; assuming target unit");
        TimeSeries {
            time_unit: unit.label().to_string(),
            ..series
        }
    } else {
        series.convert_time_unit(unit)?
    };
    resample(&series, step)
}

/// Binary search on a strictly increasing axis, matching by `==`.
pub(crate) fn exact_index(axis: &[f64], t: f64) -> Option<usize> {
    axis.binary_search_by(|x| x.partial_cmp(&t).unwrap_or(Ordering::Less))
        .ok()
}

fn validate_axis(time: &[f64], value: &[f64]) -> Result<(), ValidationError> {
    if time.len() != value.len() {
        return Err(ValidationError::LengthMismatch {
            times: time.len(),
            values: value.len(),
        });
    }
    if let Some(index) = time.iter().position(|t| !t.is_finite()) {
        return Err(ValidationError::NonFinite {
            field: "time".into(),
            index,
        });
    }
    if let Some(index) = value.iter().position(|v| !v.is_finite()) {
        return Err(ValidationError::NonFinite {
            field: "value".into(),
            index,
        });
    }
    for (i, w) in time.windows(2).enumerate() {
        if w[1] <= w[0] {
            return Err(ValidationError::NonMonotonicTime {
                index: i + 1,
                prev: w[0],
                next: w[1],
            });
        }
    }
    Ok(())
}
