//! Idealized (synthetic) event curves.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::series::TimeSeries;

/// Piecewise-linear values aligned to a time axis.
///
/// Built once by the fit engine or the reconstructor; display adjustments
/// produce a new value through [`IdealizedSeries::shifted`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdealizedSeries {
    time: Vec<f64>,
    value: Vec<f64>,
}

impl IdealizedSeries {
    pub(crate) fn new(time: Vec<f64>, value: Vec<f64>) -> Self {
        debug_assert_eq!(time.len(), value.len());
        Self { time, value }
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn value(&self) -> &[f64] {
        &self.value
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Value at an exact axis time.
    pub fn value_at(&self, t: f64) -> Option<f64> {
        crate::series::exact_index(&self.time, t).map(|i| self.value[i])
    }

    /// Copy with every value offset by `v_shift`, used to line the curve up
    /// with noisy data while judging a fit. Stats are never derived from it.
    pub fn shifted(&self, v_shift: f64) -> Self {
        Self {
            time: self.time.clone(),
            value: self.value.iter().map(|v| v + v_shift).collect(),
        }
    }

    /// Largest absolute difference to `other` over the times both share.
    pub fn max_abs_diff(&self, other: &IdealizedSeries) -> Option<f64> {
        let pairs: Box<dyn Iterator<Item = (f64, f64)> + '_> = if self.time == other.time {
            Box::new(self.value.iter().copied().zip(other.value.iter().copied()))
        } else {
            Box::new(
                self.time
                    .iter()
                    .zip(&self.value)
                    .filter_map(|(t, v)| other.value_at(*t).map(|w| (*v, w))),
            )
        };
        pairs.map(|(v, w)| (v - w).abs()).reduce(f64::max)
    }

    /// As a labelled [`TimeSeries`].
    pub fn to_series(&self) -> Result<TimeSeries> {
        Ok(TimeSeries::new(self.time.clone(), self.value.clone())?
            .with_names("time", "Idealized event"))
    }
}
