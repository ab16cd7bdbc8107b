//! Uniform-step resampling.

use tracing::debug;

use super::{TimeSeries, UniformSeries};
use crate::error::{Result, ShapeError, ValidationError};

/// Upper bound on resampled length; anything larger means a nonsensical step.
const MAX_RESAMPLED_POINTS: f64 = 50_000_000.0;

/// Step counts within this distance of an integer are treated as exact.
const STEP_SNAP: f64 = 1e-9;

/// Linearly interpolate `series` onto `t0, t0 + step, t0 + 2*step, ...`.
///
/// The new axis starts at the first sample and ends at the first progression
/// value at or beyond the last sample, so it always covers the original
/// range. Points past the last original sample hold its value.
///
/// # Errors
///
/// - [`ValidationError::InvalidStep`] if `step` is not finite and positive or
///   would produce an unbounded number of points
/// - [`ShapeError::InsufficientData`] if the series has fewer than two samples
pub fn resample(series: &TimeSeries, step: f64) -> Result<UniformSeries> {
    if !step.is_finite() || step <= 0.0 {
        return Err(ValidationError::InvalidStep { step }.into());
    }
    if series.len() < 2 {
        return Err(ShapeError::InsufficientData {
            points: series.len(),
        }
        .into());
    }

    let time = series.time();
    let value = series.value();
    let t0 = time[0];
    let t_last = time[time.len() - 1];

    let span_steps = (t_last - t0) / step;
    if !span_steps.is_finite() || span_steps >= MAX_RESAMPLED_POINTS {
        return Err(ValidationError::InvalidStep { step }.into());
    }
    let n_steps = if (span_steps - span_steps.round()).abs() < STEP_SNAP {
        span_steps.round()
    } else {
        span_steps.ceil()
    } as usize;

    let mut new_time = Vec::with_capacity(n_steps + 1);
    let mut new_value = Vec::with_capacity(n_steps + 1);
    let mut j = 0;
    for i in 0..=n_steps {
        let t = t0 + i as f64 * step;
        while j + 1 < time.len() && time[j + 1] <= t {
            j += 1;
        }
        let v = if j + 1 >= time.len() || t >= t_last {
            value[value.len() - 1]
        } else {
            let (ta, tb) = (time[j], time[j + 1]);
            let (va, vb) = (value[j], value[j + 1]);
            va + (vb - va) * (t - ta) / (tb - ta)
        };
        new_time.push(t);
        new_value.push(v);
    }

    debug!(
        from = series.len(),
        to = new_time.len(),
        step,
        "resampled series"
    );

    let out = TimeSeries {
        time: new_time,
        value: new_value,
        ..series.clone()
    };
    Ok(UniformSeries::from_parts(out, step))
}
