//! Piecewise-linear fit from user breakpoints.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::breakpoint::{AmplitudeSource, BreakpointSet};
use super::idealized::IdealizedSeries;
use super::stats::{EventStats, SegmentStats};
use super::synth::Synthesizer;
use crate::error::ShapeError;
use crate::series::UniformSeries;

/// Output of [`fit`]: the synthesized curve and its stats record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fit {
    pub idealized: IdealizedSeries,
    pub stats: EventStats,
}

impl Fit {
    /// Series value at `event_start`, the reference for every `_amp`.
    pub fn baseline(&self) -> f64 {
        self.idealized
            .value_at(self.stats.event_start)
            .unwrap_or_default()
    }
}

/// Fit an idealized event shape to `series`.
///
/// The event start and every present breakpoint time must be exact entries
/// of the series axis. Segments ramp linearly from one breakpoint target to
/// the next; samples before the event start hold the baseline and samples
/// after the last present breakpoint hold its target.
///
/// # Errors
///
/// - [`ShapeError::MisalignedTime`] if the start or a breakpoint time is not
///   on the axis
/// - [`ShapeError::DegenerateSegment`] if a present breakpoint does not lie
///   strictly after the previous present one (or the start)
pub fn fit(series: &UniformSeries, breakpoints: &BreakpointSet) -> Result<Fit, ShapeError> {
    let time = series.time();
    let value = series.value();

    let i0 = series
        .index_of(breakpoints.event_start)
        .ok_or_else(|| ShapeError::MisalignedTime {
            name: "event_start".into(),
            time: breakpoints.event_start,
        })?;
    let baseline = value[i0];

    let mut synth = Synthesizer::new(series.len(), i0, baseline);
    let mut segments = Vec::with_capacity(breakpoints.len());

    for bp in breakpoints.breakpoints() {
        let Some(t) = bp.time else {
            segments.push(SegmentStats {
                name: bp.name.clone(),
                dur: 0,
                amp: 0.0,
            });
            continue;
        };

        let i1 = series.index_of(t).ok_or_else(|| ShapeError::MisalignedTime {
            name: bp.name.clone(),
            time: t,
        })?;
        let start = synth.pointer();
        if i1 <= start {
            return Err(ShapeError::DegenerateSegment {
                name: bp.name.clone(),
                start,
                end: i1,
            });
        }

        let target = match bp.amplitude {
            AmplitudeSource::Explicit(a) => a,
            AmplitudeSource::SeriesLookup => value[i1],
        };
        // Ramp to `baseline + amp`, the same value reconstruction computes.
        let amp = target - baseline;
        synth.ramp_to(i1, baseline + amp);

        segments.push(SegmentStats {
            name: bp.name.clone(),
            dur: (i1 - start) as u64,
            amp,
        });
    }

    let end = synth.pointer();
    let stats = EventStats {
        event_start: breakpoints.event_start,
        event_end: time[end],
        segments,
    };
    debug!(
        event_start = stats.event_start,
        event_end = stats.event_end,
        segments = stats.segments.len(),
        baseline,
        "fitted idealized event"
    );

    Ok(Fit {
        idealized: IdealizedSeries::new(time.to_vec(), synth.finish()),
        stats,
    })
}
