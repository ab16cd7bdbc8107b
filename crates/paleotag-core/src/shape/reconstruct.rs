//! Regenerate an idealized curve from a stored stats record.

use tracing::debug;

use super::idealized::IdealizedSeries;
use super::stats::EventStats;
use super::synth::Synthesizer;
use crate::error::ShapeError;
use crate::series::{exact_index, TimeSeries};

/// Source of the baseline value at `event_start`.
#[derive(Debug, Clone, Copy)]
pub enum Anchor<'a> {
    /// Read the baseline from a series at `event_start`.
    Series(&'a TimeSeries),
    /// Use this baseline directly.
    Value(f64),
}

impl Anchor<'_> {
    fn baseline(&self, event_start: f64) -> Result<f64, ShapeError> {
        match self {
            Anchor::Value(v) => Ok(*v),
            Anchor::Series(series) => series
                .value_at(event_start)
                .ok_or(ShapeError::OutOfRange { time: event_start }),
        }
    }
}

/// Unit-step axis `start, start + 1, ..., end` (inclusive of `end` when it
/// lies on the progression). Empty if `end < start`.
pub fn integer_axis(start: f64, end: f64) -> Vec<f64> {
    if !(start.is_finite() && end.is_finite()) || end < start {
        return Vec::new();
    }
    let n = (end - start).floor() as usize;
    (0..=n).map(|i| start + i as f64).collect()
}

/// Rebuild the idealized curve over `axis` from `stats` alone.
///
/// Segments with zero duration are skipped. Each remaining segment ramps to
/// `baseline + amp` over `dur` axis steps, truncated at the end of the axis.
/// Everything after the last segment holds the last value. Segments that
/// start past the end of the axis are ignored.
///
/// `axis` must be strictly increasing, as a series axis or
/// [`integer_axis`] is.
///
/// # Errors
///
/// [`ShapeError::OutOfRange`] if `event_start` is not an exact entry of
/// `axis`, or of the anchor series.
pub fn reconstruct(
    anchor: Anchor<'_>,
    axis: &[f64],
    stats: &EventStats,
) -> Result<IdealizedSeries, ShapeError> {
    let start = exact_index(axis, stats.event_start).ok_or(ShapeError::OutOfRange {
        time: stats.event_start,
    })?;
    let baseline = anchor.baseline(stats.event_start)?;

    let mut synth = Synthesizer::new(axis.len(), start, baseline);
    for seg in stats.segments.iter().filter(|s| s.dur > 0) {
        if synth.pointer() >= axis.len() {
            debug!(segment = %seg.name, available = axis.len(), "reconstruction truncated at end of axis");
            break;
        }
        let end = usize::try_from(seg.dur)
            .ok()
            .and_then(|dur| synth.pointer().checked_add(dur))
            .unwrap_or(usize::MAX);
        synth.ramp_to(end, baseline + seg.amp);
    }

    Ok(IdealizedSeries::new(axis.to_vec(), synth.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::stats::SegmentStats;

    fn stats() -> EventStats {
        EventStats {
            event_start: 2.0,
            event_end: 6.0,
            segments: vec![
                SegmentStats { name: "first".into(), dur: 2, amp: 4.0 },
                SegmentStats { name: "second".into(), dur: 0, amp: 0.0 },
                SegmentStats { name: "third".into(), dur: 2, amp: -2.0 },
            ],
        }
    }

    #[test]
    fn integer_axis_is_inclusive() {
        assert_eq!(integer_axis(3.0, 6.0), vec![3.0, 4.0, 5.0, 6.0]);
        assert_eq!(integer_axis(3.0, 3.0), vec![3.0]);
        assert!(integer_axis(4.0, 3.0).is_empty());
    }

    #[test]
    fn rebuilds_from_bare_baseline() {
        let out = reconstruct(Anchor::Value(1.0), &integer_axis(0.0, 8.0), &stats()).unwrap();
        assert_eq!(out.value(), &[1.0, 1.0, 1.0, 3.0, 5.0, 2.0, -1.0, -1.0, -1.0]);
    }

    #[test]
    fn reads_baseline_from_anchor_series() {
        let axis = integer_axis(0.0, 8.0);
        let series = TimeSeries::new(axis.clone(), vec![7.0, 7.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let out = reconstruct(Anchor::Series(&series), &axis, &stats()).unwrap();
        assert_eq!(out.value_at(2.0), Some(1.0));
        assert_eq!(out.value_at(4.0), Some(5.0));
    }

    #[test]
    fn missing_start_is_out_of_range() {
        let err = reconstruct(Anchor::Value(0.0), &integer_axis(3.0, 8.0), &stats()).unwrap_err();
        assert_eq!(err, ShapeError::OutOfRange { time: 2.0 });

        let series = TimeSeries::new(vec![5.0, 6.0], vec![0.0, 0.0]).unwrap();
        let err = reconstruct(Anchor::Series(&series), &integer_axis(0.0, 8.0), &stats()).unwrap_err();
        assert_eq!(err, ShapeError::OutOfRange { time: 2.0 });
    }

    #[test]
    fn short_axis_truncates_the_last_ramp() {
        let out = reconstruct(Anchor::Value(1.0), &integer_axis(0.0, 5.0), &stats()).unwrap();
        assert_eq!(out.value(), &[1.0, 1.0, 1.0, 3.0, 5.0, 2.0]);
    }

    #[test]
    fn overlong_segment_stops_at_axis_end() {
        let stats = EventStats {
            event_start: 2.0,
            event_end: 6.0,
            segments: vec![
                SegmentStats { name: "first".into(), dur: u64::MAX, amp: 4.0 },
                SegmentStats { name: "second".into(), dur: 3, amp: -2.0 },
            ],
        };
        let out = reconstruct(Anchor::Value(1.0), &integer_axis(0.0, 8.0), &stats).unwrap();
        assert_eq!(out.len(), 9);
        assert!(out.value().iter().all(|v| (v - 1.0).abs() < 1e-9), "{:?}", out.value());
    }
}
