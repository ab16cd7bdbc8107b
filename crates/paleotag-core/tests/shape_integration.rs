//! Integration tests for fitting and reconstructing idealized events.

use paleotag_core::{
    fit, integer_axis, reconstruct, resample, Anchor, Breakpoint, BreakpointScheme, BreakpointSet,
    EventStats, ShapeError, TimeSeries, UniformSeries,
};
use proptest::prelude::*;

fn uniform(values: Vec<f64>) -> UniformSeries {
    let time: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    resample(&TimeSeries::new(time, values).unwrap(), 1.0).unwrap()
}

fn heinrich_like() -> UniformSeries {
    uniform(vec![0.0, 0.0, 0.0, 5.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0])
}

#[test]
fn test_ramp_then_flat_scenario() {
    let set = BreakpointSet::new(0.0, vec![Breakpoint::explicit("end", 3.0, 10.0)]).unwrap();
    let fitted = fit(&heinrich_like(), &set).unwrap();

    assert_eq!(fitted.stats.dur("end"), Some(3));
    assert_eq!(fitted.stats.amp("end"), Some(10.0));
    assert_eq!(fitted.stats.event_end, 3.0);

    let want = [0.0, 10.0 / 3.0, 20.0 / 3.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0];
    for (got, want) in fitted.idealized.value().iter().zip(want) {
        assert!((got - want).abs() < 1e-12);
    }
}

#[test]
fn test_omitted_middle_leaves_no_gap() {
    let set = BreakpointSet::new(
        0.0,
        vec![
            Breakpoint::from_pair("beginning", Some(2.0), Some(2.0)).unwrap(),
            Breakpoint::from_pair("middle", None, None).unwrap(),
            Breakpoint::from_pair("end", Some(5.0), Some(8.0)).unwrap(),
        ],
    )
    .unwrap();
    let fitted = fit(&heinrich_like(), &set).unwrap();

    assert_eq!(fitted.stats.dur("middle"), Some(0));
    assert_eq!(fitted.stats.amp("middle"), Some(0.0));
    assert_eq!(fitted.stats.dur("end"), Some(3));
    assert_eq!(fitted.stats.total_dur(), 5);
    // The end segment starts at the beginning breakpoint's value.
    assert_eq!(fitted.idealized.value_at(2.0), Some(2.0));
    assert_eq!(fitted.idealized.value_at(3.0), Some(4.0));
}

#[test]
fn test_spline_timings_use_series_values() {
    let set = BreakpointSet::from_timings(
        1.0,
        &BreakpointScheme::Spline,
        &[Some(3.0), None, Some(6.0)],
    )
    .unwrap();
    let fitted = fit(&heinrich_like(), &set).unwrap();

    assert_eq!(fitted.stats.amp("first"), Some(5.0));
    assert_eq!(fitted.stats.amp("third"), Some(10.0));
    assert_eq!(fitted.stats.dur("third"), Some(3));
    assert_eq!(fitted.stats.event_end, 6.0);
}

#[test]
fn test_stats_survive_json_and_reconstruct() {
    let set = BreakpointSet::new(
        2.0,
        vec![
            Breakpoint::lookup("onset", 4.0),
            Breakpoint::explicit("peak", 6.0, 14.0),
            Breakpoint::lookup("recovery", 9.0),
        ],
    )
    .unwrap();
    let series = heinrich_like();
    let fitted = fit(&series, &set).unwrap();

    let text = serde_json::to_string(&fitted.stats).unwrap();
    let stored: EventStats = serde_json::from_str(&text).unwrap();
    let rebuilt = reconstruct(Anchor::Series(&series), series.time(), &stored).unwrap();

    assert_eq!(rebuilt, fitted.idealized);
}

#[test]
fn test_reconstruct_on_longer_axis_extends_flat() {
    let set = BreakpointSet::new(0.0, vec![Breakpoint::explicit("end", 3.0, 10.0)]).unwrap();
    let fitted = fit(&heinrich_like(), &set).unwrap();

    let axis = integer_axis(-5.0, 30.0);
    let rebuilt = reconstruct(Anchor::Value(0.0), &axis, &fitted.stats).unwrap();
    assert_eq!(rebuilt.len(), 36);
    assert_eq!(rebuilt.value_at(-5.0), Some(0.0));
    assert_eq!(rebuilt.value_at(30.0), Some(10.0));
    assert_eq!(fitted.idealized.max_abs_diff(&rebuilt), Some(0.0));
}

#[test]
fn test_errors_are_typed() {
    let series = heinrich_like();

    let misaligned = BreakpointSet::new(0.0, vec![Breakpoint::lookup("end", 2.5)]).unwrap();
    assert!(matches!(
        fit(&series, &misaligned).unwrap_err(),
        ShapeError::MisalignedTime { .. }
    ));

    let degenerate = BreakpointSet::new(
        0.0,
        vec![Breakpoint::lookup("a", 4.0), Breakpoint::skipped("b"), Breakpoint::lookup("c", 4.0)],
    )
    .unwrap();
    assert!(matches!(
        fit(&series, &degenerate).unwrap_err(),
        ShapeError::DegenerateSegment { .. }
    ));

    let fitted = fit(&series, &BreakpointSet::new(0.0, vec![]).unwrap()).unwrap();
    assert_eq!(
        reconstruct(Anchor::Value(0.0), &integer_axis(1.0, 4.0), &fitted.stats).unwrap_err(),
        ShapeError::OutOfRange { time: 0.0 }
    );
}

/// A random series with a random, valid breakpoint layout.
fn scenario() -> impl Strategy<Value = (Vec<f64>, usize, Vec<(bool, usize, Option<f64>)>)> {
    (8usize..64).prop_flat_map(|n| {
        (
            prop::collection::vec(-100.0f64..100.0, n),
            0..n - 1,
            prop::collection::vec(
                (any::<bool>(), 1usize..8, prop::option::of(-50.0f64..50.0)),
                1..5,
            ),
        )
    })
}

fn build(values: &[f64], start: usize, layout: &[(bool, usize, Option<f64>)]) -> BreakpointSet {
    let mut cursor = start;
    let breakpoints = layout
        .iter()
        .enumerate()
        .map(|(i, (present, gap, amp))| {
            let name = format!("bp{i}");
            if !present || cursor + gap >= values.len() {
                return Breakpoint::skipped(name);
            }
            cursor += gap;
            match amp {
                Some(a) => Breakpoint::explicit(name, cursor as f64, *a),
                None => Breakpoint::lookup(name, cursor as f64),
            }
        })
        .collect();
    BreakpointSet::new(start as f64, breakpoints).unwrap()
}

proptest! {
    #[test]
    fn prop_reconstruct_inverts_fit((values, start, layout) in scenario()) {
        let series = uniform(values.clone());
        let set = build(&values, start, &layout);
        let fitted = fit(&series, &set).unwrap();

        let rebuilt = reconstruct(Anchor::Value(values[start]), series.time(), &fitted.stats).unwrap();
        prop_assert_eq!(rebuilt, fitted.idealized);
    }

    #[test]
    fn prop_amplitudes_are_relative_to_baseline((values, start, layout) in scenario()) {
        let series = uniform(values.clone());
        let set = build(&values, start, &layout);
        let fitted = fit(&series, &set).unwrap();

        for bp in set.breakpoints() {
            let amp = fitted.stats.amp(&bp.name).unwrap();
            match bp.time {
                None => {
                    prop_assert_eq!(amp, 0.0);
                    prop_assert_eq!(fitted.stats.dur(&bp.name), Some(0));
                }
                Some(t) => {
                    let target = match bp.amplitude {
                        paleotag_core::AmplitudeSource::Explicit(a) => a,
                        paleotag_core::AmplitudeSource::SeriesLookup => values[t as usize],
                    };
                    prop_assert_eq!(amp, target - values[start]);
                }
            }
        }
    }

    #[test]
    fn prop_tail_is_flat_after_event_end((values, start, layout) in scenario()) {
        let series = uniform(values.clone());
        let set = build(&values, start, &layout);
        let fitted = fit(&series, &set).unwrap();

        let end_value = fitted.idealized.value_at(fitted.stats.event_end).unwrap();
        for (t, v) in fitted.idealized.time().iter().zip(fitted.idealized.value()) {
            if *t >= fitted.stats.event_end {
                prop_assert_eq!(*v, end_value);
            }
        }
    }
}
