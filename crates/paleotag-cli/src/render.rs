//! Text rendering of original and idealized series.

use paleotag_core::{IdealizedSeries, TimeSeries};

/// Display options shared by the table and chart.
#[derive(Debug, Clone)]
pub struct View {
    pub x_lims: Option<(f64, f64)>,
    pub reverse: bool,
    pub width: usize,
    pub precision: usize,
}

impl View {
    fn visible(&self, t: f64) -> bool {
        match self.x_lims {
            Some((lo, hi)) => t >= lo.min(hi) && t <= lo.max(hi),
            None => true,
        }
    }
}

/// Rows of `(time, original, idealized)` over the visible window.
fn rows(original: &TimeSeries, idealized: Option<&IdealizedSeries>, view: &View) -> Vec<(f64, f64, Option<f64>)> {
    let aligned = idealized.filter(|i| i.time() == original.time());
    original
        .time()
        .iter()
        .zip(original.value())
        .enumerate()
        .filter(|(_, (t, _))| view.visible(**t))
        .map(|(k, (t, v))| {
            let ideal = match aligned {
                Some(i) => Some(i.value()[k]),
                None => idealized.and_then(|i| i.value_at(*t)),
            };
            (*t, *v, ideal)
        })
        .collect()
}

/// Aligned columns of time, original value and idealized value.
pub fn table(original: &TimeSeries, idealized: Option<&IdealizedSeries>, view: &View) -> String {
    let p = view.precision;
    let time_header = format!("{} [{}]", original.time_name, original.time_unit);
    let value_header = format!("{} [{}]", original.value_name, original.value_unit);

    let mut out = format!("{time_header:>16} {value_header:>16}");
    if idealized.is_some() {
        out.push_str(&format!(" {:>16}", "idealized"));
    }
    out.push('\n');

    for (t, v, ideal) in rows(original, idealized, view) {
        out.push_str(&format!("{t:>16.p$} {v:>16.p$}"));
        match ideal {
            Some(i) => out.push_str(&format!(" {i:>16.p$}")),
            None if idealized.is_some() => out.push_str(&format!(" {:>16}", "-")),
            None => {}
        }
        out.push('\n');
    }
    out
}

/// One line per sample: `o` marks the original, `*` the idealized curve,
/// `@` where they coincide. `reverse` flips the value axis.
pub fn chart(original: &TimeSeries, idealized: Option<&IdealizedSeries>, view: &View) -> String {
    let rows = rows(original, idealized, view);
    let width = view.width.max(10);

    let (lo, hi) = rows
        .iter()
        .flat_map(|(_, v, i)| std::iter::once(*v).chain(*i))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)));
    if !lo.is_finite() {
        return "(no samples in view)\n".to_string();
    }
    let span = if hi > lo { hi - lo } else { 1.0 };

    let column = |x: f64| -> usize {
        let frac = (x - lo) / span;
        let frac = if view.reverse { 1.0 - frac } else { frac };
        ((frac * (width - 1) as f64).round() as usize).min(width - 1)
    };

    let title = if idealized.is_some() {
        "Idealized vs. Real Event"
    } else {
        "Plot for labeling"
    };
    let (left, right) = if view.reverse { (hi, lo) } else { (lo, hi) };
    let p = view.precision;
    let mut out = format!("{title}\n{:>12} {left:<.p$} .. {right:.p$}\n", "");
    out.push_str(&format!("{:>12} {}\n", "", "─".repeat(width)));

    for (t, v, ideal) in rows {
        let mut line = vec![' '; width];
        let o = column(v);
        line[o] = 'o';
        if let Some(i) = ideal {
            let c = column(i);
            line[c] = if c == o { '@' } else { '*' };
        }
        let line: String = line.into_iter().collect();
        out.push_str(&format!("{t:>12.1} {}\n", line.trim_end()));
    }
    out.push_str(&format!("{:>12} {}\n", "", "─".repeat(width)));
    out.push_str("o original  * idealized  @ both\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use paleotag_core::{fit, integer_axis, reconstruct, resample, Anchor, Breakpoint, BreakpointSet};

    fn view() -> View {
        View {
            x_lims: None,
            reverse: false,
            width: 11,
            precision: 1,
        }
    }

    fn sample() -> (TimeSeries, IdealizedSeries) {
        let s = TimeSeries::new(vec![0.0, 1.0, 2.0], vec![0.0, 5.0, 10.0])
            .unwrap()
            .with_names("age", "d18O")
            .with_units("yr BP", "permil");
        let u = resample(&s, 1.0).unwrap();
        let set = BreakpointSet::new(0.0, vec![Breakpoint::explicit("end", 1.0, 10.0)]).unwrap();
        let f = fit(&u, &set).unwrap();
        (s, f.idealized)
    }

    #[test]
    fn table_lists_both_series() {
        let (s, i) = sample();
        let out = table(&s, Some(&i), &view());
        let lines: Vec<_> = out.lines().collect();
        assert!(lines[0].contains("age [yr BP]"));
        assert!(lines[0].contains("idealized"));
        assert_eq!(lines.len(), 4);
        assert!(lines[2].trim_end().ends_with("10.0"));
    }

    #[test]
    fn rows_pair_values_on_shared_and_foreign_axes() {
        let (s, i) = sample();
        let ideal: Vec<_> = rows(&s, Some(&i), &view()).into_iter().map(|r| r.2).collect();
        assert_eq!(ideal, vec![Some(0.0), Some(10.0), Some(10.0)]);

        let set = BreakpointSet::new(0.0, vec![Breakpoint::explicit("end", 1.0, 10.0)]).unwrap();
        let f = fit(&resample(&s, 1.0).unwrap(), &set).unwrap();
        let shifted = reconstruct(Anchor::Value(0.0), &integer_axis(-3.0, 1.0), &f.stats).unwrap();
        let ideal: Vec<_> = rows(&s, Some(&shifted), &view()).into_iter().map(|r| r.2).collect();
        assert_eq!(ideal, vec![Some(0.0), Some(10.0), None]);
    }

    #[test]
    fn long_series_rows_stay_aligned() {
        let n = 100_000;
        let time: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let s = TimeSeries::new(time, vec![1.0; n]).unwrap();
        let u = resample(&s, 1.0).unwrap();
        let set = BreakpointSet::new(0.0, vec![Breakpoint::explicit("end", 10.0, 3.0)]).unwrap();
        let f = fit(&u, &set).unwrap();
        let rows = rows(&s, Some(&f.idealized), &view());
        assert_eq!(rows.len(), n);
        assert_eq!(rows[n - 1].2, Some(3.0));
    }

    #[test]
    fn table_respects_x_lims() {
        let (s, _) = sample();
        let v = View { x_lims: Some((2.0, 1.0)), ..view() };
        assert_eq!(table(&s, None, &v).lines().count(), 3);
    }

    #[test]
    fn chart_marks_points_and_flips() {
        let (s, i) = sample();
        let out = chart(&s, Some(&i), &view());
        assert!(out.contains("@"));
        assert!(out.contains("*"));

        let flipped = chart(&s, None, &View { reverse: true, ..view() });
        let first_row = flipped.lines().nth(3).unwrap();
        assert!(first_row.ends_with('o'));
    }

    #[test]
    fn empty_view_says_so() {
        let (s, _) = sample();
        let v = View { x_lims: Some((50.0, 60.0)), ..view() };
        assert_eq!(chart(&s, None, &v), "(no samples in view)\n");
    }
}
