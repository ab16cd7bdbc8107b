use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Args;
use paleotag_core::{
    event_labels, fit, AmplitudeMode, ArchiveRecord, Breakpoint, BreakpointScheme, BreakpointSet,
    Config, EventEntry, EventStats, JsonRecordStore, RecordStore,
};
use tracing::{debug, info};

use super::{load_record, parse_lims, prepared_series, select_columns, view, CmdResult, SeriesArgs};
use crate::prompt::{parse_f64, parse_u32, time_within, Prompter};
use crate::render;

#[derive(Args)]
pub struct FitArgs {
    #[command(flatten)]
    series: SeriesArgs,
    /// Event start, in units of the time axis
    #[arg(long, allow_negative_numbers = true)]
    start: Option<f64>,
    /// Breakpoint layout: staged, spline, or comma-separated names
    #[arg(long)]
    scheme: Option<String>,
    /// Where targets come from: explicit or series
    #[arg(long)]
    amplitude: Option<String>,
    /// Breakpoint as `name=time[:amplitude]`; `name=` marks it absent
    #[arg(long = "bp", value_name = "SPEC")]
    breakpoints: Vec<String>,
    /// Shift the displayed idealized curve up or down
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    v_shift: f64,
    /// Flip the value axis
    #[arg(long)]
    reverse: bool,
    /// Time window to display, as `lo,hi`
    #[arg(long, value_parser = parse_lims, allow_hyphen_values = true)]
    x_lims: Option<(f64, f64)>,
    /// Print a table instead of a chart
    #[arg(long)]
    table: bool,
    /// Print the stats record as JSON only
    #[arg(long)]
    json: bool,

    /// Store the event in this record file (may be the input)
    #[arg(long)]
    save: Option<PathBuf>,
    /// Event number for the stored entry
    #[arg(long)]
    event: Option<u32>,
    /// Realization number for the stored entry
    #[arg(long)]
    realization: Option<u32>,
    /// Event type, e.g. heinrich or 8.2ka
    #[arg(long)]
    event_type: Option<String>,
    /// Column index of the variable the event belongs to
    #[arg(long)]
    associated_index: Option<usize>,
}

/// One `--bp` value: `name=time[:amplitude]`.
#[derive(Debug, Clone, PartialEq)]
struct BreakpointSpec {
    name: String,
    time: Option<f64>,
    amplitude: Option<f64>,
}

fn parse_spec(spec: &str) -> Result<BreakpointSpec, String> {
    let (name, rest) = spec
        .split_once('=')
        .ok_or_else(|| format!("breakpoint '{spec}' should look like name=time[:amplitude]"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("breakpoint '{spec}' has no name"));
    }
    let rest = rest.trim();
    let (time, amplitude) = match rest.split_once(':') {
        Some((t, a)) => (t.trim(), Some(a.trim())),
        None => (rest, None),
    };
    let time = if time.is_empty() {
        None
    } else {
        Some(parse_f64(time)?)
    };
    let amplitude = amplitude.filter(|a| !a.is_empty()).map(parse_f64).transpose()?;
    Ok(BreakpointSpec {
        name: name.to_string(),
        time,
        amplitude,
    })
}

/// Turn the command line (and answers, when interactive) into breakpoints in
/// scheme order.
fn collect_breakpoints<R: BufRead, W: Write>(
    scheme: &BreakpointScheme,
    mode: AmplitudeMode,
    specs: &[String],
    range: (f64, f64),
    prompter: Option<&mut Prompter<R, W>>,
) -> Result<Vec<Breakpoint>, Box<dyn std::error::Error>> {
    let names = scheme.names();
    let mut given: HashMap<String, BreakpointSpec> = HashMap::new();
    for raw in specs {
        let spec = parse_spec(raw)?;
        if !names.contains(&spec.name) {
            return Err(format!(
                "'{}' is not a breakpoint of scheme '{scheme}' ({})",
                spec.name,
                names.join(", ")
            )
            .into());
        }
        if given.insert(spec.name.clone(), spec).is_some() {
            return Err(format!("breakpoint given twice: {raw}").into());
        }
    }

    let mut prompter = prompter;
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let spec = match (given.remove(&name), prompter.as_deref_mut()) {
            (Some(spec), _) => spec,
            (None, Some(p)) => {
                let time = p.ask_optional(
                    &format!("Enter {name} timing (blank if absent)"),
                    time_within(range.0, range.1),
                )?;
                let amplitude = match (time, mode) {
                    (Some(_), AmplitudeMode::Explicit) => {
                        Some(p.ask(&format!("Enter {name} amplitude"), parse_f64)?)
                    }
                    _ => None,
                };
                BreakpointSpec {
                    name,
                    time,
                    amplitude,
                }
            }
            (None, None) => BreakpointSpec {
                name,
                time: None,
                amplitude: None,
            },
        };

        let bp = match mode {
            AmplitudeMode::Explicit => Breakpoint::from_pair(spec.name, spec.time, spec.amplitude)?,
            AmplitudeMode::Series => {
                if spec.amplitude.is_some() {
                    return Err(format!(
                        "breakpoint '{}' has an amplitude but amplitudes come from the series \
                         (use --amplitude explicit)",
                        spec.name
                    )
                    .into());
                }
                match spec.time {
                    Some(t) => Breakpoint::lookup(spec.name, t),
                    None => Breakpoint::skipped(spec.name),
                }
            }
        };
        out.push(bp);
    }
    Ok(out)
}

fn print_stats(stats: &EventStats, precision: usize) {
    println!("event_start  {}", stats.event_start);
    for s in &stats.segments {
        println!("{:<12} dur {:>6}  amp {:>12.precision$}", s.name, s.dur, s.amp);
    }
    println!("event_end    {}", stats.event_end);
}

pub fn run(args: FitArgs) -> CmdResult {
    let config = Config::load()?;
    let record = load_record(&args.series.record)?;
    let mut prompter = Prompter::stdio();
    let interactive = args.series.interactive;

    let (time_col, value_col) = select_columns(&record, &args.series, &mut prompter)?;
    let series = prepared_series(&record, time_col, value_col, args.series.raw, &config)?;
    let range = series
        .time_range()
        .ok_or("the selected series is empty")?;

    let scheme: BreakpointScheme = match &args.scheme {
        Some(s) => s.parse()?,
        None => config.scheme()?,
    };
    let mode: AmplitudeMode = match &args.amplitude {
        Some(s) => s.parse()?,
        None if args.scheme.is_some() => scheme.default_amplitude(),
        None => config.amplitude_mode()?,
    };

    let start = match args.start {
        Some(t) => t,
        None if interactive => prompter.ask(
            "When does the event begin in units of the time axis",
            time_within(range.0, range.1),
        )?,
        None => return Err("--start is required (or pass --interactive)".into()),
    };

    let breakpoints = collect_breakpoints(
        &scheme,
        mode,
        &args.breakpoints,
        range,
        interactive.then_some(&mut prompter),
    )?;
    let set = BreakpointSet::new(start, breakpoints)?;
    let fitted = fit(&series, &set)?;
    info!(
        scheme = %scheme,
        amplitude = %mode,
        start,
        end = fitted.stats.event_end,
        "fitted event"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&fitted.stats)?);
    } else {
        let view = view(&config, args.reverse, args.x_lims);
        let shown = fitted.idealized.shifted(args.v_shift);
        print_stats(&fitted.stats, view.precision);
        if args.table {
            print!("{}", render::table(&series, Some(&shown), &view));
        } else {
            print!("{}", render::chart(&series, Some(&shown), &view));
        }
    }

    if let Some(path) = &args.save {
        let mut record = record;
        let entry = event_entry(&args, &config, &mut prompter, &record, time_col, value_col, fitted.stats)?;
        let (event_num, realization_num) = (entry.event_num, entry.realization_num);
        record.attach_event(entry)?;
        let store = JsonRecordStore::new(path);
        store.save(&record)?;
        eprintln!(
            "Saved {} realization {realization_num} to {}",
            ArchiveRecord::event_column_name(event_num),
            store.location()
        );
    }
    Ok(())
}

fn event_entry<R: BufRead, W: Write>(
    args: &FitArgs,
    config: &Config,
    prompter: &mut Prompter<R, W>,
    record: &ArchiveRecord,
    time_col: usize,
    value_col: usize,
    stats: EventStats,
) -> Result<EventEntry, Box<dyn std::error::Error>> {
    let interactive = args.series.interactive;
    let event_num = match args.event {
        Some(n) => n,
        None if interactive => prompter.ask(
            "What event num would you like to use for this event entry?",
            parse_u32,
        )?,
        None => return Err("--event is required with --save".into()),
    };
    let realization_num = match args.realization {
        Some(n) => n,
        None if interactive => prompter.ask(
            "What realization num would you like to use for this realization entry?",
            parse_u32,
        )?,
        None => 0,
    };

    // Labels follow the table's own rows, which may be in any time order.
    let times = record.times_in_unit(time_col, config.time_unit()?)?;
    let labels = event_labels(&times, &stats);
    debug!(
        rows = labels.len(),
        labelled = labels.iter().filter(|l| **l == 1).count(),
        "labelled table rows"
    );

    Ok(EventEntry {
        event_num,
        realization_num,
        event_type: args
            .event_type
            .clone()
            .unwrap_or_else(|| config.archive.default_event_type.clone()),
        associated_variable_index: args.associated_index.unwrap_or(value_col),
        labels,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_prompt() -> Option<&'static mut Prompter<&'static [u8], Vec<u8>>> {
        None
    }

    #[test]
    fn spec_forms() {
        assert_eq!(
            parse_spec("first=12").unwrap(),
            BreakpointSpec { name: "first".into(), time: Some(12.0), amplitude: None }
        );
        assert_eq!(
            parse_spec("end=-4:2.5").unwrap(),
            BreakpointSpec { name: "end".into(), time: Some(-4.0), amplitude: Some(2.5) }
        );
        assert_eq!(parse_spec("middle=").unwrap().time, None);
        assert!(parse_spec("=3").is_err());
        assert!(parse_spec("first").is_err());
        assert!(parse_spec("first=x").is_err());
    }

    #[test]
    fn unnamed_breakpoints_are_absent() {
        let bps = collect_breakpoints(
            &BreakpointScheme::Spline,
            AmplitudeMode::Series,
            &["third=9".into()],
            (0.0, 10.0),
            no_prompt(),
        )
        .unwrap();
        assert_eq!(
            bps,
            vec![
                Breakpoint::skipped("first"),
                Breakpoint::skipped("second"),
                Breakpoint::lookup("third", 9.0),
            ]
        );
    }

    #[test]
    fn explicit_mode_needs_both_halves() {
        let err = collect_breakpoints(
            &BreakpointScheme::Staged,
            AmplitudeMode::Explicit,
            &["beginning=3".into()],
            (0.0, 10.0),
            no_prompt(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("beginning"));
    }

    #[test]
    fn series_mode_rejects_amplitudes() {
        assert!(collect_breakpoints(
            &BreakpointScheme::Spline,
            AmplitudeMode::Series,
            &["first=3:1.0".into()],
            (0.0, 10.0),
            no_prompt(),
        )
        .is_err());
    }

    #[test]
    fn unknown_and_repeated_names_are_rejected() {
        for specs in [vec!["fourth=2".to_string()], vec!["first=2".into(), "first=3".into()]] {
            assert!(collect_breakpoints(
                &BreakpointScheme::Spline,
                AmplitudeMode::Series,
                &specs,
                (0.0, 10.0),
                no_prompt(),
            )
            .is_err());
        }
    }

    #[test]
    fn interactive_answers_fill_the_gaps() {
        let mut p = Prompter::new("4\n1.5\n\n20\n8\n-2\n".as_bytes(), Vec::new());
        let bps = collect_breakpoints(
            &BreakpointScheme::Staged,
            AmplitudeMode::Explicit,
            &[],
            (0.0, 10.0),
            Some(&mut p),
        )
        .unwrap();
        assert_eq!(
            bps,
            vec![
                Breakpoint::explicit("beginning", 4.0, 1.5),
                Breakpoint::skipped("middle"),
                Breakpoint::explicit("end", 8.0, -2.0),
            ]
        );
    }
}
