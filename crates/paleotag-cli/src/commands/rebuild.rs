use std::path::PathBuf;

use clap::Args;
use paleotag_core::{integer_axis, reconstruct, Anchor, ArchiveRecord, Config};

use super::{load_record, parse_lims, prepared_series, view, CmdResult};
use crate::render;

#[derive(Args)]
pub struct RebuildArgs {
    /// Record file
    record: PathBuf,
    /// Event number
    #[arg(long)]
    event: u32,
    /// Realization number
    #[arg(long, default_value_t = 0)]
    realization: u32,
    /// Index of the time column
    #[arg(long, default_value_t = 0)]
    time_col: usize,
    /// Index of the value column (defaults to the event's associated variable)
    #[arg(long)]
    value_col: Option<usize>,
    /// Keep raw values instead of standardizing
    #[arg(long)]
    raw: bool,
    /// Rebuild on an integer axis from this baseline instead of the series
    #[arg(long, allow_negative_numbers = true)]
    baseline: Option<f64>,
    /// Integer axis bounds for --baseline, as `lo,hi` (defaults to the event)
    #[arg(long, value_parser = parse_lims, allow_hyphen_values = true)]
    span: Option<(f64, f64)>,
    /// Flip the value axis
    #[arg(long)]
    reverse: bool,
    /// Time window to display, as `lo,hi`
    #[arg(long, value_parser = parse_lims, allow_hyphen_values = true)]
    x_lims: Option<(f64, f64)>,
    /// Print a table instead of a chart
    #[arg(long)]
    table: bool,
    /// Print the idealized series as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: RebuildArgs) -> CmdResult {
    let config = Config::load()?;
    let record = load_record(&args.record)?;
    let name = ArchiveRecord::event_column_name(args.event);
    let stats = &record
        .realization(args.event, args.realization)
        .ok_or_else(|| format!("{name} has no realization {}", args.realization))?
        .stats;

    let (idealized, original) = match args.baseline {
        Some(baseline) => {
            let (lo, hi) = args.span.unwrap_or((stats.event_start, stats.event_end));
            let axis = integer_axis(lo, hi);
            (reconstruct(Anchor::Value(baseline), &axis, stats)?, None)
        }
        None => {
            let value_col = match args.value_col {
                Some(i) => i,
                None => record
                    .events()
                    .find(|c| c.variable_name == name)
                    .and_then(|c| c.event.as_ref())
                    .map(|e| e.associated_variable_index)
                    .ok_or_else(|| format!("{name} has no associated variable"))?,
            };
            let series = prepared_series(&record, args.time_col, value_col, args.raw, &config)?;
            let idealized = reconstruct(Anchor::Series(&series), series.time(), stats)?;
            (idealized, Some(series))
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&idealized)?);
        return Ok(());
    }

    let view = view(&config, args.reverse, args.x_lims);
    let original = match original {
        Some(series) => series.into_inner(),
        None => idealized.to_series()?,
    };
    if args.table {
        print!("{}", render::table(&original, Some(&idealized), &view));
    } else {
        print!("{}", render::chart(&original, Some(&idealized), &view));
    }
    Ok(())
}
