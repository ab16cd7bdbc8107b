use clap::Args;
use paleotag_core::Config;

use super::{load_record, parse_lims, prepared_series, select_columns, view, CmdResult, SeriesArgs};
use crate::prompt::Prompter;
use crate::render;

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    series: SeriesArgs,
    /// Flip the value axis
    #[arg(long)]
    reverse: bool,
    /// Time window to display, as `lo,hi`
    #[arg(long, value_parser = parse_lims, allow_hyphen_values = true)]
    x_lims: Option<(f64, f64)>,
    /// Print a table instead of a chart
    #[arg(long)]
    table: bool,
}

pub fn run(args: ShowArgs) -> CmdResult {
    let config = Config::load()?;
    let record = load_record(&args.series.record)?;
    let mut prompter = Prompter::stdio();
    let (time_col, value_col) = select_columns(&record, &args.series, &mut prompter)?;
    let series = prepared_series(&record, time_col, value_col, args.series.raw, &config)?;

    let view = view(&config, args.reverse, args.x_lims);
    if args.table {
        print!("{}", render::table(&series, None, &view));
    } else {
        print!("{}", render::chart(&series, None, &view));
    }
    Ok(())
}
