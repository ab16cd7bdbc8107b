pub mod columns;
pub mod config;
pub mod convert;
pub mod fit;
pub mod rebuild;
pub mod show;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use paleotag_core::{prepare, ArchiveRecord, Config, JsonRecordStore, RecordStore, UniformSeries};

use crate::prompt::Prompter;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Which record and columns make up the series.
#[derive(Args, Clone)]
pub struct SeriesArgs {
    /// Record file
    pub record: PathBuf,
    /// Index of the time column
    #[arg(long)]
    pub time_col: Option<usize>,
    /// Index of the value column
    #[arg(long)]
    pub value_col: Option<usize>,
    /// Keep raw values instead of standardizing
    #[arg(long)]
    pub raw: bool,
    /// Ask for anything not given on the command line
    #[arg(short, long)]
    pub interactive: bool,
}

pub fn load_record(path: &Path) -> Result<ArchiveRecord, Box<dyn std::error::Error>> {
    Ok(JsonRecordStore::new(path).load()?)
}

/// Resolve the time and value columns, prompting for missing ones when
/// interactive.
pub fn select_columns<R: BufRead, W: Write>(
    record: &ArchiveRecord,
    args: &SeriesArgs,
    prompter: &mut Prompter<R, W>,
) -> Result<(usize, usize), Box<dyn std::error::Error>> {
    let names: Vec<String> = record
        .columns
        .iter()
        .map(|c| c.variable_name.clone())
        .collect();
    let mut pick = |given: Option<usize>, flag: &str, label: &str| -> Result<usize, Box<dyn std::error::Error>> {
        match given {
            Some(i) => Ok(i),
            None if args.interactive => Ok(prompter.choose(label, &names)?),
            None => Err(format!("{flag} is required (or pass --interactive)").into()),
        }
    };
    let value_col = pick(args.value_col, "--value-col", "Select the index of the value axis")?;
    let time_col = pick(args.time_col, "--time-col", "Select the index of the time axis")?;
    Ok((time_col, value_col))
}

/// The series as the fit engine sees it: standardized (unless `raw`),
/// converted to the configured unit and resampled to the configured step.
pub fn prepared_series(
    record: &ArchiveRecord,
    time_col: usize,
    value_col: usize,
    raw: bool,
    config: &Config,
) -> Result<UniformSeries, Box<dyn std::error::Error>> {
    let series = record.series_from_columns(time_col, value_col)?;
    let standardize = config.resample.standardize && !raw;
    Ok(prepare(&series, config.time_unit()?, standardize, config.resample.step)?)
}

/// `lo,hi` as accepted by `--x-lims`.
pub fn parse_lims(s: &str) -> Result<(f64, f64), String> {
    let (lo, hi) = s
        .split_once(',')
        .ok_or_else(|| format!("expected 'lo,hi', got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|_| format!("'{v}' is not a number"))
    };
    Ok((parse(lo)?, parse(hi)?))
}

pub fn view(config: &Config, reverse: bool, x_lims: Option<(f64, f64)>) -> crate::render::View {
    crate::render::View {
        x_lims,
        reverse: reverse || config.display.reverse,
        width: config.display.width as usize,
        precision: config.display.precision as usize,
    }
}
