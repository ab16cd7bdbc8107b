use std::path::PathBuf;

use clap::Args;
use paleotag_core::convert::{record_from_csv, text_to_csv};
use paleotag_core::{JsonRecordStore, RecordStore};

use super::CmdResult;

#[derive(Args)]
pub struct ConvertArgs {
    /// Text export with `#` metadata lines and tab-separated data
    input: PathBuf,
    /// Output CSV (defaults to the input with a .csv extension)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Headed CSV file
    input: PathBuf,
    /// Dataset name (defaults to the file stem)
    #[arg(long)]
    name: Option<String>,
    /// Output record (defaults to the input with a .json extension)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run_convert(args: ConvertArgs) -> CmdResult {
    let written = text_to_csv(&args.input, args.output.as_deref())?;
    println!("{}", written.display());
    Ok(())
}

pub fn run_import(args: ImportArgs) -> CmdResult {
    let name = args.name.unwrap_or_else(|| {
        args.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset".to_string())
    });
    let record = record_from_csv(&args.input, &name)?;
    let store = JsonRecordStore::new(
        args.output
            .unwrap_or_else(|| args.input.with_extension("json")),
    );
    store.save(&record)?;
    eprintln!(
        "Imported {} columns into {}",
        record.columns.len(),
        store.location()
    );
    println!("{}", store.path().display());
    Ok(())
}
