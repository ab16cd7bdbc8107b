use std::path::PathBuf;

use clap::Args;

use super::{load_record, CmdResult};

#[derive(Args)]
pub struct ColumnsArgs {
    /// Record file
    record: PathBuf,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: ColumnsArgs) -> CmdResult {
    let record = load_record(&args.record)?;

    if args.json {
        let listing: Vec<_> = record
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                serde_json::json!({
                    "index": i,
                    "name": c.variable_name,
                    "units": c.units,
                    "event": c.is_event(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("{}", record.dataset_name);
    for (i, c) in record.columns.iter().enumerate() {
        match &c.event {
            Some(event) => println!(
                "{i} : {} ({}, {} realization(s), on {})",
                c.variable_name,
                event.event_type,
                event.realizations.len(),
                event.associated_variable
            ),
            None if c.units.is_empty() => println!("{i} : {}", c.variable_name),
            None => println!("{i} : {} [{}]", c.variable_name, c.units),
        }
    }
    Ok(())
}
