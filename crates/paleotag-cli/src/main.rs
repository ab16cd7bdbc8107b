use std::io;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod prompt;
mod render;

#[derive(Parser)]
#[command(name = "paleotag", version, about = "Label and idealize paleoclimate events")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a `#`-commented text export to CSV
    Convert(commands::convert::ConvertArgs),
    /// Import a headed CSV as a record file
    Import(commands::convert::ImportArgs),
    /// List the columns of a record
    Columns(commands::columns::ColumnsArgs),
    /// Plot a series for labelling
    Show(commands::show::ShowArgs),
    /// Fit an idealized event shape to a series
    Fit(commands::fit::FitArgs),
    /// Rebuild an idealized event from stored stats
    Rebuild(commands::rebuild::RebuildArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Convert(args) => commands::convert::run_convert(args),
        Commands::Import(args) => commands::convert::run_import(args),
        Commands::Columns(args) => commands::columns::run(args),
        Commands::Show(args) => commands::show::run(args),
        Commands::Fit(args) => commands::fit::run(args),
        Commands::Rebuild(args) => commands::rebuild::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
