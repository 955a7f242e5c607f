//! Aoiwatch CLI: the `aoiwatch` command.

mod cli;
mod commands;
mod context;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            context,
            records,
            artifacts,
            scheme,
            json,
        } => commands::evaluate::run(context, records, artifacts, scheme, json),

        Commands::Hash { record, json } => commands::hash::run(record, json),
    }
}
