use clap::{Parser, Subcommand, ValueEnum};

use aoiwatch_core::hashkey::HashScheme;

#[derive(Parser)]
#[command(
    name = "aoiwatch",
    about = "Aoiwatch: AOI/track completeness evaluation over a record catalog",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one completeness sweep over an area of interest
    Evaluate {
        /// Run context JSON path
        #[arg(long, default_value = "_context.json")]
        context: String,

        /// Catalog records JSONL path
        #[arg(long, default_value = "records.jsonl")]
        records: String,

        /// Directory that receives aggregate artifact directories
        #[arg(long, default_value = ".")]
        artifacts: String,

        /// Content-hash scheme used for identity
        #[arg(long, default_value = "pair-digest")]
        scheme: SchemeArg,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Derive and print the content hash of one record JSON file
    Hash {
        /// Record JSON path
        record: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SchemeArg {
    #[value(name = "pair-digest")]
    PairDigest,
    #[value(name = "split-digest")]
    SplitDigest,
}

impl From<SchemeArg> for HashScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::PairDigest => HashScheme::PairDigest,
            SchemeArg::SplitDigest => HashScheme::SplitDigest,
        }
    }
}
