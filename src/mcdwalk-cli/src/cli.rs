//! CLI argument definitions for mcdwalk

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mcdwalk")]
#[command(
    about = "Decode pointer-linked reflection structures from memory dumps",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk the record list in a dump and write the decoded document
    #[command(visible_alias = "w")]
    Walk(WalkArgs),

    /// Validate a walk configuration and print its field layout
    #[command(visible_alias = "c")]
    Check {
        /// Walk configuration file (.yaml/.yml or .toml)
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args)]
pub struct WalkArgs {
    /// Walk configuration file (.yaml/.yml or .toml)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Dump file (overrides `dump` in the configuration)
    #[arg(short, long)]
    pub dump: Option<PathBuf>,

    /// Address of the first record, hex or decimal (overrides `base_address`)
    #[arg(short, long, value_parser = mcdwalk::parse_address)]
    pub base: Option<u64>,

    /// Maximum number of records to decode (overrides `max_records`)
    #[arg(short, long)]
    pub max_records: Option<usize>,

    /// Output JSON path (overrides `output`; prints to stdout if neither is set)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print a table preview; without configured columns, every top-level field
    #[arg(short, long)]
    pub table: bool,

    /// Table columns, comma separated (overrides `table`)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,
}
