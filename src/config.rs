use clap::{Args, Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::generate::CallLogSettings;

/// largest number of records accepted from one source
pub const DEFAULT_MAX_RECORDS: usize = 1_000_000;

/// lines handed to an ingest worker at a time
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

#[derive(Parser, Debug)]
#[command(name = "acquaint")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find who has the most acquaintances in call logs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report the maximum acquaintance count of each call log
    Run(RunArgs),

    /// Write a synthetic call log
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Call logs with one "caller,callee" pair per line
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Worker tasks per phase (defaults to available parallelism)
    #[arg(long, env = "ACQUAINT_WORKERS")]
    pub workers: Option<usize>,

    /// Records allowed per source before it is abandoned
    #[arg(long, env = "ACQUAINT_MAX_RECORDS", default_value_t = DEFAULT_MAX_RECORDS)]
    pub max_records: usize,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Lines per ingest chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn settings(&self) -> RunSettings {
        RunSettings {
            workers: self.workers.unwrap_or_else(default_workers).max(1),
            max_records: self.max_records,
            delimiter: self.delimiter,
            chunk_size: self.chunk_size.max(1),
        }
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// File to write
    #[arg(short, long)]
    pub output: PathBuf,

    /// Number of calls
    #[arg(long, default_value_t = 1000)]
    pub records: usize,

    /// Number of distinct phone numbers
    #[arg(long, default_value_t = 200)]
    pub people: usize,

    /// How many of the people are hubs
    #[arg(long, default_value_t = 0)]
    pub hubs: usize,

    /// Fraction of calls that involve a hub
    #[arg(long, default_value_t = 0.2)]
    pub hub_share: f64,

    /// Seed for a reproducible log
    #[arg(long)]
    pub seed: Option<u64>,

    /// Leave out the "calling,called" header line
    #[arg(long)]
    pub no_header: bool,
}

impl GenerateArgs {
    pub fn settings(&self) -> CallLogSettings {
        CallLogSettings {
            records: self.records,
            people: self.people,
            hubs: self.hubs,
            hub_share: self.hub_share,
            seed: self.seed,
            header: !self.no_header,
        }
    }
}

/// knobs for one batch run, threaded through every source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub workers: usize,
    pub max_records: usize,
    pub delimiter: char,
    pub chunk_size: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        RunSettings {
            workers: default_workers(),
            max_records: DEFAULT_MAX_RECORDS,
            delimiter: ',',
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
