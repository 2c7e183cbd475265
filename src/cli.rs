//! Command-line surface, following the same `Cli`/`Commands` derive pattern
//! the reference binary used for its own subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(name = "splicegraph-rs", version, about = "Assemble splice graphs and hyperedges from bundles of spliced RNA-seq alignments")]
pub struct Cli {
    /// Increase logging verbosity (repeatable: -v, -vv, -vvv).
    #[clap(short, long, parse(from_occurrences), global = true)]
    pub verbose: u8,

    /// Suppress all logging below errors.
    #[clap(short, long, global = true)]
    pub quiet: bool,

    /// Override pipeline tunables from a YAML file (see `splicegraph::Config`).
    #[clap(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub commands: Commands,
}

impl Cli {
    /// The verbosity level handed to `logger::Logger::init`.
    pub fn log_verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose + 1
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble every bundle in a fixture file and print a human-readable
    /// dump of its splice graph and hyperedges.
    Dump {
        /// Path to a line-based bundle fixture file.
        input: PathBuf,
    },
    /// Assemble a fixture's first bundle and print GTF transcript lines for
    /// a caller-supplied pexon path through its splice graph.
    Gtf {
        /// Path to a line-based bundle fixture file.
        input: PathBuf,

        /// Zero-based pexon indices the transcript traverses, in order.
        #[clap(long, value_delimiter = ',', required = true)]
        path: Vec<usize>,

        #[clap(long, default_value = "gene")]
        gene_id: String,

        #[clap(long, default_value = "transcript")]
        transcript_id: String,
    },
}
