//! CLI argument parsing
//!
//! Global flags (--json, --verbose) are inherited by all subcommands.
//! Invoking with no subcommand drops into the interactive menu, so both
//! entry paths end up parsed through this one definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::object::ObjectKind;

/// Accdev - developer toolkit for Microsoft Access databases
#[derive(Parser, Debug)]
#[command(name = "accdev")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Run 'accdev' without arguments for the interactive menu.")]
pub struct Cli {
    /// Machine-readable NDJSON event output
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace every copy of a frontend under a directory tree
    Deploy {
        /// Source file to deploy
        source: PathBuf,

        /// Directory tree holding the deployed copies
        target_dir: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Compare object definitions between two database versions
    Diff {
        /// Older version
        old_db: PathBuf,

        /// Newer version
        new_db: PathBuf,

        /// Write an HTML report, to FILE or the configured report dir
        #[arg(long, value_name = "FILE")]
        report: Option<Option<PathBuf>>,

        /// Also compare table rows
        #[arg(long)]
        data: bool,
    },

    /// Export all object definitions to text files
    Export {
        /// Database to export from
        database: PathBuf,

        /// Output directory (default from config)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Import definition files into a database
    Load {
        /// Database to import into
        database: PathBuf,

        /// Directory of definition files
        dir: PathBuf,
    },

    /// List saved queries nothing else references
    AnalyzeUsage {
        /// Database to analyze
        database: PathBuf,

        /// Write an HTML report, to FILE or the configured report dir
        #[arg(long, value_name = "FILE")]
        report: Option<Option<PathBuf>>,
    },

    /// Time saved queries over repeated runs
    Benchmark {
        /// Database holding the queries
        database: PathBuf,

        /// Queries to run (default: every non-system saved query)
        queries: Vec<String>,

        /// Runs per query (default from config)
        #[arg(short, long)]
        runs: Option<u32>,

        /// Write an HTML report, to FILE or the configured report dir
        #[arg(long, value_name = "FILE")]
        report: Option<Option<PathBuf>>,
    },

    /// Build a distributable copy pointed at production
    PrepareRelease {
        /// Development frontend to release
        database: PathBuf,

        /// Where to write the release copy
        output: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Search object definitions for a substring
    Search {
        /// Database to search
        database: PathBuf,

        /// Case-insensitive substring to look for
        pattern: String,

        /// Restrict the search to one object kind
        #[arg(long, value_enum)]
        kind: Option<ObjectKind>,
    },
}
