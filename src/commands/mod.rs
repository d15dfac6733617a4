//! Command handlers
//!
//! One module per subcommand. `run` loads configuration, reports unknown
//! config keys, and dispatches to the handler for the parsed command.

pub mod analyze_usage;
pub mod benchmark;
pub mod deploy;
pub mod diff;
pub mod export;
pub mod interactive;
pub mod load;
pub mod prepare_release;
pub mod schema;
pub mod search;

use anyhow::Result;

use crate::cli::{Cli, Commands};
use crate::config::{Config, ConfigWarning};

pub fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let (config, warnings) = crate::config::load_or_default(&cwd)?;

    if !cli.json {
        print_config_warnings(&warnings);
    }

    dispatch(cli, &config)
}

fn print_config_warnings(warnings: &[ConfigWarning]) {
    for w in warnings {
        if let Some(line) = w.line {
            eprintln!("⚠ Unknown config key '{}' in {}:{}", w.key, w.file.display(), line);
        } else {
            eprintln!("⚠ Unknown config key '{}' in {}", w.key, w.file.display());
        }

        if let Some(suggestion) = &w.suggestion {
            eprintln!("   Did you mean '{}'?\n", suggestion);
        }
    }
}

pub(crate) fn dispatch(cli: Cli, config: &Config) -> Result<()> {
    let json = cli.json;
    let verbose = cli.verbose;

    match cli.command {
        Some(Commands::Deploy {
            source,
            target_dir,
            yes,
        }) => deploy::cmd_deploy(&source, &target_dir, yes, config, json, verbose),
        Some(Commands::Diff {
            old_db,
            new_db,
            report,
            data,
        }) => diff::cmd_diff(&old_db, &new_db, report, data, config, json),
        Some(Commands::Export { database, out }) => {
            export::cmd_export(&database, out.as_deref(), config, json, verbose)
        }
        Some(Commands::Load { database, dir }) => load::cmd_load(&database, &dir, json, verbose),
        Some(Commands::AnalyzeUsage { database, report }) => {
            analyze_usage::cmd_analyze_usage(&database, report, config, json)
        }
        Some(Commands::Benchmark {
            database,
            queries,
            runs,
            report,
        }) => benchmark::cmd_benchmark(&database, &queries, runs, report, config, json),
        Some(Commands::PrepareRelease {
            database,
            output,
            yes,
        }) => prepare_release::cmd_prepare_release(&database, &output, yes, config, json),
        Some(Commands::Search {
            database,
            pattern,
            kind,
        }) => search::cmd_search(&database, &pattern, kind, json),
        None => interactive::cmd_interactive(config, json, verbose),
    }
}
