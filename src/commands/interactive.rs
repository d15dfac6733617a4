//! Interactive menu shown when no subcommand is given
//!
//! Prompts are driven by the command schema: pick a command, answer one
//! question per parameter, and the answers are rebuilt into an argv and
//! dispatched exactly as if typed at the shell.

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use dialoguer::{Confirm, FuzzySelect, Input};
use is_terminal::IsTerminal;

use crate::cli::Cli;
use crate::commands::schema::{self, CommandSpec, ParamKind, ParamSpec, COMMANDS};
use crate::config::Config;

pub fn cmd_interactive(config: &Config, json: bool, verbose: u8) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "type": "interactive",
                "commands": COMMANDS.iter().map(|c| c.name).collect::<Vec<_>>(),
            })
        );
        return Ok(());
    }

    if !std::io::stdin().is_terminal() {
        println!("No command provided.");
        println!("Try: `accdev deploy` or `accdev --help`");
        return Ok(());
    }

    println!("accdev {}\n", env!("CARGO_PKG_VERSION"));

    let mut items: Vec<String> = COMMANDS
        .iter()
        .enumerate()
        .map(|(i, c)| format!("[{}] {:<16} {}", i + 1, c.name, c.about))
        .collect();
    items.push(format!("[{}] Quit", COMMANDS.len() + 1));

    let selection = FuzzySelect::new()
        .with_prompt("What would you like to do?")
        .items(&items)
        .default(0)
        .interact()?;

    let Some(spec) = COMMANDS.get(selection) else {
        return Ok(());
    };

    run_command(spec, config, verbose)
}

fn run_command(spec: &CommandSpec, config: &Config, verbose: u8) -> Result<()> {
    println!();
    let mut values: Vec<(&str, String)> = Vec::new();
    for param in spec.params {
        values.push((param.name, prompt_value(param)?));
    }

    let argv = schema::build_argv(spec, &values);
    println!("\nRunning: {}\n", argv.join(" "));

    if spec.destructive {
        if !Confirm::new()
            .with_prompt("Proceed?")
            .default(true)
            .interact()?
        {
            println!("Aborted.");
            return Ok(());
        }
    }

    let mut cli = Cli::try_parse_from(&argv)?;
    cli.verbose = verbose;
    super::dispatch(cli, config)
}

fn prompt_value(param: &ParamSpec) -> Result<String> {
    match param.kind {
        ParamKind::Flag => {
            let on = Confirm::new()
                .with_prompt(param.help)
                .default(false)
                .interact()?;
            Ok(if on { "true" } else { "false" }.to_string())
        }
        ParamKind::ExistingPath => {
            let value = Input::<String>::new()
                .with_prompt(param.help)
                .validate_with(|input: &String| -> Result<(), &str> {
                    if Path::new(input.trim()).exists() {
                        Ok(())
                    } else {
                        Err("path does not exist")
                    }
                })
                .interact_text()?;
            Ok(value)
        }
        ParamKind::Integer => {
            let mut input = Input::<String>::new().with_prompt(param.help);
            if !param.required {
                input = input.allow_empty(true);
            }
            let value = input
                .validate_with(|input: &String| -> Result<(), &str> {
                    if input.trim().is_empty() || input.trim().parse::<u32>().is_ok() {
                        Ok(())
                    } else {
                        Err("enter a whole number")
                    }
                })
                .interact_text()?;
            Ok(value)
        }
        ParamKind::NewPath | ParamKind::Directory | ParamKind::Text | ParamKind::TextList => {
            let mut input = Input::<String>::new().with_prompt(param.help);
            if !param.required {
                input = input.allow_empty(true);
            }
            Ok(input.interact_text()?)
        }
    }
}
