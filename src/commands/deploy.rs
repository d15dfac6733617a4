//! Deploy command handler
//!
//! Drives the deploy engine and renders its events, either as glyph
//! lines for humans or as NDJSON for machines.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use is_terminal::IsTerminal;

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::deploy::{self, DeployEvent, DeployOptions};
use crate::ui;

pub fn cmd_deploy(
    source: &Path,
    target_dir: &Path,
    yes: bool,
    config: &Config,
    json: bool,
    verbose: u8,
) -> Result<()> {
    if !yes && !json && std::io::stdin().is_terminal() {
        let prompt = format!(
            "Replace every copy of {} under {}?",
            source.display(),
            target_dir.display()
        );
        if !ui::confirm(&prompt, true)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    let cancel = CancelToken::new();
    cancel.install_ctrlc_handler()?;

    let options = DeployOptions {
        retry_interval: Duration::from_secs(config.deploy.retry_interval_secs),
    };

    // Partial failure is reported in the summary, not via the exit code;
    // only precondition errors propagate.
    deploy::deploy(source, target_dir, &options, &cancel, |event| {
        if json {
            println!("{}", event.to_json());
        } else {
            render_event(&event, verbose);
        }
    })?;

    Ok(())
}

fn render_event(event: &DeployEvent, verbose: u8) {
    match event {
        DeployEvent::RunStarted {
            source,
            target_root,
            targets,
        } => {
            println!("🚀 Deploying {source} to {targets} target(s) under {target_root}");
        }
        DeployEvent::UpToDate { path } => {
            if verbose > 0 {
                println!("  ✓ up to date: {path}");
            }
        }
        DeployEvent::Replaced { path } => {
            println!("  ✓ replaced: {path}");
        }
        DeployEvent::ReplaceFailed {
            path,
            message,
            retryable,
        } => {
            if *retryable {
                println!("  ⚠ {path}: {message} (will retry)");
            } else {
                println!("  ✗ {path}: {message}");
            }
        }
        DeployEvent::FallbackCopy { destination } => {
            println!("  ⚠ no existing copies found, copying to {destination}");
        }
        DeployEvent::RetryWait {
            pending,
            interval_secs,
        } => {
            println!("⏳ {pending} target(s) still busy, retrying in {interval_secs}s (Ctrl+C to stop)");
        }
        DeployEvent::RetryPass { pending } => {
            if verbose > 0 {
                println!("  retrying {pending} target(s)");
            }
        }
        DeployEvent::Cancelled { pending } => {
            println!("✗ Cancelled with {pending} target(s) not deployed");
        }
        DeployEvent::RunComplete {
            total,
            succeeded,
            failed,
        } => {
            if *failed == 0 {
                println!("✓ Deployed {succeeded}/{total} file(s)");
            } else {
                println!("⚠ Deployed {succeeded}/{total} file(s), {failed} failed");
            }
        }
    }
}
