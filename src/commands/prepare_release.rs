//! Release build command handler
//!
//! Copies a development frontend and rewrites it for production: linked
//! tables point at the production server, debug output is silenced, and
//! the copy is compacted. A failed build never leaves a partial output
//! file behind.

use std::fs;
use std::path::Path;

use anyhow::Result;
use is_terminal::IsTerminal;

use crate::config::{Config, ReleaseConfig};
use crate::error::{AccdevError, AccdevResult};
use crate::lock;
use crate::object::{is_system_name, ObjectKind, ObjectRef};
use crate::release::{comment_debug_prints, rewrite_connect};
use crate::session::{HostSessions, SessionProvider};
use crate::ui;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseOutcome {
    /// Linked tables whose connect string changed
    pub relinked: usize,
    /// Modules that had active debug output commented out
    pub modules_cleaned: usize,
}

/// Copy `database` to `output` and rewrite the copy for production.
pub fn build_release(
    provider: &dyn SessionProvider,
    database: &Path,
    output: &Path,
    release: &ReleaseConfig,
) -> AccdevResult<ReleaseOutcome> {
    if !database.is_file() {
        return Err(AccdevError::FileNotFound {
            path: database.to_path_buf(),
        });
    }
    lock::ensure_unlocked(database)?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::copy(database, output)?;

    let result = (|| {
        let session = provider.automation(output)?;
        let mut outcome = ReleaseOutcome::default();

        for link in session.linked_tables()? {
            let rewritten = rewrite_connect(&link.connect, release);
            if rewritten != link.connect {
                session.relink_table(&link.name, &rewritten)?;
                outcome.relinked += 1;
            }
        }

        for name in session.list_objects(ObjectKind::Module)? {
            if is_system_name(&name) {
                continue;
            }
            let object = ObjectRef::new(ObjectKind::Module, name);
            let text = session.export_object(&object)?;
            let (cleaned, count) = comment_debug_prints(&text);
            if count > 0 {
                session.import_object(&object, &cleaned)?;
                outcome.modules_cleaned += 1;
            }
        }

        session.compact()?;
        Ok(outcome)
    })();

    if result.is_err() {
        let _ = fs::remove_file(output);
    }
    result
}

pub fn cmd_prepare_release(
    database: &Path,
    output: &Path,
    yes: bool,
    config: &Config,
    json: bool,
) -> Result<()> {
    if !yes && !json && std::io::stdin().is_terminal() {
        let prompt = format!(
            "Build release copy of {} at {}?",
            database.display(),
            output.display()
        );
        if !ui::confirm(&prompt, true)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    let outcome = build_release(&HostSessions::new(), database, output, &config.release)?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "type": "release_complete",
                "database": database.display().to_string(),
                "output": output.display().to_string(),
                "relinked": outcome.relinked,
                "modules_cleaned": outcome.modules_cleaned,
            })
        );
        return Ok(());
    }

    println!("  ✓ relinked {} table(s)", outcome.relinked);
    println!(
        "  ✓ cleaned debug output in {} module(s)",
        outcome.modules_cleaned
    );
    println!("  ✓ compacted");
    println!("✓ Release copy written to {}", output.display());
    Ok(())
}
