//! Diff command handler
//!
//! Compares two database versions object by object, optionally row by
//! row, and renders the result to the terminal and an HTML report.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::Config;
use crate::diff::{self, DefinitionChanges, RowChanges};
use crate::error::AccdevResult;
use crate::object::{is_compiled_database, is_system_name};
use crate::report::{self, DiffReport};
use crate::session::{HostSessions, SessionProvider, TabularSession};

use super::export::collect_definitions;

/// Row comparison across the tables both versions have.
#[derive(Debug, Clone, Default)]
pub struct TableDataDiff {
    /// Shared tables with their row changes
    pub tables: Vec<(String, RowChanges)>,
    /// Tables present only in the old version
    pub only_old: Vec<String>,
    /// Tables present only in the new version
    pub only_new: Vec<String>,
}

impl TableDataDiff {
    pub fn has_changes(&self) -> bool {
        !self.only_old.is_empty()
            || !self.only_new.is_empty()
            || self.tables.iter().any(|(_, rows)| rows.has_changes())
    }
}

/// Compare the rows of every shared non-system table.
pub fn compare_table_data(
    old: &dyn TabularSession,
    new: &dyn TabularSession,
) -> AccdevResult<TableDataDiff> {
    let old_tables: Vec<String> = old
        .list_tables()?
        .into_iter()
        .filter(|name| !is_system_name(name))
        .collect();
    let new_tables: Vec<String> = new
        .list_tables()?
        .into_iter()
        .filter(|name| !is_system_name(name))
        .collect();

    let mut result = TableDataDiff::default();
    for table in &old_tables {
        if !new_tables.contains(table) {
            result.only_old.push(table.clone());
            continue;
        }
        let old_rows = old.fetch_rows(table)?;
        let new_rows = new.fetch_rows(table)?;
        result
            .tables
            .push((table.clone(), diff::diff_rows(&old_rows, &new_rows)));
    }
    for table in &new_tables {
        if !old_tables.contains(table) {
            result.only_new.push(table.clone());
        }
    }
    Ok(result)
}

pub fn cmd_diff(
    old_db: &Path,
    new_db: &Path,
    report_target: Option<Option<PathBuf>>,
    data: bool,
    config: &Config,
    json: bool,
) -> Result<()> {
    let provider = HostSessions::new();
    let old_session = provider.automation(old_db)?;
    let new_session = provider.automation(new_db)?;

    // Compiled frontends carry no module source, so comparing modules
    // against a full version would report every module as missing.
    let include_modules = !is_compiled_database(old_db) && !is_compiled_database(new_db);
    let old_defs = collect_definitions(old_session.as_ref(), include_modules)?;
    let new_defs = collect_definitions(new_session.as_ref(), include_modules)?;
    let changes = diff::diff_definitions(&old_defs, &new_defs);

    let table_data = if data {
        let old_tab = provider.tabular(old_db)?;
        let new_tab = provider.tabular(new_db)?;
        compare_table_data(old_tab.as_ref(), new_tab.as_ref())?
    } else {
        TableDataDiff::default()
    };

    if json {
        emit_json(&changes, data.then_some(&table_data));
    } else {
        render_human(&changes, data.then_some(&table_data));
    }

    if let Some(target) = report_target {
        let path = match target {
            Some(path) => path,
            None => report::default_report_path(&config.report.dir, "diff"),
        };
        let html = DiffReport {
            old_db,
            new_db,
            changes: &changes,
            data: &table_data.tables,
        }
        .render();
        report::write_report(&path, &html)?;
        if !json {
            println!("✓ Report written to {}", path.display());
        }
    }

    Ok(())
}

fn emit_json(changes: &DefinitionChanges, table_data: Option<&TableDataDiff>) {
    let added: Vec<String> = changes.added.iter().map(|o| o.to_string()).collect();
    let removed: Vec<String> = changes.removed.iter().map(|o| o.to_string()).collect();
    let changed: Vec<serde_json::Value> = changes
        .changed
        .iter()
        .map(|c| {
            serde_json::json!({
                "object": c.object.to_string(),
                "additions": c.additions,
                "deletions": c.deletions,
            })
        })
        .collect();

    let mut out = serde_json::json!({
        "type": "diff_complete",
        "added": added,
        "removed": removed,
        "changed": changed,
        "unchanged": changes.unchanged,
    });
    if let Some(data) = table_data {
        out["tables"] = serde_json::json!({
            "only_old": data.only_old,
            "only_new": data.only_new,
            "changed": data
                .tables
                .iter()
                .filter(|(_, rows)| rows.has_changes())
                .map(|(name, rows)| {
                    serde_json::json!({
                        "table": name,
                        "only_old_rows": rows.only_old.len(),
                        "only_new_rows": rows.only_new.len(),
                        "truncated": rows.truncated,
                    })
                })
                .collect::<Vec<_>>(),
        });
    }
    println!("{out}");
}

fn render_human(changes: &DefinitionChanges, table_data: Option<&TableDataDiff>) {
    for object in &changes.added {
        println!("+ added   {object}");
    }
    for object in &changes.removed {
        println!("- removed {object}");
    }
    for changed in &changes.changed {
        println!();
        print!("{}", changed.unified);
    }

    if let Some(data) = table_data {
        for table in &data.only_old {
            println!("- table only in old version: {table}");
        }
        for table in &data.only_new {
            println!("+ table only in new version: {table}");
        }
        for (table, rows) in &data.tables {
            if !rows.has_changes() {
                continue;
            }
            println!();
            println!("Table {table}:");
            for row in &rows.only_old {
                println!("  - {}", row.join(" | "));
            }
            for row in &rows.only_new {
                println!("  + {}", row.join(" | "));
            }
            if rows.truncated {
                println!("  (row list truncated)");
            }
        }
    }

    println!();
    let data_changed = table_data.map(TableDataDiff::has_changes).unwrap_or(false);
    if !changes.has_changes() && !data_changed {
        println!("✓ No differences");
    } else {
        println!(
            "⚠ {} added, {} removed, {} changed, {} unchanged",
            changes.added.len(),
            changes.removed.len(),
            changes.changed.len(),
            changes.unchanged
        );
    }
}
