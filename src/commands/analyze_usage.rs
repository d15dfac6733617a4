//! Usage analysis command handler
//!
//! Finds saved queries that nothing else references, the usual leftovers
//! after years of iterating on a frontend.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::Config;
use crate::object::{ObjectKind, ObjectRef};
use crate::report::{self, UsageReport};
use crate::session::{HostSessions, SessionProvider};

use super::export::collect_definitions;

/// Queries whose name appears in no other definition.
///
/// The scan is a case-insensitive substring match across every other
/// object's text, so a query referenced from a form's record source, a
/// macro argument, or another query's SQL all count as used.
pub fn find_unused_queries(definitions: &BTreeMap<ObjectRef, String>) -> Vec<String> {
    let mut unused = Vec::new();
    for candidate in definitions.keys() {
        if candidate.kind != ObjectKind::Query {
            continue;
        }
        let needle = candidate.name.to_lowercase();
        let referenced = definitions.iter().any(|(object, text)| {
            object != candidate && text.to_lowercase().contains(&needle)
        });
        if !referenced {
            unused.push(candidate.name.clone());
        }
    }
    unused
}

pub fn cmd_analyze_usage(
    database: &Path,
    report_target: Option<Option<PathBuf>>,
    config: &Config,
    json: bool,
) -> Result<()> {
    let session = HostSessions::new().automation(database)?;
    let definitions = collect_definitions(session.as_ref(), true)?;
    let candidates = definitions
        .keys()
        .filter(|o| o.kind == ObjectKind::Query)
        .count();
    let unused = find_unused_queries(&definitions);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "type": "usage_complete",
                "database": database.display().to_string(),
                "candidates": candidates,
                "unused": unused,
            })
        );
    } else if unused.is_empty() {
        println!("✓ All {candidates} queries are referenced somewhere");
    } else {
        for name in &unused {
            println!("  ⚠ {name}");
        }
        println!(
            "⚠ {} of {candidates} queries are referenced nowhere",
            unused.len()
        );
    }

    if let Some(target) = report_target {
        let path = match target {
            Some(path) => path,
            None => report::default_report_path(&config.report.dir, "usage"),
        };
        let html = UsageReport {
            database,
            candidates,
            unused: &unused,
        }
        .render();
        report::write_report(&path, &html)?;
        if !json {
            println!("✓ Report written to {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defs(entries: &[(ObjectKind, &str, &str)]) -> BTreeMap<ObjectRef, String> {
        entries
            .iter()
            .map(|(kind, name, text)| (ObjectRef::new(*kind, *name), text.to_string()))
            .collect()
    }

    #[test]
    fn query_used_by_a_form_is_not_reported() {
        let definitions = defs(&[
            (ObjectKind::Query, "qryOrders", "SELECT * FROM Orders;"),
            (ObjectKind::Form, "frmMain", "RecordSource: qryOrders"),
        ]);
        assert!(find_unused_queries(&definitions).is_empty());
    }

    #[test]
    fn reference_match_ignores_case() {
        let definitions = defs(&[
            (ObjectKind::Query, "qryOrders", "SELECT 1;"),
            (ObjectKind::Module, "modRun", "DoCmd.OpenQuery \"QRYORDERS\""),
        ]);
        assert!(find_unused_queries(&definitions).is_empty());
    }

    #[test]
    fn unreferenced_query_is_reported() {
        let definitions = defs(&[
            (ObjectKind::Query, "qryDead", "SELECT 1;"),
            (ObjectKind::Query, "qryLive", "SELECT 2;"),
            (ObjectKind::Form, "frmMain", "RecordSource: qryLive"),
        ]);
        assert_eq!(find_unused_queries(&definitions), vec!["qryDead".to_string()]);
    }

    #[test]
    fn self_reference_does_not_count_as_usage() {
        // A query whose SQL mentions its own name is still unused.
        let definitions = defs(&[(
            ObjectKind::Query,
            "qryLoop",
            "SELECT 'qryLoop' AS Src FROM T;",
        )]);
        assert_eq!(find_unused_queries(&definitions), vec!["qryLoop".to_string()]);
    }

    #[test]
    fn queries_referencing_each_other_are_used() {
        let definitions = defs(&[
            (ObjectKind::Query, "qryBase", "SELECT * FROM T;"),
            (ObjectKind::Query, "qryTop", "SELECT * FROM qryBase;"),
            (ObjectKind::Form, "frmMain", "RecordSource: qryTop"),
        ]);
        assert!(find_unused_queries(&definitions).is_empty());
    }
}
