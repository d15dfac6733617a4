//! Definition search command handler

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use crate::object::{ObjectKind, ObjectRef};
use crate::session::{HostSessions, SessionProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub object: ObjectRef,
    pub line_number: usize,
    pub line: String,
}

/// Case-insensitive substring search across object definitions.
pub fn search_definitions(
    definitions: &BTreeMap<ObjectRef, String>,
    pattern: &str,
    kind: Option<ObjectKind>,
) -> Vec<SearchMatch> {
    let needle = pattern.to_lowercase();
    let mut matches = Vec::new();
    for (object, definition) in definitions {
        if let Some(k) = kind {
            if object.kind != k {
                continue;
            }
        }
        for (index, line) in definition.lines().enumerate() {
            if line.to_lowercase().contains(&needle) {
                matches.push(SearchMatch {
                    object: object.clone(),
                    line_number: index + 1,
                    line: line.to_string(),
                });
            }
        }
    }
    matches
}

pub fn cmd_search(
    database: &Path,
    pattern: &str,
    kind: Option<ObjectKind>,
    json: bool,
) -> Result<()> {
    let provider = HostSessions::new();
    let session = provider.automation(database)?;
    let definitions = super::export::collect_definitions(session.as_ref(), true)?;
    let matches = search_definitions(&definitions, pattern, kind);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "type": "search_complete",
                "database": database.display().to_string(),
                "pattern": pattern,
                "matches": matches.iter().map(|m| {
                    serde_json::json!({
                        "object": m.object.to_string(),
                        "line": m.line_number,
                        "text": m.line,
                    })
                }).collect::<Vec<_>>(),
            })
        );
        return Ok(());
    }

    for m in &matches {
        println!("{}:{}: {}", m.object, m.line_number, m.line.trim_end());
    }
    if matches.is_empty() {
        println!("✓ No matches for '{pattern}'");
    } else {
        println!("✓ {} match(es) for '{pattern}'", matches.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definitions() -> BTreeMap<ObjectRef, String> {
        let mut map = BTreeMap::new();
        map.insert(
            ObjectRef::new(ObjectKind::Query, "qryOrders"),
            "SELECT *\nFROM Orders\nWHERE Shipped = False;".to_string(),
        );
        map.insert(
            ObjectRef::new(ObjectKind::Module, "modMain"),
            "Sub Load()\n    OpenQuery \"qryOrders\"\nEnd Sub".to_string(),
        );
        map
    }

    #[test]
    fn matching_is_case_insensitive() {
        let matches = search_definitions(&definitions(), "FROM ORDERS", None);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].object, ObjectRef::new(ObjectKind::Query, "qryOrders"));
        assert_eq!(matches[0].line, "FROM Orders");
    }

    #[test]
    fn kind_filter_narrows_the_haystack() {
        let all = search_definitions(&definitions(), "qryOrders", None);
        let modules_only =
            search_definitions(&definitions(), "qryOrders", Some(ObjectKind::Module));

        assert_eq!(all.len(), 2);
        assert_eq!(modules_only.len(), 1);
        assert_eq!(
            modules_only[0].object,
            ObjectRef::new(ObjectKind::Module, "modMain")
        );
    }

    #[test]
    fn line_numbers_are_one_based() {
        let matches = search_definitions(&definitions(), "Shipped", None);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].line_number, 3);
    }

    #[test]
    fn no_matches_returns_empty() {
        assert!(search_definitions(&definitions(), "tblMissing", None).is_empty());
    }
}
