//! Properties of the definition text tooling.
//!
//! The release cleaner, the data differ, and the definition search all
//! operate on arbitrary exported text, so their invariants are checked
//! against generated modules and row sets.

use std::collections::BTreeMap;

use proptest::prelude::*;

use accdev::commands::search::search_definitions;
use accdev::diff::{diff_definitions, diff_rows};
use accdev::object::{ObjectKind, ObjectRef};
use accdev::release::comment_debug_prints;

/// A small module of plausible VBA lines, debug output included.
fn module_text() -> impl Strategy<Value = String> {
    let line = prop_oneof![
        Just("Sub Demo()".to_string()),
        Just("End Sub".to_string()),
        Just("    total = total + 1".to_string()),
        Just("Debug.Print \"trace\"".to_string()),
        Just("    Debug.Print total".to_string()),
        Just("    'Debug.Print total".to_string()),
        Just(String::new()),
        "[ -~]{0,40}",
    ];
    proptest::collection::vec(line, 0..20).prop_map(|lines| lines.join("\n"))
}

fn rows() -> impl Strategy<Value = Vec<Vec<String>>> {
    proptest::collection::vec(proptest::collection::vec("[a-z]{0,6}", 1..4), 0..30)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    })]

    /// PROPERTY: Commenting debug output is idempotent; a second pass
    /// finds nothing left to comment.
    #[test]
    fn commenting_debug_prints_is_idempotent(text in module_text()) {
        let (once, _) = comment_debug_prints(&text);
        let (twice, count) = comment_debug_prints(&once);
        prop_assert_eq!(count, 0);
        prop_assert_eq!(twice, once);
    }

    /// PROPERTY: Commenting debug output never adds or removes lines.
    #[test]
    fn commenting_debug_prints_preserves_line_count(text in module_text()) {
        let (cleaned, _) = comment_debug_prints(&text);
        prop_assert_eq!(cleaned.lines().count(), text.lines().count());
    }

    /// PROPERTY: A definition map diffed against itself reports no
    /// changes and counts every object as unchanged.
    #[test]
    fn definitions_diffed_against_themselves_are_unchanged(
        texts in proptest::collection::vec(module_text(), 0..6),
    ) {
        let map: BTreeMap<ObjectRef, String> = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| (ObjectRef::new(ObjectKind::Module, format!("mod{i}")), text))
            .collect();

        let changes = diff_definitions(&map, &map);
        prop_assert!(!changes.has_changes());
        prop_assert_eq!(changes.unchanged, map.len());
    }

    /// PROPERTY: Row comparison ignores row order; any reordering of the
    /// same rows shows no changes.
    #[test]
    fn row_diff_ignores_row_order(rows in rows(), rotation in 0usize..30) {
        let mut reordered = rows.clone();
        reordered.reverse();
        if !reordered.is_empty() {
            let mid = rotation % reordered.len();
            reordered.rotate_left(mid);
        }

        let changes = diff_rows(&rows, &reordered);
        prop_assert!(!changes.has_changes(), "spurious changes: {:?}", changes);
    }

    /// PROPERTY: Every reported search match really contains the pattern,
    /// ignoring case.
    #[test]
    fn search_matches_contain_the_pattern(needle in "[a-z]{1,8}", text in module_text()) {
        let mut definitions = BTreeMap::new();
        definitions.insert(ObjectRef::new(ObjectKind::Module, "modGen"), text);

        for found in search_definitions(&definitions, &needle, None) {
            prop_assert!(
                found.line.to_lowercase().contains(&needle),
                "line {:?} does not contain {:?}",
                found.line,
                needle
            );
        }
    }

    /// PROPERTY: A definition that contains the pattern is always found,
    /// whatever the surrounding text and case.
    #[test]
    fn search_finds_a_planted_pattern(needle in "[a-z]{2,8}", prefix in "[A-Z ]{0,10}") {
        let mut definitions = BTreeMap::new();
        definitions.insert(
            ObjectRef::new(ObjectKind::Query, "qryGen"),
            format!("0123456789;\n{}{}", prefix, needle.to_uppercase()),
        );

        let matches = search_definitions(&definitions, &needle, None);
        prop_assert_eq!(matches.len(), 1);
        prop_assert_eq!(matches[0].line_number, 2);
    }
}
