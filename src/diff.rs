//! Definition and data diffing
//!
//! Compares exported object definitions between two database versions,
//! and optionally the rows of shared tables. Line diffs wrap the
//! `similar` crate; object-level changes are computed over definition
//! maps keyed by [`ObjectRef`].

use std::collections::BTreeMap;

use similar::{ChangeTag, TextDiff};

use crate::object::ObjectRef;

/// Most data rows reported per side before the comparison truncates.
pub const MAX_DATA_ROWS: usize = 100;

/// Type of change in a line diff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTag {
    Delete,
    Insert,
    Equal,
}

impl From<ChangeTag> for DiffTag {
    fn from(tag: ChangeTag) -> Self {
        match tag {
            ChangeTag::Delete => DiffTag::Delete,
            ChangeTag::Insert => DiffTag::Insert,
            ChangeTag::Equal => DiffTag::Equal,
        }
    }
}

/// A single line change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub tag: DiffTag,
    /// Line number in the old version (if applicable)
    pub old_line: Option<usize>,
    /// Line number in the new version (if applicable)
    pub new_line: Option<usize>,
    pub content: String,
}

/// Result of diffing two definition texts
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    pub lines: Vec<DiffLine>,
    pub additions: usize,
    pub deletions: usize,
    pub has_changes: bool,
}

impl DiffResult {
    /// Only the insertions and deletions
    pub fn changed_lines(&self) -> Vec<&DiffLine> {
        self.lines
            .iter()
            .filter(|l| l.tag != DiffTag::Equal)
            .collect()
    }

    /// Short change summary, e.g. `+5, -3`
    pub fn summary(&self) -> String {
        format!("+{}, -{}", self.additions, self.deletions)
    }
}

/// Compute the line diff between two definition texts.
pub fn diff_text(old: &str, new: &str) -> DiffResult {
    let text_diff = TextDiff::from_lines(old, new);
    let mut result = DiffResult::default();

    for change in text_diff.iter_all_changes() {
        let tag = DiffTag::from(change.tag());
        match tag {
            DiffTag::Delete => result.deletions += 1,
            DiffTag::Insert => result.additions += 1,
            DiffTag::Equal => {}
        }
        result.lines.push(DiffLine {
            tag,
            old_line: change.old_index().map(|i| i + 1),
            new_line: change.new_index().map(|i| i + 1),
            content: change.value().to_string(),
        });
    }

    result.has_changes = result.additions > 0 || result.deletions > 0;
    result
}

/// Render a unified diff with three lines of context.
pub fn unified(old: &str, new: &str, old_label: &str, new_label: &str) -> String {
    let text_diff = TextDiff::from_lines(old, new);
    text_diff
        .unified_diff()
        .context_radius(3)
        .header(old_label, new_label)
        .to_string()
}

/// One object whose definition differs between versions
#[derive(Debug, Clone)]
pub struct ChangedDefinition {
    pub object: ObjectRef,
    pub additions: usize,
    pub deletions: usize,
    /// Rendered unified diff of the definition text
    pub unified: String,
}

/// Object-level change set between two definition maps
#[derive(Debug, Clone, Default)]
pub struct DefinitionChanges {
    pub added: Vec<ObjectRef>,
    pub removed: Vec<ObjectRef>,
    pub changed: Vec<ChangedDefinition>,
    pub unchanged: usize,
}

impl DefinitionChanges {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty() || !self.changed.is_empty()
    }
}

/// Compare two definition maps object by object.
///
/// Maps are keyed by [`ObjectRef`], so results come out sorted by kind
/// and name.
pub fn diff_definitions(
    old: &BTreeMap<ObjectRef, String>,
    new: &BTreeMap<ObjectRef, String>,
) -> DefinitionChanges {
    let mut changes = DefinitionChanges::default();

    for (object, old_text) in old {
        match new.get(object) {
            None => changes.removed.push(object.clone()),
            Some(new_text) if new_text == old_text => changes.unchanged += 1,
            Some(new_text) => {
                let result = diff_text(old_text, new_text);
                let file = object.file_name();
                changes.changed.push(ChangedDefinition {
                    object: object.clone(),
                    additions: result.additions,
                    deletions: result.deletions,
                    unified: unified(
                        old_text,
                        new_text,
                        &format!("a/{file}"),
                        &format!("b/{file}"),
                    ),
                });
            }
        }
    }
    for object in new.keys() {
        if !old.contains_key(object) {
            changes.added.push(object.clone());
        }
    }

    changes
}

/// Row-level change set for one table
#[derive(Debug, Clone, Default)]
pub struct RowChanges {
    /// Rows present only in the old version
    pub only_old: Vec<Vec<String>>,
    /// Rows present only in the new version
    pub only_new: Vec<Vec<String>>,
    /// A side hit [`MAX_DATA_ROWS`] and further rows were dropped
    pub truncated: bool,
}

impl RowChanges {
    pub fn has_changes(&self) -> bool {
        !self.only_old.is_empty() || !self.only_new.is_empty()
    }
}

/// Compare two row sets as multisets, ignoring order.
pub fn diff_rows(old: &[Vec<String>], new: &[Vec<String>]) -> RowChanges {
    let mut counts: BTreeMap<&[String], i64> = BTreeMap::new();
    for row in old {
        *counts.entry(row.as_slice()).or_insert(0) += 1;
    }
    for row in new {
        *counts.entry(row.as_slice()).or_insert(0) -= 1;
    }

    let mut changes = RowChanges::default();
    for (row, count) in counts {
        if count == 0 {
            continue;
        }
        let (side, copies) = if count > 0 {
            (&mut changes.only_old, count)
        } else {
            (&mut changes.only_new, -count)
        };
        for _ in 0..copies {
            if side.len() >= MAX_DATA_ROWS {
                changes.truncated = true;
                break;
            }
            side.push(row.to_vec());
        }
    }

    changes
}
