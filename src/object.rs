//! Database object model
//!
//! The kinds of objects a database exposes through its automation interface,
//! with the file extensions used for exported definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of database object
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Form,
    Report,
    Macro,
    Module,
    Query,
}

impl ObjectKind {
    /// Every kind, in export order
    pub const ALL: [ObjectKind; 5] = [
        ObjectKind::Form,
        ObjectKind::Report,
        ObjectKind::Macro,
        ObjectKind::Module,
        ObjectKind::Query,
    ];

    /// File extension for exported definitions of this kind
    pub fn extension(&self) -> &'static str {
        match self {
            ObjectKind::Form => "frm",
            ObjectKind::Report => "rpt",
            ObjectKind::Macro => "mcr",
            ObjectKind::Module => "bas",
            ObjectKind::Query => "qry",
        }
    }

    /// Kind for a definition-file extension, if recognized
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "frm" => Some(ObjectKind::Form),
            "rpt" => Some(ObjectKind::Report),
            "mcr" => Some(ObjectKind::Macro),
            "bas" => Some(ObjectKind::Module),
            "qry" => Some(ObjectKind::Query),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Form => "form",
            ObjectKind::Report => "report",
            ObjectKind::Macro => "macro",
            ObjectKind::Module => "module",
            ObjectKind::Query => "query",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One named object of a given kind
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectRef {
    pub kind: ObjectKind,
    pub name: String,
}

impl ObjectRef {
    pub fn new(kind: ObjectKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// File name used when exporting this object's definition
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.kind.extension())
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

/// System and temporary object names (`MSys*` catalog tables, `~`-prefixed
/// scratch queries) are excluded from exports, searches, and usage analysis.
pub fn is_system_name(name: &str) -> bool {
    name.starts_with('~') || name.starts_with("MSys")
}

/// Compiled databases carry no editable module source
pub fn is_compiled_database(path: &std::path::Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref(),
        Some("accde") | Some("mde")
    )
}
