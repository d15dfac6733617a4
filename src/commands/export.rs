//! Export command handler
//!
//! Pulls every object definition out of a database, either onto disk as
//! one text file per object, or into memory for the commands that
//! compare and search definitions.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::Config;
use crate::error::AccdevResult;
use crate::object::{is_system_name, ObjectKind, ObjectRef};
use crate::session::{AutomationSession, HostSessions, SessionProvider};

/// Export every non-system object definition to `out_dir`, one file per
/// object with the kind's extension.
pub fn export_objects(
    session: &dyn AutomationSession,
    out_dir: &Path,
) -> AccdevResult<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();
    for kind in ObjectKind::ALL {
        for name in session.list_objects(kind)? {
            if is_system_name(&name) {
                continue;
            }
            let object = ObjectRef::new(kind, name);
            let definition = session.export_object(&object)?;
            let path = out_dir.join(object.file_name());
            fs::write(&path, &definition)?;
            written.push(path);
        }
    }
    Ok(written)
}

/// Export every non-system object definition into a map, for diffing and
/// searching. `include_modules` is off when the database is compiled and
/// module text is unavailable.
pub fn collect_definitions(
    session: &dyn AutomationSession,
    include_modules: bool,
) -> AccdevResult<BTreeMap<ObjectRef, String>> {
    let mut definitions = BTreeMap::new();
    for kind in ObjectKind::ALL {
        if kind == ObjectKind::Module && !include_modules {
            continue;
        }
        for name in session.list_objects(kind)? {
            if is_system_name(&name) {
                continue;
            }
            let object = ObjectRef::new(kind, name);
            let definition = session.export_object(&object)?;
            definitions.insert(object, definition);
        }
    }
    Ok(definitions)
}

pub fn cmd_export(
    database: &Path,
    out: Option<&Path>,
    config: &Config,
    json: bool,
    verbose: u8,
) -> Result<()> {
    let out_dir = out.map(Path::to_path_buf).unwrap_or_else(|| config.export.dir.clone());

    let session = HostSessions::new().automation(database)?;
    let written = export_objects(session.as_ref(), &out_dir)?;

    if json {
        let files: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
        println!(
            "{}",
            serde_json::json!({
                "type": "export_complete",
                "database": database.display().to_string(),
                "dir": out_dir.display().to_string(),
                "count": files.len(),
                "files": files,
            })
        );
        return Ok(());
    }

    if verbose > 0 {
        for path in &written {
            println!("  ✓ {}", path.display());
        }
    }
    println!(
        "✓ Exported {} object(s) to {}",
        written.len(),
        out_dir.display()
    );
    Ok(())
}
