//! Load command handler
//!
//! Imports definition files into a database, the inverse of `export`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error::{AccdevError, AccdevResult};
use crate::object::{ObjectKind, ObjectRef};
use crate::session::{AutomationSession, HostSessions, SessionProvider};

/// Import every recognized definition file in `dir`.
///
/// Files with other extensions are ignored; the object name is the file
/// stem. Processing order is sorted for deterministic output.
pub fn load_directory(
    session: &dyn AutomationSession,
    dir: &Path,
) -> AccdevResult<Vec<ObjectRef>> {
    if !dir.is_dir() {
        return Err(AccdevError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let mut loaded = Vec::new();
    for path in files {
        let kind = match path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ObjectKind::from_extension)
        {
            Some(kind) => kind,
            None => continue,
        };
        let name = match path.file_stem().and_then(|s| s.to_str()) {
            Some(name) => name,
            None => continue,
        };

        let definition = fs::read_to_string(&path)?;
        let object = ObjectRef::new(kind, name);
        session.import_object(&object, &definition)?;
        loaded.push(object);
    }
    Ok(loaded)
}

pub fn cmd_load(database: &Path, dir: &Path, json: bool, verbose: u8) -> Result<()> {
    let session = HostSessions::new().automation(database)?;
    let loaded = load_directory(session.as_ref(), dir)?;

    if json {
        let objects: Vec<String> = loaded.iter().map(|o| o.to_string()).collect();
        println!(
            "{}",
            serde_json::json!({
                "type": "load_complete",
                "database": database.display().to_string(),
                "dir": dir.display().to_string(),
                "count": objects.len(),
                "objects": objects,
            })
        );
        return Ok(());
    }

    if verbose > 0 {
        for object in &loaded {
            println!("  ✓ {object}");
        }
    }
    println!("✓ Loaded {} object(s) into {}", loaded.len(), database.display());
    Ok(())
}
