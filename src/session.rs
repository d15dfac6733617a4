//! Database session interfaces
//!
//! Talking to a live database needs the desktop application's automation
//! interface or an ODBC driver, both of which exist only on suitably
//! provisioned Windows hosts. Commands reach them through these traits so
//! the command logic itself stays testable anywhere.

use std::path::Path;
use std::time::Duration;

use crate::error::{AccdevError, AccdevResult};
use crate::lock;
use crate::object::{ObjectKind, ObjectRef};

/// A table linked into a frontend, with its connect string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedTable {
    pub name: String,
    pub connect: String,
}

/// Automation session against one open database
pub trait AutomationSession: std::fmt::Debug {
    /// Names of every object of `kind`, system objects included
    fn list_objects(&self, kind: ObjectKind) -> AccdevResult<Vec<String>>;

    /// Export one object's definition as text
    fn export_object(&self, object: &ObjectRef) -> AccdevResult<String>;

    /// Create or overwrite one object from definition text
    fn import_object(&self, object: &ObjectRef, definition: &str) -> AccdevResult<()>;

    /// Linked tables with their connect strings
    fn linked_tables(&self) -> AccdevResult<Vec<LinkedTable>>;

    /// Point a linked table at a new connect string
    fn relink_table(&self, name: &str, connect: &str) -> AccdevResult<()>;

    /// Compact and repair the database
    fn compact(&self) -> AccdevResult<()>;
}

/// Row-level session against one open database
pub trait TabularSession: std::fmt::Debug {
    /// User table names
    fn list_tables(&self) -> AccdevResult<Vec<String>>;

    /// All rows of one table, each cell rendered as text
    fn fetch_rows(&self, table: &str) -> AccdevResult<Vec<Vec<String>>>;

    /// Execute a saved query and report how long it took
    fn run_query(&self, name: &str) -> AccdevResult<Duration>;
}

/// Opens sessions against database files on this host
pub trait SessionProvider {
    fn automation(&self, database: &Path) -> AccdevResult<Box<dyn AutomationSession>>;
    fn tabular(&self, database: &Path) -> AccdevResult<Box<dyn TabularSession>>;
}

/// Session provider for the local host.
///
/// Checks that the database file exists and is not held open before
/// attempting to connect, so callers get precise errors for the common
/// failure cases instead of an opaque connect failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostSessions;

impl HostSessions {
    pub fn new() -> Self {
        Self
    }

    fn ensure_database(database: &Path) -> AccdevResult<()> {
        if !database.is_file() {
            return Err(AccdevError::FileNotFound {
                path: database.to_path_buf(),
            });
        }
        lock::ensure_unlocked(database)
    }
}

impl SessionProvider for HostSessions {
    fn automation(&self, database: &Path) -> AccdevResult<Box<dyn AutomationSession>> {
        Self::ensure_database(database)?;
        Err(AccdevError::Upstream {
            operation: "open automation session".to_string(),
            message: format!(
                "no automation bridge is available on this host for {}",
                database.display()
            ),
        })
    }

    fn tabular(&self, database: &Path) -> AccdevResult<Box<dyn TabularSession>> {
        Self::ensure_database(database)?;
        Err(AccdevError::Upstream {
            operation: "open tabular session".to_string(),
            message: format!(
                "no ODBC driver is available on this host for {}",
                database.display()
            ),
        })
    }
}

/// In-memory automation session for testing
///
/// Uses `Arc<Mutex<>>` internally so it can be cloned and inspected after
/// the session has been handed to the code under test.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct FakeAutomation {
    inner: std::sync::Arc<std::sync::Mutex<FakeAutomationState>>,
}

#[cfg(test)]
#[derive(Debug, Default)]
struct FakeAutomationState {
    objects: std::collections::BTreeMap<ObjectRef, String>,
    links: Vec<LinkedTable>,
    relink_calls: Vec<(String, String)>,
    compact_count: usize,
}

#[cfg(test)]
impl FakeAutomation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects(entries: &[(ObjectKind, &str, &str)]) -> Self {
        let fake = Self::new();
        for (kind, name, definition) in entries {
            fake.insert(*kind, name, definition);
        }
        fake
    }

    pub fn insert(&self, kind: ObjectKind, name: &str, definition: &str) {
        let mut state = self.inner.lock().unwrap();
        state
            .objects
            .insert(ObjectRef::new(kind, name), definition.to_string());
    }

    pub fn set_links(&self, links: Vec<LinkedTable>) {
        self.inner.lock().unwrap().links = links;
    }

    pub fn definition(&self, kind: ObjectKind, name: &str) -> Option<String> {
        let state = self.inner.lock().unwrap();
        state.objects.get(&ObjectRef::new(kind, name)).cloned()
    }

    pub fn relink_calls(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().relink_calls.clone()
    }

    pub fn compact_count(&self) -> usize {
        self.inner.lock().unwrap().compact_count
    }
}

#[cfg(test)]
impl AutomationSession for FakeAutomation {
    fn list_objects(&self, kind: ObjectKind) -> AccdevResult<Vec<String>> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .objects
            .keys()
            .filter(|object| object.kind == kind)
            .map(|object| object.name.clone())
            .collect())
    }

    fn export_object(&self, object: &ObjectRef) -> AccdevResult<String> {
        let state = self.inner.lock().unwrap();
        state.objects.get(object).cloned().ok_or_else(|| {
            AccdevError::Upstream {
                operation: format!("export {object}"),
                message: "object not found".to_string(),
            }
        })
    }

    fn import_object(&self, object: &ObjectRef, definition: &str) -> AccdevResult<()> {
        let mut state = self.inner.lock().unwrap();
        state.objects.insert(object.clone(), definition.to_string());
        Ok(())
    }

    fn linked_tables(&self) -> AccdevResult<Vec<LinkedTable>> {
        Ok(self.inner.lock().unwrap().links.clone())
    }

    fn relink_table(&self, name: &str, connect: &str) -> AccdevResult<()> {
        let mut state = self.inner.lock().unwrap();
        state
            .relink_calls
            .push((name.to_string(), connect.to_string()));
        if let Some(link) = state.links.iter_mut().find(|l| l.name == name) {
            link.connect = connect.to_string();
        }
        Ok(())
    }

    fn compact(&self) -> AccdevResult<()> {
        self.inner.lock().unwrap().compact_count += 1;
        Ok(())
    }
}

/// In-memory tabular session for testing
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct FakeTabular {
    inner: std::sync::Arc<std::sync::Mutex<FakeTabularState>>,
}

#[cfg(test)]
#[derive(Debug, Default)]
struct FakeTabularState {
    tables: std::collections::BTreeMap<String, Vec<Vec<String>>>,
    queries: std::collections::BTreeMap<String, (Vec<Duration>, usize)>,
}

#[cfg(test)]
impl FakeTabular {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_table(&self, name: &str, rows: Vec<Vec<String>>) {
        let mut state = self.inner.lock().unwrap();
        state.tables.insert(name.to_string(), rows);
    }

    /// Successive `run_query` calls cycle through `durations`.
    pub fn set_query_timings(&self, name: &str, durations: Vec<Duration>) {
        assert!(!durations.is_empty());
        let mut state = self.inner.lock().unwrap();
        state.queries.insert(name.to_string(), (durations, 0));
    }
}

/// Provider handing out clones of prepared fakes
#[cfg(test)]
#[derive(Clone, Default)]
pub struct FakeProvider {
    pub automation: FakeAutomation,
    pub tabular: FakeTabular,
}

#[cfg(test)]
impl SessionProvider for FakeProvider {
    fn automation(&self, _database: &Path) -> AccdevResult<Box<dyn AutomationSession>> {
        Ok(Box::new(self.automation.clone()))
    }

    fn tabular(&self, _database: &Path) -> AccdevResult<Box<dyn TabularSession>> {
        Ok(Box::new(self.tabular.clone()))
    }
}

#[cfg(test)]
impl TabularSession for FakeTabular {
    fn list_tables(&self) -> AccdevResult<Vec<String>> {
        let state = self.inner.lock().unwrap();
        Ok(state.tables.keys().cloned().collect())
    }

    fn fetch_rows(&self, table: &str) -> AccdevResult<Vec<Vec<String>>> {
        let state = self.inner.lock().unwrap();
        state
            .tables
            .get(table)
            .cloned()
            .ok_or_else(|| AccdevError::Upstream {
                operation: format!("fetch rows of {table}"),
                message: "table not found".to_string(),
            })
    }

    fn run_query(&self, name: &str) -> AccdevResult<Duration> {
        let mut state = self.inner.lock().unwrap();
        let (durations, calls) = state
            .queries
            .get_mut(name)
            .ok_or_else(|| AccdevError::Upstream {
                operation: format!("run query {name}"),
                message: "query not found".to_string(),
            })?;
        let duration = durations[*calls % durations.len()];
        *calls += 1;
        Ok(duration)
    }
}
