//! Accdev - developer toolkit for Microsoft Access databases
//!
//! Accdev automates the unglamorous parts of Access frontend development:
//! deploying a frontend to every workstation copy under a share, diffing
//! object definitions between versions, exporting and loading definitions
//! as plain text, and building production release copies.

pub mod cancel;
pub mod cli;
pub mod commands;
pub mod config;
pub mod deploy;
pub mod diff;
pub mod error;
pub mod fingerprint;
pub mod lock;
pub mod object;
pub mod release;
pub mod report;
pub mod session;
pub mod ui;

// Re-exports for convenience
pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::{AccdevError, AccdevResult};
pub use object::{ObjectKind, ObjectRef};

pub fn run(cli: Cli) -> anyhow::Result<()> {
    commands::run(cli)
}
