//! Declarative command schema for the interactive menu
//!
//! One spec per subcommand. The menu lists the specs, prompts for each
//! parameter, and assembles an argv that is re-parsed through `Cli`, so
//! the interactive path goes through the same validation as the shell.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Path that must already exist
    ExistingPath,
    /// Path that will be created or overwritten
    NewPath,
    /// Directory path
    Directory,
    /// Free-form text
    Text,
    /// Whitespace-separated list expanded into separate arguments
    TextList,
    /// Unsigned integer
    Integer,
    /// Boolean switch, emitted as `--name` when true
    Flag,
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub positional: bool,
    pub help: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    /// Subcommand name as spelled on the command line
    pub name: &'static str,
    pub about: &'static str,
    /// Destructive commands get a confirmation prompt in the menu and
    /// `--yes` in the rebuilt argv, so they are not asked twice.
    pub destructive: bool,
    pub params: &'static [ParamSpec],
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "deploy",
        about: "Replace every copy of a frontend under a directory tree",
        destructive: true,
        params: &[
            ParamSpec {
                name: "source",
                kind: ParamKind::ExistingPath,
                required: true,
                positional: true,
                help: "Source file to deploy",
            },
            ParamSpec {
                name: "target_dir",
                kind: ParamKind::Directory,
                required: true,
                positional: true,
                help: "Directory tree holding the deployed copies",
            },
        ],
    },
    CommandSpec {
        name: "diff",
        about: "Compare object definitions between two database versions",
        destructive: false,
        params: &[
            ParamSpec {
                name: "old_db",
                kind: ParamKind::ExistingPath,
                required: true,
                positional: true,
                help: "Older version",
            },
            ParamSpec {
                name: "new_db",
                kind: ParamKind::ExistingPath,
                required: true,
                positional: true,
                help: "Newer version",
            },
            ParamSpec {
                name: "data",
                kind: ParamKind::Flag,
                required: false,
                positional: false,
                help: "Also compare table rows",
            },
            ParamSpec {
                name: "report",
                kind: ParamKind::Flag,
                required: false,
                positional: false,
                help: "Write an HTML report to the configured report dir",
            },
        ],
    },
    CommandSpec {
        name: "export",
        about: "Export all object definitions to text files",
        destructive: false,
        params: &[
            ParamSpec {
                name: "database",
                kind: ParamKind::ExistingPath,
                required: true,
                positional: true,
                help: "Database to export from",
            },
            ParamSpec {
                name: "out",
                kind: ParamKind::Directory,
                required: false,
                positional: false,
                help: "Output directory (empty for the config default)",
            },
        ],
    },
    CommandSpec {
        name: "load",
        about: "Import definition files into a database",
        destructive: false,
        params: &[
            ParamSpec {
                name: "database",
                kind: ParamKind::ExistingPath,
                required: true,
                positional: true,
                help: "Database to import into",
            },
            ParamSpec {
                name: "dir",
                kind: ParamKind::Directory,
                required: true,
                positional: true,
                help: "Directory of definition files",
            },
        ],
    },
    CommandSpec {
        name: "analyze-usage",
        about: "List saved queries nothing else references",
        destructive: false,
        params: &[
            ParamSpec {
                name: "database",
                kind: ParamKind::ExistingPath,
                required: true,
                positional: true,
                help: "Database to analyze",
            },
            ParamSpec {
                name: "report",
                kind: ParamKind::Flag,
                required: false,
                positional: false,
                help: "Write an HTML report to the configured report dir",
            },
        ],
    },
    CommandSpec {
        name: "benchmark",
        about: "Time saved queries over repeated runs",
        destructive: false,
        params: &[
            ParamSpec {
                name: "database",
                kind: ParamKind::ExistingPath,
                required: true,
                positional: true,
                help: "Database holding the queries",
            },
            ParamSpec {
                name: "queries",
                kind: ParamKind::TextList,
                required: false,
                positional: true,
                help: "Queries to time, space separated (empty for all)",
            },
            ParamSpec {
                name: "runs",
                kind: ParamKind::Integer,
                required: false,
                positional: false,
                help: "Runs per query (empty for the config default)",
            },
            ParamSpec {
                name: "report",
                kind: ParamKind::Flag,
                required: false,
                positional: false,
                help: "Write an HTML report to the configured report dir",
            },
        ],
    },
    CommandSpec {
        name: "prepare-release",
        about: "Build a distributable copy pointed at production",
        destructive: true,
        params: &[
            ParamSpec {
                name: "database",
                kind: ParamKind::ExistingPath,
                required: true,
                positional: true,
                help: "Development frontend to release",
            },
            ParamSpec {
                name: "output",
                kind: ParamKind::NewPath,
                required: true,
                positional: true,
                help: "Where to write the release copy",
            },
        ],
    },
    CommandSpec {
        name: "search",
        about: "Search object definitions for a substring",
        destructive: false,
        params: &[
            ParamSpec {
                name: "database",
                kind: ParamKind::ExistingPath,
                required: true,
                positional: true,
                help: "Database to search",
            },
            ParamSpec {
                name: "pattern",
                kind: ParamKind::Text,
                required: true,
                positional: true,
                help: "Case-insensitive substring to look for",
            },
            ParamSpec {
                name: "kind",
                kind: ParamKind::Text,
                required: false,
                positional: false,
                help: "Object kind: form, report, macro, module, query (empty for all)",
            },
        ],
    },
];

/// Assemble an argv for `spec` from prompted values.
///
/// Missing or empty optional values are dropped; flags are emitted only
/// when their value is the literal `"true"`.
pub fn build_argv(spec: &CommandSpec, values: &[(&str, String)]) -> Vec<String> {
    let mut argv = vec!["accdev".to_string(), spec.name.to_string()];
    for param in spec.params {
        let value = values
            .iter()
            .find(|(name, _)| *name == param.name)
            .map(|(_, v)| v.trim().to_string())
            .unwrap_or_default();
        match param.kind {
            ParamKind::Flag => {
                if value == "true" {
                    argv.push(format!("--{}", param.name));
                }
            }
            ParamKind::TextList => {
                argv.extend(value.split_whitespace().map(str::to_string));
            }
            _ => {
                if value.is_empty() {
                    continue;
                }
                if param.positional {
                    argv.push(value);
                } else {
                    argv.push(format!("--{}", param.name));
                    argv.push(value);
                }
            }
        }
    }
    if spec.destructive {
        argv.push("--yes".to_string());
    }
    argv
}
