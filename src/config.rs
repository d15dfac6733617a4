//! Configuration for accdev
//!
//! Configuration hierarchy:
//! 1. Environment variables (ACCDEV_*)
//! 2. Project config (./accdev.toml)
//! 3. User config (~/.config/accdev/config.toml)
//! 4. Built-in defaults
//!
//! Unknown keys are surfaced as warnings with a nearest-key suggestion
//! instead of failing the load.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AccdevError, AccdevResult};

/// Project-level config file name, looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "accdev.toml";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub deploy: DeployConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub benchmark: BenchmarkConfig,

    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

/// Deploy engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Seconds between retry passes for failed replacements
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            retry_interval_secs: default_retry_interval_secs(),
        }
    }
}

fn default_retry_interval_secs() -> u64 {
    60
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory receiving exported object definitions
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
        }
    }
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("db_export")
}

/// Benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Times each query is executed
    #[serde(default = "default_benchmark_runs")]
    pub runs: u32,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            runs: default_benchmark_runs(),
        }
    }
}

fn default_benchmark_runs() -> u32 {
    5
}

/// Release preparation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReleaseConfig {
    /// Server name substring to replace in linked-table connection strings
    #[serde(default)]
    pub test_server: String,

    /// Replacement server name for production builds
    #[serde(default)]
    pub prod_server: String,

    /// Path prefix to replace when relinking file-based tables
    #[serde(default)]
    pub old_link_prefix: String,

    /// Replacement path prefix
    #[serde(default)]
    pub new_link_prefix: String,
}

/// Report output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory receiving generated HTML reports
    #[serde(default = "default_report_dir")]
    pub dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            dir: default_report_dir(),
        }
    }
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl Config {
    /// Load a config file, failing on syntax or type errors
    pub fn load(path: &Path) -> AccdevResult<Config> {
        let (config, _warnings) = load_with_warnings(path)?;
        Ok(config)
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> AccdevResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| AccdevError::InvalidConfig {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load from project config, user config, or defaults.
///
/// A file that exists but does not parse is an error; a missing file falls
/// through to the next source.
pub fn load_or_default(project_dir: &Path) -> AccdevResult<(Config, Vec<ConfigWarning>)> {
    let project_config = project_dir.join(PROJECT_CONFIG_FILE);
    if project_config.exists() {
        let (config, warnings) = load_with_warnings(&project_config)?;
        return Ok((with_env_overrides(config), warnings));
    }

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            let (config, warnings) = load_with_warnings(&user_config)?;
            return Ok((with_env_overrides(config), warnings));
        }
    }

    Ok((with_env_overrides(Config::default()), Vec::new()))
}

/// User config location, overridable for tests via ACCDEV_USER_CONFIG_PATH
fn user_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("ACCDEV_USER_CONFIG_PATH") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("accdev/config.toml"))
}

/// Apply environment variable overrides (ACCDEV_* prefix)
pub fn with_env_overrides(mut config: Config) -> Config {
    if let Ok(secs) = std::env::var("ACCDEV_RETRY_INTERVAL_SECS") {
        if let Ok(parsed) = secs.parse::<u64>() {
            config.deploy.retry_interval_secs = parsed;
        }
    }

    if let Ok(dir) = std::env::var("ACCDEV_EXPORT_DIR") {
        if !dir.is_empty() {
            config.export.dir = PathBuf::from(dir);
        }
    }

    if let Ok(runs) = std::env::var("ACCDEV_BENCHMARK_RUNS") {
        if let Ok(parsed) = runs.parse::<u32>() {
            config.benchmark.runs = parsed;
        }
    }

    if let Ok(dir) = std::env::var("ACCDEV_REPORT_DIR") {
        if !dir.is_empty() {
            config.report.dir = PathBuf::from(dir);
        }
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "deploy",
        "retry_interval_secs",
        "export",
        "dir",
        "benchmark",
        "runs",
        "release",
        "test_server",
        "prod_server",
        "old_link_prefix",
        "new_link_prefix",
        "report",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
