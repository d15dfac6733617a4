//! Benchmark command handler
//!
//! Times saved queries over repeated runs and reports min/avg/max.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::Config;
use crate::object::{is_system_name, ObjectKind};
use crate::report::{self, BenchmarkReport, QueryTiming};
use crate::session::{HostSessions, SessionProvider, TabularSession};
use crate::ui;

/// Run each query `runs` times and collect timing statistics.
pub fn run_benchmarks(
    session: &dyn TabularSession,
    queries: &[String],
    runs: u32,
) -> crate::error::AccdevResult<Vec<QueryTiming>> {
    let mut timings = Vec::new();
    for name in queries {
        let mut samples = Vec::new();
        for _ in 0..runs {
            samples.push(session.run_query(name)?);
        }
        timings.push(QueryTiming::from_samples(name.clone(), &samples));
    }
    Ok(timings)
}

pub fn cmd_benchmark(
    database: &Path,
    queries: &[String],
    runs: Option<u32>,
    report_target: Option<Option<PathBuf>>,
    config: &Config,
    json: bool,
) -> Result<()> {
    let runs = runs.unwrap_or(config.benchmark.runs).max(1);
    let provider = HostSessions::new();

    let queries: Vec<String> = if queries.is_empty() {
        // Default to every saved query worth timing.
        let automation = provider.automation(database)?;
        automation
            .list_objects(ObjectKind::Query)?
            .into_iter()
            .filter(|name| !is_system_name(name))
            .collect()
    } else {
        queries.to_vec()
    };

    let session = provider.tabular(database)?;
    let timings = run_benchmarks(session.as_ref(), &queries, runs)?;

    if json {
        let items: Vec<serde_json::Value> = timings
            .iter()
            .map(|t| {
                serde_json::json!({
                    "query": t.name,
                    "runs": t.runs,
                    "min_ms": t.min_ms,
                    "avg_ms": t.avg_ms,
                    "max_ms": t.max_ms,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::json!({
                "type": "benchmark_complete",
                "database": database.display().to_string(),
                "runs": runs,
                "timings": items,
            })
        );
    } else {
        let rows: Vec<Vec<String>> = timings
            .iter()
            .map(|t| {
                vec![
                    t.name.clone(),
                    format!("{:.1}", t.min_ms),
                    format!("{:.1}", t.avg_ms),
                    format!("{:.1}", t.max_ms),
                ]
            })
            .collect();
        print!(
            "{}",
            ui::render_table(&["Query", "Min (ms)", "Avg (ms)", "Max (ms)"], &rows)
        );
        println!("✓ Benchmarked {} query(ies), {} runs each", timings.len(), runs);
    }

    if let Some(target) = report_target {
        let path = match target {
            Some(path) => path,
            None => report::default_report_path(&config.report.dir, "benchmark"),
        };
        let html = BenchmarkReport {
            database,
            runs,
            timings: &timings,
        }
        .render();
        report::write_report(&path, &html)?;
        if !json {
            println!("✓ Report written to {}", path.display());
        }
    }

    Ok(())
}
