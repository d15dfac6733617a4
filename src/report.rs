//! HTML report rendering
//!
//! Fixed templates with `{{placeholder}}` substitution, no templating
//! engine. Every piece of interpolated user text goes through
//! [`html_escape`] first; placeholders whose values are built here are
//! inserted as-is.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;

use crate::diff::{DefinitionChanges, RowChanges, MAX_DATA_ROWS};
use crate::error::AccdevResult;

const DIFF_TEMPLATE: &str = include_str!("report/templates/diff.html");
const USAGE_TEMPLATE: &str = include_str!("report/templates/usage.html");
const BENCHMARK_TEMPLATE: &str = include_str!("report/templates/benchmark.html");

/// Escape text for interpolation into HTML content.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    out
}

fn generated_line() -> String {
    format!(
        "{} by accdev {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        env!("CARGO_PKG_VERSION")
    )
}

/// Unified diff text as HTML, one span class per line kind.
fn colorize_unified(unified: &str) -> String {
    let mut out = String::with_capacity(unified.len());
    for line in unified.lines() {
        let escaped = html_escape(line);
        if line.starts_with("@@") {
            out.push_str(&format!("<span class=\"hunk\">{escaped}</span>\n"));
        } else if line.starts_with('+') {
            out.push_str(&format!("<span class=\"add\">{escaped}</span>\n"));
        } else if line.starts_with('-') {
            out.push_str(&format!("<span class=\"del\">{escaped}</span>\n"));
        } else {
            out.push_str(&escaped);
            out.push('\n');
        }
    }
    out
}

/// Inputs for the diff report
pub struct DiffReport<'a> {
    pub old_db: &'a Path,
    pub new_db: &'a Path,
    pub changes: &'a DefinitionChanges,
    /// Per-table row changes; empty when data comparison did not run
    pub data: &'a [(String, RowChanges)],
}

impl DiffReport<'_> {
    pub fn render(&self) -> String {
        let mut sections = String::new();

        if !self.changes.added.is_empty() {
            sections.push_str("<h2>Added objects</h2>\n<ul class=\"objects\">\n");
            for object in &self.changes.added {
                sections.push_str(&format!("<li>{}</li>\n", html_escape(&object.to_string())));
            }
            sections.push_str("</ul>\n");
        }
        if !self.changes.removed.is_empty() {
            sections.push_str("<h2>Removed objects</h2>\n<ul class=\"objects\">\n");
            for object in &self.changes.removed {
                sections.push_str(&format!("<li>{}</li>\n", html_escape(&object.to_string())));
            }
            sections.push_str("</ul>\n");
        }
        if !self.changes.changed.is_empty() {
            sections.push_str("<h2>Changed definitions</h2>\n");
            for changed in &self.changes.changed {
                sections.push_str(&format!(
                    "<h3>{}</h3>\n<p class=\"meta\">+{}, -{}</p>\n<pre class=\"diff\">{}</pre>\n",
                    html_escape(&changed.object.to_string()),
                    changed.additions,
                    changed.deletions,
                    colorize_unified(&changed.unified),
                ));
            }
        }
        if !self.data.is_empty() {
            sections.push_str("<h2>Table data</h2>\n");
            for (table, rows) in self.data {
                sections.push_str(&format!("<h3>{}</h3>\n", html_escape(table)));
                if !rows.has_changes() {
                    sections.push_str("<p class=\"meta\">No row differences.</p>\n");
                    continue;
                }
                sections.push_str("<pre class=\"diff\">");
                for row in &rows.only_old {
                    sections.push_str(&format!(
                        "<span class=\"del\">- {}</span>\n",
                        html_escape(&row.join(" | "))
                    ));
                }
                for row in &rows.only_new {
                    sections.push_str(&format!(
                        "<span class=\"add\">+ {}</span>\n",
                        html_escape(&row.join(" | "))
                    ));
                }
                sections.push_str("</pre>\n");
                if rows.truncated {
                    sections.push_str(&format!(
                        "<p class=\"meta\">Row list truncated at {MAX_DATA_ROWS} rows per side.</p>\n"
                    ));
                }
            }
        }

        fill(
            DIFF_TEMPLATE,
            &[
                ("title", "Database diff".to_string()),
                ("generated", generated_line()),
                ("old_db", html_escape(&self.old_db.display().to_string())),
                ("new_db", html_escape(&self.new_db.display().to_string())),
                ("added_count", self.changes.added.len().to_string()),
                ("removed_count", self.changes.removed.len().to_string()),
                ("changed_count", self.changes.changed.len().to_string()),
                ("unchanged_count", self.changes.unchanged.to_string()),
                ("sections", sections),
            ],
        )
    }
}

/// Inputs for the query-usage report
pub struct UsageReport<'a> {
    pub database: &'a Path,
    /// How many queries were examined
    pub candidates: usize,
    pub unused: &'a [String],
}

impl UsageReport<'_> {
    pub fn render(&self) -> String {
        let (summary, table) = if self.unused.is_empty() {
            (
                format!(
                    "All {} candidate queries are referenced at least once.",
                    self.candidates
                ),
                "<p class=\"none\">Nothing to clean up.</p>\n".to_string(),
            )
        } else {
            let mut table = String::from("<table>\n<tr><th>Unused query</th></tr>\n");
            for name in self.unused {
                table.push_str(&format!("<tr><td>{}</td></tr>\n", html_escape(name)));
            }
            table.push_str("</table>\n");
            (
                format!(
                    "{} of {} candidate queries are referenced nowhere.",
                    self.unused.len(),
                    self.candidates
                ),
                table,
            )
        };

        fill(
            USAGE_TEMPLATE,
            &[
                ("title", "Query usage".to_string()),
                ("generated", generated_line()),
                ("database", html_escape(&self.database.display().to_string())),
                ("summary", summary),
                ("table", table),
            ],
        )
    }
}

/// Timing statistics for one benchmarked query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTiming {
    pub name: String,
    pub runs: usize,
    pub min_ms: f64,
    pub avg_ms: f64,
    pub max_ms: f64,
}

impl QueryTiming {
    pub fn from_samples(name: impl Into<String>, samples: &[Duration]) -> Self {
        let name = name.into();
        if samples.is_empty() {
            return Self {
                name,
                runs: 0,
                min_ms: 0.0,
                avg_ms: 0.0,
                max_ms: 0.0,
            };
        }
        let ms: Vec<f64> = samples.iter().map(|d| d.as_secs_f64() * 1000.0).collect();
        let min_ms = ms.iter().copied().fold(f64::INFINITY, f64::min);
        let max_ms = ms.iter().copied().fold(0.0, f64::max);
        let avg_ms = ms.iter().sum::<f64>() / ms.len() as f64;
        Self {
            name,
            runs: samples.len(),
            min_ms,
            avg_ms,
            max_ms,
        }
    }
}

/// Inputs for the benchmark report
pub struct BenchmarkReport<'a> {
    pub database: &'a Path,
    pub runs: u32,
    pub timings: &'a [QueryTiming],
}

impl BenchmarkReport<'_> {
    pub fn render(&self) -> String {
        let mut rows = String::new();
        for timing in self.timings {
            rows.push_str(&format!(
                "  <tr><td>{}</td><td class=\"num\">{:.1}</td><td class=\"num\">{:.1}</td><td class=\"num\">{:.1}</td></tr>\n",
                html_escape(&timing.name),
                timing.min_ms,
                timing.avg_ms,
                timing.max_ms,
            ));
        }

        let max_avg = self
            .timings
            .iter()
            .map(|t| t.avg_ms)
            .fold(0.0_f64, f64::max);
        let mut bars = String::new();
        for timing in self.timings {
            let width = if max_avg > 0.0 {
                timing.avg_ms / max_avg * 60.0
            } else {
                0.0
            };
            bars.push_str(&format!(
                "  <div class=\"chart-row\"><span class=\"chart-label\">{}</span><span class=\"chart-bar\" style=\"width: {:.1}%\"></span><span class=\"chart-value\">{:.1} ms</span></div>\n",
                html_escape(&timing.name),
                width,
                timing.avg_ms,
            ));
        }

        let labels: Vec<&str> = self.timings.iter().map(|t| t.name.as_str()).collect();
        let averages: Vec<f64> = self.timings.iter().map(|t| t.avg_ms).collect();
        // < keeps a hostile query name from closing the script block.
        let chart_json = serde_json::json!({ "labels": labels, "avg_ms": averages })
            .to_string()
            .replace('<', "\\u003c");

        fill(
            BENCHMARK_TEMPLATE,
            &[
                ("title", "Query benchmark".to_string()),
                ("generated", generated_line()),
                ("database", html_escape(&self.database.display().to_string())),
                ("runs", self.runs.to_string()),
                ("rows", rows),
                ("bars", bars),
                ("chart_json", chart_json),
            ],
        )
    }
}

/// Write a rendered report, creating parent directories as needed.
pub fn write_report(path: &Path, html: &str) -> AccdevResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, html)?;
    Ok(())
}

/// Default output path for a report, under the configured report directory.
pub fn default_report_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!(
        "{stem}-{}.html",
        Local::now().format("%Y%m%d-%H%M%S")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff;
    use crate::object::{ObjectKind, ObjectRef};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn escapes_html_significant_characters() {
        assert_eq!(
            html_escape(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn fill_replaces_every_occurrence() {
        let out = fill("{{a}} and {{a}} and {{b}}", &[("a", "1".into()), ("b", "2".into())]);
        assert_eq!(out, "1 and 1 and 2");
    }

    #[test]
    fn diff_report_escapes_definition_text() {
        let old: BTreeMap<ObjectRef, String> = [(
            ObjectRef::new(ObjectKind::Query, "qryEvil"),
            "SELECT '<script>alert(1)</script>';\n".to_string(),
        )]
        .into_iter()
        .collect();
        let new: BTreeMap<ObjectRef, String> = [(
            ObjectRef::new(ObjectKind::Query, "qryEvil"),
            "SELECT 2;\n".to_string(),
        )]
        .into_iter()
        .collect();
        let changes = diff::diff_definitions(&old, &new);

        let html = DiffReport {
            old_db: Path::new("old.accdb"),
            new_db: Path::new("new.accdb"),
            changes: &changes,
            data: &[],
        }
        .render();

        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("qryEvil"));
        assert!(html.contains("<span class=\"hunk\">"));
    }

    #[test]
    fn diff_report_counts_each_category() {
        let old: BTreeMap<ObjectRef, String> = [
            (ObjectRef::new(ObjectKind::Query, "qryOld"), "a\n".to_string()),
            (ObjectRef::new(ObjectKind::Query, "qrySame"), "s\n".to_string()),
        ]
        .into_iter()
        .collect();
        let new: BTreeMap<ObjectRef, String> = [
            (ObjectRef::new(ObjectKind::Query, "qryNew"), "b\n".to_string()),
            (ObjectRef::new(ObjectKind::Query, "qrySame"), "s\n".to_string()),
        ]
        .into_iter()
        .collect();
        let changes = diff::diff_definitions(&old, &new);

        let html = DiffReport {
            old_db: Path::new("old.accdb"),
            new_db: Path::new("new.accdb"),
            changes: &changes,
            data: &[],
        }
        .render();

        assert!(html.contains("Added objects"));
        assert!(html.contains("Removed objects"));
        assert!(html.contains("qryNew"));
        assert!(html.contains("qryOld"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn diff_report_renders_row_differences() {
        let changes = DefinitionChanges::default();
        let mut rows = RowChanges::default();
        rows.only_old.push(vec!["1".to_string(), "alpha".to_string()]);
        rows.only_new.push(vec!["1".to_string(), "beta".to_string()]);

        let data = vec![("Customers".to_string(), rows)];
        let html = DiffReport {
            old_db: Path::new("old.accdb"),
            new_db: Path::new("new.accdb"),
            changes: &changes,
            data: &data,
        }
        .render();

        assert!(html.contains("Customers"));
        assert!(html.contains("- 1 | alpha"));
        assert!(html.contains("+ 1 | beta"));
    }

    #[test]
    fn usage_report_lists_unused_queries() {
        let unused = vec!["qryDead".to_string(), "qryStale".to_string()];
        let html = UsageReport {
            database: Path::new("app.accdb"),
            candidates: 10,
            unused: &unused,
        }
        .render();

        assert!(html.contains("2 of 10"));
        assert!(html.contains("qryDead"));
        assert!(html.contains("qryStale"));
    }

    #[test]
    fn usage_report_with_nothing_unused() {
        let html = UsageReport {
            database: Path::new("app.accdb"),
            candidates: 4,
            unused: &[],
        }
        .render();

        assert!(html.contains("All 4 candidate queries"));
        assert!(html.contains("Nothing to clean up"));
    }

    #[test]
    fn timing_statistics_from_samples() {
        let timing = QueryTiming::from_samples(
            "qryA",
            &[
                Duration::from_millis(10),
                Duration::from_millis(30),
                Duration::from_millis(20),
            ],
        );
        assert_eq!(timing.runs, 3);
        assert!((timing.min_ms - 10.0).abs() < 0.001);
        assert!((timing.avg_ms - 20.0).abs() < 0.001);
        assert!((timing.max_ms - 30.0).abs() < 0.001);
    }

    #[test]
    fn benchmark_report_embeds_chart_data() {
        let timings = vec![
            QueryTiming::from_samples("qryFast", &[Duration::from_millis(5)]),
            QueryTiming::from_samples("qrySlow", &[Duration::from_millis(50)]),
        ];
        let html = BenchmarkReport {
            database: Path::new("app.accdb"),
            runs: 5,
            timings: &timings,
        }
        .render();

        assert!(html.contains("qryFast"));
        assert!(html.contains("\"labels\""));
        assert!(html.contains("\"avg_ms\""));
        assert!(html.contains("chart-bar"));
        assert!(html.contains("5 runs per query"));
    }

    #[test]
    fn write_report_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports/sub/out.html");
        write_report(&path, "<html></html>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
    }

    #[test]
    fn default_report_path_is_dated_html() {
        let path = default_report_path(Path::new("reports"), "diff");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("diff-"));
        assert!(name.ends_with(".html"));
        assert!(path.starts_with("reports"));
    }
}
