//! Terminal output helpers

use anyhow::Result;
use dialoguer::Confirm;
use unicode_width::UnicodeWidthStr;

/// Render a plain aligned table with a header row.
///
/// Columns are padded by display width, so East Asian characters in
/// object names keep the columns straight.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let columns = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().take(columns).enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let mut out = String::new();
    let render_row = |cells: &[String]| -> String {
        let mut line = String::new();
        for (i, cell) in cells.iter().take(columns).enumerate() {
            line.push_str(cell);
            if i + 1 < columns {
                line.push_str(&" ".repeat(widths[i].saturating_sub(cell.width()) + 2));
            }
        }
        line.push('\n');
        line
    };

    let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    out.push_str(&render_row(&headers));
    let dashes: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&render_row(&dashes));
    for row in rows {
        out.push_str(&render_row(row));
    }
    out
}

/// Yes/no prompt with a default answer.
pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    let answer = Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?;
    Ok(answer)
}
