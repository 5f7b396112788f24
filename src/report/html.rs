//! HTML rendering of a sheet grid.
//!
//! Two independent passes over the grid: an optional summary table found
//! ahead of the first project header, then one table per project header.
//! Unlike the plain-text rendering, every qualifying row is kept and a
//! project header always opens its table, even when no rows follow.

use super::grouping::{is_numeric, is_summary_header, is_summary_row, project_header};
use super::types::ProjectLabels;
use crate::types::{Grid, Row};
use log::debug;

/// Cells that mark a column-header row inside a project table
const TASK_HEADER_MARKERS: [&str; 2] = ["Team Member", "Sr. No."];

/// Label cell the summary columns start from
const SUMMARY_LABEL: &str = "Projects";

/// Render the summary block (if any) followed by the project tables
pub fn render_html(grid: &Grid, labels: &ProjectLabels) -> String {
    let mut out: Vec<String> = Vec::new();
    render_summary(grid, labels, &mut out);
    // Independent of the summary pass: a summary row naming a project opens its table too
    render_project_tables(grid, labels, &mut out);
    out.join("\n")
}

/// Escape text for use in element content or attribute values
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn render_summary(grid: &Grid, labels: &ProjectLabels, out: &mut Vec<String>) {
    // Only rows ahead of the first project header can start the summary
    let Some(header_idx) =
        grid.iter().take_while(|row| project_header(row, labels).is_none()).position(is_summary_header)
    else {
        return;
    };

    let header = &grid[header_idx];
    let start = header.iter().position(|c| c == SUMMARY_LABEL).unwrap_or(0);
    debug!("summary header at row {}, columns from {}", header_idx, start);

    out.push("<table class=\"summary\">".to_string());
    out.push(format!(
        "<tr class=\"summary-header\">{}</tr>",
        header[start..].iter().map(|c| format!("<th>{}</th>", escape_html(c))).collect::<String>()
    ));

    for row in grid[header_idx + 1..].iter().take_while(|row| is_summary_row(row)) {
        let cells: String = row
            .iter()
            .skip(start)
            .map(|c| {
                if is_numeric(c) {
                    format!("<td class=\"centered\">{}</td>", escape_html(c))
                } else {
                    format!("<td>{}</td>", escape_html(c))
                }
            })
            .collect();
        out.push(format!("<tr class=\"summary-row\">{}</tr>", cells));
    }

    out.push("</table>".to_string());
}

fn render_project_tables(grid: &[Row], labels: &ProjectLabels, out: &mut Vec<String>) {
    let mut table_open = false;

    for row in grid {
        if let Some(name) = project_header(row, labels) {
            if table_open {
                out.push("</table>".to_string());
            }
            out.push(format!("<h3>{}</h3>", escape_html(name)));
            out.push("<table>".to_string());
            table_open = true;
        } else if table_open && row.len() > 1 {
            out.push(table_row(row));
        }
    }

    if table_open {
        out.push("</table>".to_string());
    }
}

/// Column-header or data row; the first cell (row number column) is dropped
fn table_row(row: &Row) -> String {
    let is_header = row.iter().any(|c| TASK_HEADER_MARKERS.contains(&c.as_str()));
    let tag = if is_header { "th" } else { "td" };
    let cells: String = row[1..].iter().map(|c| format!("<{tag}>{}</{tag}>", escape_html(c))).collect();
    if is_header {
        format!("<tr class=\"task-table-header\">{}</tr>", cells)
    } else {
        format!("<tr>{}</tr>", cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn labels() -> ProjectLabels {
        ProjectLabels::new(vec!["ISB", "Adhoc"])
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & <b> \"c\" 'd'"), "a &amp; &lt;b&gt; &quot;c&quot; &#39;d&#39;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_header_and_data_rows_drop_first_cell() {
        let grid = vec![
            row(&["", "", "", "ISB"]),
            row(&["Sr. No.", "Team Member", "Task"]),
            row(&["1", "Asha", "Login & signup"]),
        ];
        let html = render_html(&grid, &labels());
        assert_eq!(
            html,
            "<h3>ISB</h3>\n<table>\n\
             <tr class=\"task-table-header\"><th>Team Member</th><th>Task</th></tr>\n\
             <tr><td>Asha</td><td>Login &amp; signup</td></tr>\n</table>"
        );
    }

    #[test]
    fn test_empty_project_still_opens_table() {
        let grid = vec![row(&["", "", "", "ISB"]), row(&["", "", "", "Adhoc"]), row(&["1", "x"])];
        let html = render_html(&grid, &labels());
        assert_eq!(html, "<h3>ISB</h3>\n<table>\n</table>\n<h3>Adhoc</h3>\n<table>\n<tr><td>x</td></tr>\n</table>");
    }

    #[test]
    fn test_rows_before_first_project_are_not_tabled() {
        let grid = vec![row(&["1", "stray"]), row(&["", "", "", "ISB"])];
        let html = render_html(&grid, &labels());
        assert!(!html.contains("stray"));
    }

    #[test]
    fn test_summary_block_rendered_before_projects() {
        let grid = vec![
            row(&["", "", "", "Projects", "WIP", "Done"]),
            row(&["", "", "", "ISB", "3", "1"]),
            row(&["", "", "", "Adhoc", "", "2"]),
            row(&["notes"]),
            row(&["", "", "", "ISB"]),
            row(&["1", "Asha"]),
        ];
        let html = render_html(&grid, &labels());
        let expected_summary = "<table class=\"summary\">\n\
             <tr class=\"summary-header\"><th>Projects</th><th>WIP</th><th>Done</th></tr>\n\
             <tr class=\"summary-row\"><td>ISB</td><td class=\"centered\">3</td><td class=\"centered\">1</td></tr>\n\
             <tr class=\"summary-row\"><td>Adhoc</td><td></td><td class=\"centered\">2</td></tr>\n\
             </table>";
        assert!(html.starts_with(expected_summary), "got: {}", html);
        assert!(html.contains("</table>\n<h3>ISB</h3>\n<table>\n</table>\n<h3>Adhoc</h3>\n<table>\n</table>\n<h3>ISB</h3>"));
        assert!(html.ends_with("<h3>ISB</h3>\n<table>\n<tr><td>Asha</td></tr>\n</table>"));
    }

    #[test]
    fn test_summary_after_first_project_is_ignored() {
        let grid = vec![row(&["", "", "", "ISB"]), row(&["", "", "", "Projects", "WIP"]), row(&["", "", "", "ISB", "3"])];
        let html = render_html(&grid, &labels());
        assert!(!html.contains("class=\"summary\""));
    }

    #[test]
    fn test_summary_stops_at_first_non_summary_row() {
        let grid = vec![
            row(&["Projects", "Done"]),
            row(&["", "", "", "ISB", "4"]),
            row(&["", "", "", "Misc", "n/a"]),
            row(&["", "", "", "Ops", "5"]),
        ];
        let html = render_html(&grid, &labels());
        let summary = &html[..html.find("</table>").unwrap()];
        assert!(summary.contains("<td>ISB</td>"));
        assert!(!summary.contains("Misc"));
        assert!(!summary.contains("Ops"));
    }
}
