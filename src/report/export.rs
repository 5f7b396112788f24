//! JSON export of a formatted grid.
//!
//! Used by `--preview --json` so a sheet can be inspected without sending
//! anything.

use super::types::{ProjectReport, RenderedReport};
use chrono::NaiveDate;
use std::io::Write;

/// Build the JSON document for one formatted grid.
///
/// # Arguments
/// * `date` - Day the grid belongs to, if known
/// * `report` - Grouped task rows (project order preserved)
/// * `rendered` - Both renderings of the same grid
pub fn export_json(date: Option<NaiveDate>, report: &ProjectReport, rendered: &RenderedReport) -> serde_json::Value {
    use serde_json::json;

    json!({
        "date": date.map(|d| d.format("%Y-%m-%d").to_string()),
        "projects": report,
        "plain": rendered.plain,
        "html": rendered.html,
    })
}

/// Pretty-print the JSON document to `writer`
pub fn write_json<W: Write>(
    writer: W,
    date: Option<NaiveDate>,
    report: &ProjectReport,
    rendered: &RenderedReport,
) -> std::io::Result<()> {
    let value = export_json(date, report, rendered);
    serde_json::to_writer_pretty(writer, &value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_keeps_project_order() {
        let mut report = ProjectReport::new();
        report.open("Zeta");
        report.push("Zeta", vec!["1".to_string(), "z".to_string()]);
        report.open("Alpha");
        let rendered = RenderedReport { plain: "p".to_string(), html: "h".to_string() };

        let value = export_json(NaiveDate::from_ymd_opt(2024, 3, 15), &report, &rendered);
        assert_eq!(value["date"], "2024-03-15");
        assert_eq!(value["plain"], "p");
        assert_eq!(value["html"], "h");

        let keys: Vec<&String> = value["projects"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Zeta", "Alpha"]);
        assert_eq!(value["projects"]["Zeta"][0][1], "z");
    }

    #[test]
    fn test_write_json_without_date() {
        let rendered = RenderedReport { plain: String::new(), html: String::new() };
        let mut buf = Vec::new();
        write_json(&mut buf, None, &ProjectReport::new(), &rendered).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert!(parsed["date"].is_null());
        assert_eq!(parsed["projects"], serde_json::json!({}));
    }
}
