/// Email body templates
///
/// Both bodies share the same greeting and sign-off; the plain body embeds
/// the plain-text report and the HTML body embeds the HTML tables.
use crate::report::escape_html;

/// Stylesheet inlined into every HTML body
pub const HTML_STYLES: &str = r#"<style>
    body { font-family: Calibri, Arial, sans-serif; font-size: 11pt; color: #333; }
    table { border-collapse: collapse; width: 100%; margin-bottom: 20px; font-family: Arial, sans-serif; font-size: 14px; }
    th { background-color: #f2f2f2; font-weight: bold; text-align: center; color: black; }
    td { background-color: #ffffff; }
    th, td { border: 1px solid #000; padding: 8px; text-align: left; }
    tr:nth-child(even) { background-color: #f2f2f2; }
    .task-table-header th { text-align: center; }
    td.centered { text-align: center; }
    .summary-row { font-weight: bold; background-color: #f9f9f9; }
    .summary-header th { background-color: #f2f2f2; }
    h3 { font-family: Calibri, Arial, sans-serif; font-size: 12pt; font-weight: bold; color: #333; background-color: #e7e7e7; padding: 8px; margin-top: 25px; margin-bottom: 0; text-align: center; border: 1px solid #bbb; border-bottom: none; }
    p { font-family: Calibri, Arial, sans-serif; font-size: 11pt; color: #333; margin-bottom: 10px; }
    .email-body { padding: 15px; }
</style>"#;

/// Plain-text body around a formatted report
pub fn plain_body(intro: &str, report: &str, sender_name: &str) -> String {
    format!("Dear Team,\n\n{}\n\n{}\n\nBest Regards,\n{}", intro, report, sender_name)
}

/// HTML document around the report tables
///
/// `report_html` is inserted as-is; `intro` and `sender_name` are escaped.
pub fn html_body(intro: &str, report_html: &str, sender_name: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n{}\n</head>\n<body>\n\
         <div class=\"email-body\">\n<p>Dear Team,</p>\n<p>{}</p>\n{}\n<p>Best Regards,<br>{}</p>\n</div>\n\
         </body>\n</html>",
        HTML_STYLES,
        escape_html(intro),
        report_html,
        escape_html(sender_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_body_layout() {
        let body = plain_body("Please find below the Daily Allocation for 18 March 2024:", "\nISB:\n- a (b)", "Falak");
        assert_eq!(
            body,
            "Dear Team,\n\nPlease find below the Daily Allocation for 18 March 2024:\n\n\nISB:\n- a (b)\n\nBest Regards,\nFalak"
        );
    }

    #[test]
    fn test_html_body_embeds_report_and_styles() {
        let body = html_body("Intro", "<table></table>", "R & D");
        assert!(body.contains(HTML_STYLES));
        assert!(body.contains("<p>Intro</p>\n<table></table>"));
        assert!(body.contains("<p>Best Regards,<br>R &amp; D</p>"));
    }
}
