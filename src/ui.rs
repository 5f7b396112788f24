/// User interface and status output utilities
///
/// This module handles:
/// - Thread-safe console output
/// - Colored terminal text
/// - Run summaries for the command line

use crate::calendar;
use crate::types::RunSummary;
use lazy_static::lazy_static;
use std::io::Write;
use std::sync::Mutex;

/// Execute a function with exclusive access to console output
fn status_lock<F>(f: F)
where
    F: FnOnce(),
{
    lazy_static! {
        static ref LOCK: Mutex<()> = Mutex::new(());
    }
    let _guard = LOCK.lock();
    f();
}

/// Print colored text to terminal, with fallback to plain text
fn print_color(s: &str, fg: term::color::Color) {
    if !really_print_color(s, fg) {
        print!("{}", s);
    }

    fn really_print_color(s: &str, fg: term::color::Color) -> bool {
        if let Some(ref mut t) = term::stdout() {
            if t.fg(fg).is_err() {
                return false;
            }
            let _ = t.attr(term::Attr::Bold);
            if write!(t, "{}", s).is_err() {
                return false;
            }
            let _ = t.reset();
        }

        true
    }
}

/// Print a status message with "allocation: " prefix (thread-safe)
pub fn status(s: &str) {
    status_lock(|| {
        print!("allocation: ");
        println!("{}", s);
    });
}

/// Print an error message with colored "error" prefix
pub fn print_error(msg: &str) {
    status_lock(|| {
        println!();
        print_color("error", term::color::BRIGHT_RED);
        println!(": {}", msg);
        println!();
    });
}

/// One status line per sent or skipped email, or the weekend notice
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    if summary.weekend {
        return vec![format!("{} is a weekend, nothing to send", calendar::long_date(summary.date))];
    }

    let mut lines: Vec<String> =
        summary.sent.iter().map(|s| format!("sent {} email: {}", s.variant, s.subject)).collect();
    lines.extend(summary.skipped.iter().map(|v| format!("skipped {} email: no data", v)));
    if summary.is_noop() && summary.skipped.is_empty() {
        lines.push("nothing to send".to_string());
    }
    lines
}

pub fn print_summary(summary: &RunSummary) {
    for line in summary_lines(summary) {
        status(&line);
    }
}
