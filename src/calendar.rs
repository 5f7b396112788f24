/// Working-day arithmetic and the date formats used in subjects and headers
use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Check if a date falls on Saturday or Sunday
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The first date strictly after `date` that is not a weekend day
///
/// Never looks more than three days ahead (Friday -> Monday).
pub fn next_working_day(date: NaiveDate) -> NaiveDate {
    let mut next = date;
    loop {
        next = next.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
        if !is_weekend(next) || next == NaiveDate::MAX {
            return next;
        }
    }
}

/// "15 March 2024", as used in subjects and greetings
pub fn long_date(date: NaiveDate) -> String {
    date.format("%d %B %Y").to_string()
}

/// "15 March", the fragment sheet titles are matched on
pub fn sheet_date(date: NaiveDate) -> String {
    date.format("%d %B").to_string()
}

/// "20240315", the fragment embedded in Message-IDs
pub fn compact_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}
