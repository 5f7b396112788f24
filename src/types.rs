/// Core data structures shared across the service
///
/// This module defines the raw spreadsheet grid, the email variants, and the
/// summary each run hands back to its trigger.
use chrono::NaiveDate;

/// A single spreadsheet cell value, possibly empty
pub type Cell = String;

/// One spreadsheet row; rows in a grid may have different lengths
pub type Row = Vec<Cell>;

/// The raw read result of one sheet, top to bottom
pub type Grid = Vec<Row>;

/// Which of the two allocation emails is being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Variant {
    /// Opens a new thread carrying the next working day's report
    New,
    /// Threads into the email sent earlier for today, carrying today's report
    Reply,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::New => "new",
            Variant::Reply => "reply",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant selection accepted from a trigger (CLI flag or scheduler tick)
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum VariantSelection {
    New,
    Reply,
    /// The scheduled daily run: reply for today, then new for the next working day
    Both,
}

impl VariantSelection {
    /// Variants in the order they are sent
    pub fn variants(&self) -> &'static [Variant] {
        match self {
            VariantSelection::New => &[Variant::New],
            VariantSelection::Reply => &[Variant::Reply],
            VariantSelection::Both => &[Variant::Reply, Variant::New],
        }
    }
}

/// An email handed to the transport during a run
#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub variant: Variant,
    pub subject: String,
}

/// Outcome of one orchestrator invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// The day the run was invoked for
    pub date: NaiveDate,

    /// True when the day was a weekend and nothing was processed
    pub weekend: bool,

    /// Emails handed to the transport, in send order
    pub sent: Vec<SentEmail>,

    /// Variants not sent because their grid was empty and skipping is enabled
    pub skipped: Vec<Variant>,
}

impl RunSummary {
    /// Summary for a day with nothing to do
    pub fn weekend(date: NaiveDate) -> Self {
        Self { date, weekend: true, sent: Vec::new(), skipped: Vec::new() }
    }

    pub fn new(date: NaiveDate) -> Self {
        Self { date, weekend: false, sent: Vec::new(), skipped: Vec::new() }
    }

    /// Check if the run produced no emails at all
    pub fn is_noop(&self) -> bool {
        self.sent.is_empty()
    }
}
