use crate::calendar;
use crate::compose::EmailComposer;
use crate::error::AllocationError;
use crate::mailer::Mailer;
use crate::report::{RenderedReport, ReportFormatter};
use crate::source::DataSource;
use crate::types::*;
use chrono::NaiveDate;
use log::{debug, info};

/// Pulls grids, composes the allocation emails and hands them to the transport
///
/// Holds no state between runs; every call to `run` starts from scratch.
pub struct Runner<'a> {
    source: &'a dyn DataSource,
    mailer: &'a dyn Mailer,
    formatter: ReportFormatter,
    composer: EmailComposer,
    skip_empty_reports: bool,
}

impl<'a> Runner<'a> {
    pub fn new(
        source: &'a dyn DataSource,
        mailer: &'a dyn Mailer,
        formatter: ReportFormatter,
        composer: EmailComposer,
    ) -> Self {
        Runner { source, mailer, formatter, composer, skip_empty_reports: false }
    }

    /// Skip a variant whose grid came back empty instead of sending "No tasks available"
    pub fn with_skip_empty_reports(mut self, skip: bool) -> Self {
        self.skip_empty_reports = skip;
        self
    }

    /// Run one invocation for `today`
    ///
    /// Weekends are a no-op. A reply run uses today's grid only; a new run
    /// uses the next working day's grid only. Variants are sent in the given
    /// order and the first transport failure aborts the rest.
    pub fn run(
        &self,
        today: NaiveDate,
        variants: &[Variant],
        in_reply_to: Option<&str>,
    ) -> Result<RunSummary, AllocationError> {
        info!("Processing allocation for date: {}", calendar::long_date(today));

        if calendar::is_weekend(today) {
            info!("Weekend - No tasks to send");
            return Ok(RunSummary::weekend(today));
        }

        let next = calendar::next_working_day(today);
        debug!("next working day is {}", calendar::long_date(next));

        let mut summary = RunSummary::new(today);

        // Fetch each day at most once, and only if a variant needs it
        let mut today_grid: Option<Grid> = None;
        let mut next_grid: Option<Grid> = None;

        for &variant in variants {
            let grid = match variant {
                Variant::Reply => today_grid.get_or_insert_with(|| self.source.fetch_grid(today)),
                Variant::New => next_grid.get_or_insert_with(|| self.source.fetch_grid(next)),
            };

            if grid.is_empty() && self.skip_empty_reports {
                let day = if variant == Variant::Reply { today } else { next };
                info!("Skipping {} email: no data for {}", variant, calendar::long_date(day));
                summary.skipped.push(variant);
                continue;
            }

            let rendered = self.formatter.format(grid);
            let (current, upcoming) = match variant {
                Variant::Reply => (rendered, empty_report()),
                Variant::New => (empty_report(), rendered),
            };

            let email = self.composer.compose(&current, &upcoming, today, next, variant, in_reply_to);
            debug_assert_eq!(email.is_reply(), variant == Variant::Reply);
            info!("Sending {} email: {}", variant, email.subject);
            self.mailer.send(&email)?;

            summary.sent.push(SentEmail { variant, subject: email.subject });
        }

        Ok(summary)
    }
}

/// Placeholder for the report a variant does not carry
fn empty_report() -> RenderedReport {
    RenderedReport { plain: String::new(), html: String::new() }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;
