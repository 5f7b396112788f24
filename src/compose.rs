//! Email composition.
//!
//! Turns a pair of rendered reports into the allocation email for one
//! variant. Threading identifiers are derived from dates, so a reply can
//! reference the email sent for that day without anything being stored:
//! the "new" email for day D carries `Message-ID` = `message_id(D)`, and the
//! reply sent on day D carries `In-Reply-To`/`References` = `message_id(D)`.

use crate::calendar;
use crate::report::RenderedReport;
use crate::templates;
use crate::types::Variant;
use chrono::NaiveDate;
use log::debug;

const SUBJECT: &str = "Daily Task Allocation";

/// Deterministic Message-ID for the allocation email of `date`
pub fn message_id(date: NaiveDate, domain: &str) -> String {
    format!("<daily-allocation-{}@{}>", calendar::compact_date(date), domain)
}

/// Threading headers carried by an allocation email
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadHeaders {
    /// A new thread; later replies reference this id
    Opens { message_id: String },
    /// A reply into an existing thread
    Replies { in_reply_to: String, references: String },
}

impl ThreadHeaders {
    /// Header name/value pairs in the order they are written
    pub fn headers(&self) -> Vec<(&'static str, &str)> {
        match self {
            ThreadHeaders::Opens { message_id } => vec![("Message-ID", message_id.as_str())],
            ThreadHeaders::Replies { in_reply_to, references } => {
                vec![("In-Reply-To", in_reply_to.as_str()), ("References", references.as_str())]
            }
        }
    }
}

/// A fully composed allocation email, ready for a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationEmail {
    pub variant: Variant,
    pub from_name: String,
    pub from_address: String,
    pub to: Vec<String>,
    pub cc: Option<String>,
    pub subject: String,
    pub thread: ThreadHeaders,
    pub plain_body: String,
    pub html_body: String,
}

impl AllocationEmail {
    /// `From` header value: `Name <address>`
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_address)
    }

    /// `To` header value: every recipient in one comma-separated list
    pub fn to_header(&self) -> String {
        self.to.join(", ")
    }

    /// Every address the message is delivered to (To then Cc)
    pub fn envelope_recipients(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self.to.iter().map(|s| s.as_str()).collect();
        if let Some(ref cc) = self.cc {
            all.push(cc.as_str());
        }
        all
    }

    pub fn is_reply(&self) -> bool {
        matches!(self.thread, ThreadHeaders::Replies { .. })
    }
}

/// Builds allocation emails for a fixed sender and recipient list
#[derive(Debug, Clone)]
pub struct EmailComposer {
    pub sender_name: String,
    pub sender_address: String,
    pub recipients: Vec<String>,
    pub cc: Option<String>,
    /// Domain used only for Message-ID construction
    pub domain: String,
}

impl EmailComposer {
    /// Compose the email for `variant`.
    ///
    /// A reply carries `current` (today's report); a new email carries `next`
    /// (the next working day's report). `in_reply_to` overrides the thread id
    /// a reply points at; it is ignored for new emails.
    pub fn compose(
        &self,
        current: &RenderedReport,
        next: &RenderedReport,
        today: NaiveDate,
        next_working_day: NaiveDate,
        variant: Variant,
        in_reply_to: Option<&str>,
    ) -> AllocationEmail {
        let (subject, intro, thread, report) = match variant {
            Variant::Reply => {
                let day = calendar::long_date(today);
                let id = in_reply_to.map(|s| s.to_string()).unwrap_or_else(|| message_id(today, &self.domain));
                (
                    format!("Re: {} - {}", SUBJECT, day),
                    format!("Please find below the updated Daily Allocation for {}:", day),
                    ThreadHeaders::Replies { in_reply_to: id.clone(), references: id },
                    current,
                )
            }
            Variant::New => {
                let day = calendar::long_date(next_working_day);
                (
                    format!("{} - {}", SUBJECT, day),
                    format!("Please find below the Daily Allocation for {}:", day),
                    ThreadHeaders::Opens { message_id: message_id(next_working_day, &self.domain) },
                    next,
                )
            }
        };

        debug!("composed {} email: {}", variant, subject);

        AllocationEmail {
            variant,
            from_name: self.sender_name.clone(),
            from_address: self.sender_address.clone(),
            to: self.recipients.clone(),
            cc: self.cc.clone(),
            subject,
            thread,
            plain_body: templates::plain_body(&intro, &report.plain, &self.sender_name),
            html_body: templates::html_body(&intro, &report.html, &self.sender_name),
        }
    }
}

#[cfg(test)]
#[path = "compose_test.rs"]
mod compose_test;
