/// Transport seam and its SMTP implementation
///
/// This module handles:
/// - The `Mailer` trait the runner hands composed emails to
/// - Converting an `AllocationEmail` into a lettre `Message`
/// - Single-attempt SMTP delivery with a bounded timeout
/// - A dry-run mailer that prints instead of sending
use crate::compose::{AllocationEmail, ThreadHeaders};
use crate::config::SmtpConfig;
use crate::error::AllocationError;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use log::{debug, info};
use std::time::Duration;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Port that expects TLS from the first byte instead of STARTTLS
const IMPLICIT_TLS_PORT: u16 = 465;

/// Something that delivers a composed email
pub trait Mailer {
    fn send(&self, email: &AllocationEmail) -> Result<(), AllocationError>;
}

/// Build the MIME message: alternative plain/HTML body plus threading headers
pub fn build_message(email: &AllocationEmail) -> Result<Message, AllocationError> {
    let from_address: Address =
        email.from_address.parse().map_err(|e| AllocationError::Address(format!("{}: {}", email.from_address, e)))?;

    let mut builder =
        Message::builder().from(Mailbox::new(Some(email.from_name.clone()), from_address)).subject(email.subject.as_str());

    for recipient in &email.to {
        let mailbox: Mailbox =
            recipient.parse().map_err(|e| AllocationError::Address(format!("{}: {}", recipient, e)))?;
        builder = builder.to(mailbox);
    }

    if let Some(ref cc) = email.cc {
        let mailbox: Mailbox = cc.parse().map_err(|e| AllocationError::Address(format!("{}: {}", cc, e)))?;
        builder = builder.cc(mailbox);
    }

    builder = match &email.thread {
        ThreadHeaders::Opens { message_id } => builder.message_id(Some(message_id.clone())),
        ThreadHeaders::Replies { in_reply_to, references } => {
            builder.in_reply_to(in_reply_to.clone()).references(references.clone())
        }
    };

    builder
        .multipart(MultiPart::alternative_plain_html(email.plain_body.clone(), email.html_body.clone()))
        .map_err(|e| AllocationError::Build(e.to_string()))
}

/// Delivers through an authenticated SMTP relay
pub struct SmtpMailer {
    transport: SmtpTransport,
    host: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, AllocationError> {
        let builder = if config.port == IMPLICIT_TLS_PORT {
            SmtpTransport::relay(&config.host)
        } else {
            SmtpTransport::starttls_relay(&config.host)
        }
        .map_err(|e| AllocationError::Transport(format!("{}: {}", config.host, e)))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(SmtpMailer { transport, host: config.host.clone() })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, email: &AllocationEmail) -> Result<(), AllocationError> {
        let message = build_message(email)?;
        debug!("sending '{}' via {} to {:?}", email.subject, self.host, email.envelope_recipients());

        self.transport.send(&message).map_err(|e| AllocationError::Transport(e.to_string()))?;

        info!("Email sent successfully: {}", email.subject);
        Ok(())
    }
}

/// Prints each email instead of sending it
#[derive(Debug, Default)]
pub struct DryRunMailer;

impl Mailer for DryRunMailer {
    fn send(&self, email: &AllocationEmail) -> Result<(), AllocationError> {
        // Fail the same way the SMTP path would on bad addresses
        build_message(email)?;
        println!("{}", format_dry_run(email));
        Ok(())
    }
}

/// Human-readable envelope, headers and plain body
pub fn format_dry_run(email: &AllocationEmail) -> String {
    let mut out = String::new();
    out.push_str(&format!("From: {}\n", email.from_header()));
    out.push_str(&format!("To: {}\n", email.to_header()));
    if let Some(ref cc) = email.cc {
        out.push_str(&format!("Cc: {}\n", cc));
    }
    out.push_str(&format!("Subject: {}\n", email.subject));
    for (name, value) in email.thread.headers() {
        out.push_str(&format!("{}: {}\n", name, value));
    }
    out.push('\n');
    out.push_str(&email.plain_body);
    out.push('\n');
    out
}
