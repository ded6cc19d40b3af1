//! Batch sending of approved records.
//!
//! Records are dispatched one at a time in award-id order. A confirmed delivery
//! is written to `sent` and then removed from `approved`; the pair is not
//! atomic, so a crash in between leaves the record in both. Failed deliveries
//! stay in `approved` for the next run. A fixed delay separates successive real
//! dispatches and never follows the last one.
use crate::batch::{BatchProgress, ItemError};
use crate::error::{OutreachError, Result};
use crate::mailer::{format_sender, Mailer, OutgoingEmail};
use crate::record::OutreachRecord;
use crate::store::{Collection, RecordStore};
use chrono::{DateTime, Utc};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SendOptions {
    pub limit: usize,
    pub delay: Duration,
    pub dry_run: bool,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
}

/// A dispatched (or, in dry-run, simulated) email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub award_id: String,
    pub recipient: String,
    pub subject: String,
    /// Provider confirmation id; `None` for dry runs.
    pub resend_id: Option<String>,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct SendReport {
    pub sent: Vec<SentEmail>,
    pub errors: Vec<ItemError>,
}

/// Approved records sorted by award id.
pub fn get_approved_emails<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<OutreachRecord>> {
    store.read_all(Collection::Approved)
}

pub struct BatchSender<'a, S: ?Sized> {
    store: &'a S,
    mailer: Option<&'a dyn Mailer>,
}

impl<'a, S: RecordStore + ?Sized> BatchSender<'a, S> {
    /// `mailer` is `None` when no provider credential is configured; only dry
    /// runs are possible then.
    pub fn new(store: &'a S, mailer: Option<&'a dyn Mailer>) -> Self {
        Self { store, mailer }
    }

    pub fn send_approved_emails<F>(&self, options: &SendOptions, on_progress: F) -> Result<SendReport>
    where
        F: FnMut(BatchProgress<'_>),
    {
        self.send_with_sleep(options, on_progress, std::thread::sleep)
    }

    fn send_with_sleep<F, Z>(
        &self,
        options: &SendOptions,
        mut on_progress: F,
        mut sleep: Z,
    ) -> Result<SendReport>
    where
        F: FnMut(BatchProgress<'_>),
        Z: FnMut(Duration),
    {
        let from_email = options
            .from_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty());
        let live = if options.dry_run {
            None
        } else {
            let mailer = self.mailer.ok_or_else(|| {
                OutreachError::Configuration("RESEND_API_KEY is not set".to_string())
            })?;
            if from_email.is_none() {
                return Err(OutreachError::Configuration(
                    "sender address is not set (--from-email or OUTREACH_FROM_EMAIL)".to_string(),
                ));
            }
            Some(mailer)
        };
        let from = format_sender(
            from_email.unwrap_or("dry-run@localhost"),
            options.from_name.as_deref(),
        );

        let mut records = get_approved_emails(self.store)?;
        records.truncate(options.limit);
        let total = records.len();

        let mut report = SendReport::default();
        for (idx, record) in records.into_iter().enumerate() {
            on_progress(BatchProgress {
                position: idx + 1,
                total,
                award_id: &record.award_id,
            });
            let Some(mailer) = live else {
                report.sent.push(SentEmail {
                    award_id: record.award_id.clone(),
                    recipient: record.pi_email.clone(),
                    subject: record.subject.clone(),
                    resend_id: None,
                    sent_at: Utc::now(),
                });
                continue;
            };
            if idx > 0 && !options.delay.is_zero() {
                sleep(options.delay);
            }
            match self.dispatch(mailer, &from, record) {
                Ok(sent) => report.sent.push(sent),
                Err(error) => report.errors.push(error),
            }
        }
        Ok(report)
    }

    fn dispatch(
        &self,
        mailer: &dyn Mailer,
        from: &str,
        mut record: OutreachRecord,
    ) -> Result<SentEmail, ItemError> {
        let email = OutgoingEmail {
            from: from.to_string(),
            to: record.pi_email.clone(),
            subject: record.subject.clone(),
            text: record.body.clone(),
        };
        let resend_id = mailer.send(&email).map_err(|error| {
            tracing::warn!(award_id = %record.award_id, %error, "delivery failed");
            ItemError::new(&record.award_id, &record.pi_email, error)
        })?;

        let sent_at = Utc::now();
        record.mark_sent(sent_at, resend_id.clone());
        if let Err(error) = self.store.write(Collection::Sent, &record) {
            tracing::error!(
                award_id = %record.award_id,
                %resend_id,
                %error,
                "delivered but could not record in sent"
            );
            return Err(ItemError::new(&record.award_id, &record.pi_email, error));
        }
        if let Err(error) = self.store.remove(Collection::Approved, &record.award_id) {
            tracing::warn!(
                award_id = %record.award_id,
                %error,
                "sent record still present in approved"
            );
        }
        tracing::info!(award_id = %record.award_id, %resend_id, "email sent");
        Ok(SentEmail {
            award_id: record.award_id,
            recipient: record.pi_email,
            subject: record.subject,
            resend_id: Some(resend_id),
            sent_at,
        })
    }
}

#[cfg(test)]
#[path = "send_tests.rs"]
mod tests;
