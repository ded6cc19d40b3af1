//! The outreach record: one generated email for one award.
use crate::error::{OutreachError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which style facet items produced a record's body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSelection {
    pub template_id: String,
    pub description_id: String,
    pub cta_id: String,
}

/// A generated email, persisted as `<collection>/<award_id>.json`.
///
/// `generated_at` is fixed at creation. `sent_at` and `resend_id` stay null
/// until the batch sender confirms delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutreachRecord {
    pub award_id: String,
    pub pi_name: String,
    pub pi_email: String,
    pub institution: String,
    pub award_title: String,
    pub award_amount: String,
    pub subject: String,
    pub body: String,
    pub variant_selection: VariantSelection,
    pub generated_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub resend_id: Option<String>,
}

impl OutreachRecord {
    /// Stamp a confirmed delivery. Only the batch sender calls this.
    pub fn mark_sent(&mut self, sent_at: DateTime<Utc>, resend_id: String) {
        self.sent_at = Some(sent_at);
        self.resend_id = Some(resend_id);
    }
}

/// Reject ids that cannot be used as a single file name inside a collection.
pub fn validate_award_id(award_id: &str) -> Result<()> {
    let trimmed = award_id.trim();
    if trimmed.is_empty()
        || trimmed != award_id
        || award_id.starts_with('.')
        || award_id.contains(['/', '\\'])
        || award_id.contains('\0')
    {
        return Err(OutreachError::InvalidAwardId(award_id.to_string()));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_record(award_id: &str) -> OutreachRecord {
    OutreachRecord {
        award_id: award_id.to_string(),
        pi_name: "Ada Lovelace".to_string(),
        pi_email: format!("pi-{award_id}@example.edu"),
        institution: "Example University".to_string(),
        award_title: "Quantum Widgets".to_string(),
        award_amount: "500000".to_string(),
        subject: "Your widget research".to_string(),
        body: "Hello Dr. Lovelace,\n\nWe read about your award.".to_string(),
        variant_selection: VariantSelection {
            template_id: "t1".to_string(),
            description_id: "d1".to_string(),
            cta_id: "c1".to_string(),
        },
        generated_at: DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
            .expect("fixed timestamp")
            .with_timezone(&Utc),
        sent_at: None,
        resend_id: None,
    }
}
