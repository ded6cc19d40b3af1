//! Draft generation.
//!
//! Each award runs `select variant -> build prompt -> call model -> validate ->
//! persist`. Awards without a valid contact or already present in a status
//! collection never reach the model. A batch collects per-award failures and
//! keeps going; only configuration problems abort it, and those are checked
//! before the first award.
use crate::awards::{has_valid_contact, AwardRecord};
use crate::batch::{BatchProgress, ItemError};
use crate::error::{OutreachError, Result};
use crate::lm::{GeneratedEmail, TextGenerator};
use crate::prompt::{build_prompt, email_schema};
use crate::record::{validate_award_id, OutreachRecord};
use crate::store::{Collection, RecordStore};
use crate::variants::StyleConfig;
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;

/// Outcome of a generation batch.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub generated: Vec<OutreachRecord>,
    pub errors: Vec<ItemError>,
}

pub struct DraftGenerator<'a, S: ?Sized, G: ?Sized, R> {
    store: &'a S,
    model: &'a G,
    variants: &'a StyleConfig,
    rng: R,
}

impl<'a, S, G, R> DraftGenerator<'a, S, G, R>
where
    S: RecordStore + ?Sized,
    G: TextGenerator + ?Sized,
    R: Rng,
{
    pub fn new(store: &'a S, model: &'a G, variants: &'a StyleConfig, rng: R) -> Self {
        Self {
            store,
            model,
            variants,
            rng,
        }
    }

    /// Generate and persist one draft.
    pub fn generate_one(&mut self, award: &AwardRecord) -> Result<OutreachRecord> {
        validate_award_id(&award.id)?;
        if !has_valid_contact(award) {
            return Err(OutreachError::InvalidContact(award.id.clone()));
        }

        let variant = self.variants.select(&mut self.rng)?;
        let prompt = build_prompt(award, &variant);
        tracing::debug!(award_id = %award.id, prompt_bytes = prompt.len(), "built prompt");

        // Checked right before the model call so a manual move in the meantime
        // is not overwritten.
        if let Some(collection) = self.store.locate(&award.id)? {
            return Err(OutreachError::AlreadyProcessed {
                award_id: award.id.clone(),
                collection,
            });
        }
        let email = self.model.generate(&prompt, &email_schema())?;
        let email = validate_email(&award.id, email)?;

        let record = OutreachRecord {
            award_id: award.id.clone(),
            pi_name: award.pi_name.clone(),
            pi_email: award.pi_email.trim().to_string(),
            institution: award.institution.clone(),
            award_title: award.title.clone(),
            award_amount: award.amount.clone(),
            subject: email.subject,
            body: email.body,
            variant_selection: variant.selection(),
            generated_at: Utc::now(),
            sent_at: None,
            resend_id: None,
        };
        self.store.write(Collection::Drafts, &record)?;
        tracing::info!(
            award_id = %record.award_id,
            template = %record.variant_selection.template_id,
            "draft written"
        );
        Ok(record)
    }

    /// Generate drafts for up to `limit` awards, optionally shuffling first so
    /// a limited run samples the whole pool.
    pub fn generate_many<F>(
        &mut self,
        mut awards: Vec<AwardRecord>,
        limit: usize,
        shuffle: bool,
        mut on_progress: F,
    ) -> Result<GenerationReport>
    where
        F: FnMut(BatchProgress<'_>),
    {
        self.variants.ensure_selectable()?;
        if shuffle {
            awards.shuffle(&mut self.rng);
        }
        awards.truncate(limit);

        let total = awards.len();
        let mut report = GenerationReport::default();
        for (idx, award) in awards.iter().enumerate() {
            on_progress(BatchProgress {
                position: idx + 1,
                total,
                award_id: &award.id,
            });
            match self.generate_one(award) {
                Ok(record) => report.generated.push(record),
                Err(error) => {
                    tracing::warn!(award_id = %award.id, %error, "draft generation failed");
                    report
                        .errors
                        .push(ItemError::new(&award.id, &award.pi_email, error));
                }
            }
        }
        Ok(report)
    }
}

fn validate_email(award_id: &str, email: GeneratedEmail) -> Result<GeneratedEmail> {
    let subject = email.subject.trim().to_string();
    let body = email.body.trim().to_string();
    if subject.is_empty() {
        return Err(OutreachError::IncompleteGeneration {
            award_id: award_id.to_string(),
            field: "subject",
        });
    }
    if body.is_empty() {
        return Err(OutreachError::IncompleteGeneration {
            award_id: award_id.to_string(),
            field: "body",
        });
    }
    Ok(GeneratedEmail { subject, body })
}

#[cfg(test)]
#[path = "generate_tests.rs"]
mod tests;
