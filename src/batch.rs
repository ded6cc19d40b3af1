//! Types shared by the sequential batch operations (generate, send).
use crate::error::OutreachError;

/// Progress callback payload, emitted before each item is processed.
#[derive(Debug, Clone, Copy)]
pub struct BatchProgress<'a> {
    /// One-based position within the batch.
    pub position: usize,
    pub total: usize,
    pub award_id: &'a str,
}

/// A per-award failure. The batch that produced it kept going.
#[derive(Debug)]
pub struct ItemError {
    pub award_id: String,
    pub recipient: String,
    pub error: OutreachError,
}

impl ItemError {
    pub fn new(award_id: &str, recipient: &str, error: OutreachError) -> Self {
        Self {
            award_id: award_id.to_string(),
            recipient: recipient.to_string(),
            error,
        }
    }
}
