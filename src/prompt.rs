//! Prompt composition for draft generation.
//!
//! Pure string assembly: the same award and variant always produce the same
//! prompt.
use crate::awards::AwardRecord;
use crate::variants::SelectedVariant;
use serde_json::{json, Value};

const OUTREACH_EMAIL: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/prompts/outreach_email.md"
));

/// Longest abstract excerpt placed in a prompt, in bytes.
const ABSTRACT_LIMIT: usize = 4000;

/// Structured-output contract: exactly a `subject` and a `body` string.
pub fn email_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "subject": { "type": "string" },
            "body": { "type": "string" }
        },
        "required": ["subject", "body"],
        "additionalProperties": false
    })
}

pub fn build_prompt(award: &AwardRecord, variant: &SelectedVariant) -> String {
    let program_line = award
        .program
        .as_deref()
        .map(|program| format!("Program: {program}"))
        .unwrap_or_default();
    let pi_name = if award.pi_name.is_empty() {
        "the principal investigator"
    } else {
        award.pi_name.as_str()
    };
    OUTREACH_EMAIL
        .replace("{award_title}", &award.title)
        .replace("{pi_name}", pi_name)
        .replace("{institution}", &award.institution)
        .replace("{award_amount}", &award.amount)
        .replace("{program_line}", &program_line)
        .replace("{abstract}", &truncate_string(&award.abstract_text, ABSTRACT_LIMIT))
        .replace("{template}", &variant.template.content)
        .replace("{description}", &variant.description.content)
        .replace("{call_to_action}", &variant.call_to_action.content)
}

fn truncate_string(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut truncated = String::new();
    for ch in text.chars() {
        if truncated.len() + ch.len_utf8() > max_bytes {
            break;
        }
        truncated.push(ch);
    }
    truncated
}
