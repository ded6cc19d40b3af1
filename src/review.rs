//! Review state machine.
//!
//! Records only leave `drafts` through a human decision: approve moves to
//! `approved`, skip moves to `skipped`. Edits rewrite subject and body in place
//! and never change collection membership; sent and skipped records are not
//! editable.
//!
//! Navigation over a listing is a pure reducer so the terminal front-end stays
//! a thin shell: it maps keys to actions, feeds them to [`reduce_review`] or
//! [`reduce_explore`], and applies any returned effect to the store.
use crate::error::{OutreachError, Result};
use crate::record::OutreachRecord;
use crate::store::{Collection, RecordStore};
use std::collections::BTreeSet;

/// Human decisions on a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Skip,
}

impl Decision {
    pub fn target(self) -> Collection {
        match self {
            Decision::Approve => Collection::Approved,
            Decision::Skip => Collection::Skipped,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Skip => "skip",
        }
    }
}

/// Move a draft to approved or skipped.
pub fn apply_decision<S: RecordStore + ?Sized>(
    store: &S,
    award_id: &str,
    decision: Decision,
) -> Result<Collection> {
    match store.locate(award_id)? {
        Some(Collection::Drafts) => {}
        Some(collection) => {
            return Err(OutreachError::InvalidTransition {
                action: decision.verb(),
                award_id: award_id.to_string(),
                collection,
            })
        }
        None => {
            return Err(OutreachError::NotFound {
                collection: Collection::Drafts,
                award_id: award_id.to_string(),
            })
        }
    }
    let target = decision.target();
    store.move_record(award_id, Collection::Drafts, target)?;
    tracing::info!(award_id, to = %target, "review decision applied");
    Ok(target)
}

/// Rewrite subject and body of a draft or approved record.
pub fn edit_record<S: RecordStore + ?Sized>(
    store: &S,
    collection: Collection,
    award_id: &str,
    subject: &str,
    body: &str,
) -> Result<OutreachRecord> {
    if !matches!(collection, Collection::Drafts | Collection::Approved) {
        return Err(OutreachError::InvalidTransition {
            action: "edit",
            award_id: award_id.to_string(),
            collection,
        });
    }
    let mut record = store
        .read(collection, award_id)?
        .ok_or_else(|| OutreachError::NotFound {
            collection,
            award_id: award_id.to_string(),
        })?;
    record.subject = subject.trim().to_string();
    record.body = body.trim_end().to_string();
    store.write(collection, &record)?;
    Ok(record)
}

/// Render a record as an editor buffer: a `Subject:` line, a blank line, then
/// the body.
pub fn edit_buffer(record: &OutreachRecord) -> String {
    format!("Subject: {}\n\n{}\n", record.subject, record.body)
}

/// Parse an editor buffer back into `(subject, body)`. Returns `None` when the
/// subject line is missing or either part is empty.
pub fn parse_edit_buffer(text: &str) -> Option<(String, String)> {
    let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
    let subject = first.strip_prefix("Subject:")?.trim().to_string();
    let body = rest.trim_matches('\n').trim_end().to_string();
    if subject.is_empty() || body.trim().is_empty() {
        return None;
    }
    Some((subject, body))
}

/// Ephemeral cursor over one collection's listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewState {
    pub collection: Collection,
    pub ids: Vec<String>,
    pub index: usize,
    pub message: Option<String>,
}

impl ReviewState {
    pub fn new(collection: Collection, ids: Vec<String>) -> Self {
        Self {
            collection,
            ids,
            index: 0,
            message: None,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.ids.get(self.index).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    Next,
    Prev,
    Approve,
    Skip,
    Edit,
    /// Replace the listing after the store changed underneath.
    Reload(Vec<String>),
}

/// Work the shell must perform against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewEffect {
    Approve(String),
    Skip(String),
    Edit(String),
}

fn clamp(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        index.min(len - 1)
    }
}

pub fn reduce_review(
    mut state: ReviewState,
    action: ReviewAction,
) -> (ReviewState, Option<ReviewEffect>) {
    state.message = None;
    match action {
        ReviewAction::Next => {
            state.index = clamp(state.index + 1, state.ids.len());
            (state, None)
        }
        ReviewAction::Prev => {
            state.index = state.index.saturating_sub(1);
            (state, None)
        }
        ReviewAction::Reload(ids) => {
            state.ids = ids;
            state.index = clamp(state.index, state.ids.len());
            (state, None)
        }
        ReviewAction::Approve | ReviewAction::Skip => {
            let decision = if action == ReviewAction::Approve {
                Decision::Approve
            } else {
                Decision::Skip
            };
            if state.collection != Collection::Drafts {
                state.message = Some(format!(
                    "cannot {} from {}; only drafts are reviewable",
                    decision.verb(),
                    state.collection
                ));
                return (state, None);
            }
            let Some(award_id) = state.current().map(str::to_string) else {
                state.message = Some("nothing to review".to_string());
                return (state, None);
            };
            state.ids.remove(state.index);
            state.index = clamp(state.index, state.ids.len());
            let (effect, label) = match decision {
                Decision::Approve => (ReviewEffect::Approve(award_id.clone()), "approved"),
                Decision::Skip => (ReviewEffect::Skip(award_id.clone()), "skipped"),
            };
            state.message = Some(format!("{award_id} {label}"));
            (state, Some(effect))
        }
        ReviewAction::Edit => {
            if !matches!(state.collection, Collection::Drafts | Collection::Approved) {
                state.message = Some(format!("{} records are read-only", state.collection));
                return (state, None);
            }
            match state.current().map(str::to_string) {
                Some(award_id) => (state, Some(ReviewEffect::Edit(award_id))),
                None => {
                    state.message = Some("nothing to edit".to_string());
                    (state, None)
                }
            }
        }
    }
}

/// Ephemeral cursor over candidate awards in explore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreState {
    pub ids: Vec<String>,
    pub index: usize,
    pub staged: BTreeSet<String>,
    pub message: Option<String>,
}

impl ExploreState {
    pub fn new(ids: Vec<String>, staged: BTreeSet<String>) -> Self {
        Self {
            ids,
            index: 0,
            staged,
            message: None,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.ids.get(self.index).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExploreAction {
    Next,
    Prev,
    Stage,
    Reload {
        ids: Vec<String>,
        staged: BTreeSet<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExploreEffect {
    Stage(String),
}

pub fn reduce_explore(
    mut state: ExploreState,
    action: ExploreAction,
) -> (ExploreState, Option<ExploreEffect>) {
    state.message = None;
    match action {
        ExploreAction::Next => {
            state.index = clamp(state.index + 1, state.ids.len());
            (state, None)
        }
        ExploreAction::Prev => {
            state.index = state.index.saturating_sub(1);
            (state, None)
        }
        ExploreAction::Reload { ids, staged } => {
            state.ids = ids;
            state.staged = staged;
            state.index = clamp(state.index, state.ids.len());
            (state, None)
        }
        ExploreAction::Stage => {
            let Some(award_id) = state.current().map(str::to_string) else {
                state.message = Some("nothing to stage".to_string());
                return (state, None);
            };
            if !state.staged.insert(award_id.clone()) {
                state.message = Some(format!("{award_id} already staged"));
                return (state, None);
            }
            state.message = Some(format!("{award_id} staged"));
            state.index = clamp(state.index + 1, state.ids.len());
            (state, Some(ExploreEffect::Stage(award_id)))
        }
    }
}

#[cfg(test)]
#[path = "review_tests.rs"]
mod tests;
