//! Domain errors for the outreach pipeline.
//!
//! Command handlers wrap these in `anyhow`; batch operations keep them typed so
//! configuration problems can be told apart from per-award failures.
use crate::store::Collection;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutreachError {
    /// Missing credential, sender address, or selectable variants.
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("{award_id} not found in {collection}")]
    NotFound {
        collection: Collection,
        award_id: String,
    },
    #[error("invalid award id {0:?}")]
    InvalidAwardId(String),
    #[error("award {award_id} already processed (in {collection})")]
    AlreadyProcessed {
        award_id: String,
        collection: Collection,
    },
    #[error("award {0} has no valid PI email")]
    InvalidContact(String),
    #[error("generation for {award_id} returned an empty {field}")]
    IncompleteGeneration { award_id: String, field: &'static str },
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
    #[error("model call failed: {0}")]
    Generation(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("cannot {action} {award_id} while it is in {collection}")]
    InvalidTransition {
        action: &'static str,
        award_id: String,
        collection: Collection,
    },
    #[error("record at {path} names award {found}, expected {expected}")]
    IdMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl OutreachError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    /// Configuration errors abort the invoking command; everything else is
    /// reported per item.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

pub type Result<T, E = OutreachError> = std::result::Result<T, E>;
