//! Record store: outreach records partitioned into status collections.
//!
//! A record's collection is its workflow state. The `RecordStore` trait is the
//! only way the generator, review, and sender touch persisted records, so the
//! filesystem backing can be swapped for the in-memory fake in tests.
mod fs;
#[cfg(test)]
mod memory;

pub use fs::FsStore;
#[cfg(test)]
pub(crate) use memory::MemoryStore;

use crate::error::Result;
use crate::record::OutreachRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Status collections. Presence in any of these marks an award processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Drafts,
    Approved,
    Sent,
    Skipped,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Drafts,
        Collection::Approved,
        Collection::Sent,
        Collection::Skipped,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Drafts => "drafts",
            Collection::Approved => "approved",
            Collection::Sent => "sent",
            Collection::Skipped => "skipped",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value access to outreach records keyed by award id.
///
/// Writes and moves overwrite an existing destination record (last write
/// wins). Collections are created on first write.
pub trait RecordStore {
    /// Award ids in a collection, sorted ascending.
    fn list(&self, collection: Collection) -> Result<Vec<String>>;

    fn read(&self, collection: Collection, award_id: &str) -> Result<Option<OutreachRecord>>;

    fn write(&self, collection: Collection, record: &OutreachRecord) -> Result<()>;

    /// Delete a record; `NotFound` if it is absent.
    fn remove(&self, collection: Collection, award_id: &str) -> Result<()>;

    /// Move a record between collections as a single rename; `NotFound` if the
    /// source is absent.
    fn move_record(&self, award_id: &str, from: Collection, to: Collection) -> Result<()>;

    /// The collection currently holding `award_id`, checked in workflow order.
    fn locate(&self, award_id: &str) -> Result<Option<Collection>> {
        for collection in Collection::ALL {
            if self.read(collection, award_id)?.is_some() {
                return Ok(Some(collection));
            }
        }
        Ok(None)
    }

    fn is_processed(&self, award_id: &str) -> Result<bool> {
        Ok(self.locate(award_id)?.is_some())
    }

    /// Every award id present in any status collection.
    fn processed_ids(&self) -> Result<BTreeSet<String>> {
        let mut ids = BTreeSet::new();
        for collection in Collection::ALL {
            ids.extend(self.list(collection)?);
        }
        Ok(ids)
    }

    fn count(&self, collection: Collection) -> Result<usize> {
        Ok(self.list(collection)?.len())
    }

    /// All records in a collection, sorted by award id.
    fn read_all(&self, collection: Collection) -> Result<Vec<OutreachRecord>> {
        let mut records = Vec::new();
        for award_id in self.list(collection)? {
            if let Some(record) = self.read(collection, &award_id)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}
