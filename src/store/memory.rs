//! In-memory record store used by unit tests.
use super::{Collection, RecordStore};
use crate::error::{OutreachError, Result};
use crate::record::{validate_award_id, OutreachRecord};
use std::cell::RefCell;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    records: RefCell<BTreeMap<(Collection, String), OutreachRecord>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Full copy of the store contents for before/after comparisons.
    pub(crate) fn snapshot(&self) -> BTreeMap<(Collection, String), OutreachRecord> {
        self.records.borrow().clone()
    }
}

impl RecordStore for MemoryStore {
    fn list(&self, collection: Collection) -> Result<Vec<String>> {
        Ok(self
            .records
            .borrow()
            .keys()
            .filter(|(c, _)| *c == collection)
            .map(|(_, id)| id.clone())
            .collect())
    }

    fn read(&self, collection: Collection, award_id: &str) -> Result<Option<OutreachRecord>> {
        validate_award_id(award_id)?;
        Ok(self
            .records
            .borrow()
            .get(&(collection, award_id.to_string()))
            .cloned())
    }

    fn write(&self, collection: Collection, record: &OutreachRecord) -> Result<()> {
        validate_award_id(&record.award_id)?;
        self.records
            .borrow_mut()
            .insert((collection, record.award_id.clone()), record.clone());
        Ok(())
    }

    fn remove(&self, collection: Collection, award_id: &str) -> Result<()> {
        self.records
            .borrow_mut()
            .remove(&(collection, award_id.to_string()))
            .map(|_| ())
            .ok_or_else(|| OutreachError::NotFound {
                collection,
                award_id: award_id.to_string(),
            })
    }

    fn move_record(&self, award_id: &str, from: Collection, to: Collection) -> Result<()> {
        let mut records = self.records.borrow_mut();
        let record = records
            .remove(&(from, award_id.to_string()))
            .ok_or_else(|| OutreachError::NotFound {
                collection: from,
                award_id: award_id.to_string(),
            })?;
        records.insert((to, award_id.to_string()), record);
        Ok(())
    }
}
