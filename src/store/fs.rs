//! Filesystem-backed record store: one pretty JSON file per record.
use super::{Collection, RecordStore};
use crate::error::{OutreachError, Result};
use crate::paths::{record_file_name, DataPaths};
use crate::record::{validate_award_id, OutreachRecord};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FsStore {
    paths: DataPaths,
}

impl FsStore {
    pub fn new(paths: DataPaths) -> Self {
        Self { paths }
    }

    fn record_path(&self, collection: Collection, award_id: &str) -> Result<PathBuf> {
        validate_award_id(award_id)?;
        Ok(self
            .paths
            .collection_dir(collection)
            .join(record_file_name(award_id)))
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| OutreachError::io(parent, err))?;
    }
    Ok(())
}

impl RecordStore for FsStore {
    fn list(&self, collection: Collection) -> Result<Vec<String>> {
        let dir = self.paths.collection_dir(collection);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(OutreachError::io(&dir, err)),
        };
        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| OutreachError::io(&dir, err))?.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if stem.starts_with('.') {
                continue;
            }
            ids.push(stem.to_string());
        }
        ids.sort();
        Ok(ids)
    }

    fn read(&self, collection: Collection, award_id: &str) -> Result<Option<OutreachRecord>> {
        let path = self.record_path(collection, award_id)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(OutreachError::io(&path, err)),
        };
        let record: OutreachRecord =
            serde_json::from_slice(&bytes).map_err(|err| OutreachError::json(&path, err))?;
        // The file name is the record's identity; moves and removals go by it.
        if record.award_id != award_id {
            return Err(OutreachError::IdMismatch {
                path,
                expected: award_id.to_string(),
                found: record.award_id,
            });
        }
        Ok(Some(record))
    }

    fn write(&self, collection: Collection, record: &OutreachRecord) -> Result<()> {
        let path = self.record_path(collection, &record.award_id)?;
        ensure_parent(&path)?;
        let text =
            serde_json::to_string_pretty(record).map_err(|err| OutreachError::json(&path, err))?;
        fs::write(&path, text.as_bytes()).map_err(|err| OutreachError::io(&path, err))
    }

    fn remove(&self, collection: Collection, award_id: &str) -> Result<()> {
        let path = self.record_path(collection, award_id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(OutreachError::NotFound {
                collection,
                award_id: award_id.to_string(),
            }),
            Err(err) => Err(OutreachError::io(&path, err)),
        }
    }

    fn move_record(&self, award_id: &str, from: Collection, to: Collection) -> Result<()> {
        let source = self.record_path(from, award_id)?;
        if !source.is_file() {
            return Err(OutreachError::NotFound {
                collection: from,
                award_id: award_id.to_string(),
            });
        }
        if from == to {
            return Ok(());
        }
        let dest = self.record_path(to, award_id)?;
        ensure_parent(&dest)?;
        fs::rename(&source, &dest).map_err(|err| OutreachError::io(&source, err))?;
        tracing::debug!(award_id, %from, %to, "moved record");
        Ok(())
    }
}
