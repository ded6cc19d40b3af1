//! Typed paths into the outreach data root.
//!
//! Centralizing path construction keeps file access consistent across the
//! loader, the record store, and the commands.
use crate::store::Collection;
use std::path::{Path, PathBuf};

/// Default data root when neither `--data-dir` nor `OUTREACH_DATA_DIR` is set.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Convenience wrapper for locating data-root artifacts.
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the `awards/` directory holding year partitions.
    pub fn awards_dir(&self) -> PathBuf {
        self.root.join("awards")
    }

    /// Return the `awards/<year>/` partition path.
    pub fn year_dir(&self, year: &str) -> PathBuf {
        self.awards_dir().join(year)
    }

    /// Return the `staging/` directory of curated, not-yet-generated awards.
    pub fn staging_dir(&self) -> PathBuf {
        self.root.join("staging")
    }

    /// Return the directory backing a status collection.
    pub fn collection_dir(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.as_str())
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    /// Return the `config/outreach.json` settings path.
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir().join("outreach.json")
    }

    /// Return the `config/style_variants.json` path.
    pub fn variants_path(&self) -> PathBuf {
        self.config_dir().join("style_variants.json")
    }
}

/// File name for a record keyed by award id.
pub fn record_file_name(award_id: &str) -> String {
    format!("{award_id}.json")
}
