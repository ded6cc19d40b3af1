//! Staging: awards hand-picked in explore, held until generation.
//!
//! Staged awards are normalized `AwardRecord`s, not outreach records, and do not
//! count as processed.
use crate::awards::{read_award_dir, AwardRecord};
use crate::error::{OutreachError, Result};
use crate::paths::{record_file_name, DataPaths};
use crate::record::validate_award_id;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

fn write_staged_bytes(staging_root: &Path, file_name: &str, bytes: &[u8]) -> Result<()> {
    fs::create_dir_all(staging_root).map_err(|err| OutreachError::io(staging_root, err))?;
    let staging_path = staging_root.join(file_name);
    fs::write(&staging_path, bytes).map_err(|err| OutreachError::io(&staging_path, err))
}

/// Write a normalized award into `staging/`, replacing any earlier copy.
pub fn stage_award(paths: &DataPaths, award: &AwardRecord) -> Result<()> {
    validate_award_id(&award.id)?;
    let staging_root = paths.staging_dir();
    let bytes = serde_json::to_vec_pretty(award)
        .map_err(|err| OutreachError::json(&staging_root, err))?;
    write_staged_bytes(&staging_root, &record_file_name(&award.id), &bytes)?;
    tracing::info!(award_id = %award.id, "staged award");
    Ok(())
}

/// Drop a staged award once it has been drafted. Absent files are ignored.
pub fn unstage_award(paths: &DataPaths, award_id: &str) -> Result<()> {
    validate_award_id(award_id)?;
    let staging_path = paths.staging_dir().join(record_file_name(award_id));
    match fs::remove_file(&staging_path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(OutreachError::io(&staging_path, err)),
    }
}

/// Ids currently staged.
pub fn staged_ids(paths: &DataPaths) -> Result<BTreeSet<String>> {
    Ok(load_staged_awards(paths)?
        .into_iter()
        .map(|award| award.id)
        .collect())
}

/// Every staged award, sorted by file name.
pub fn load_staged_awards(paths: &DataPaths) -> Result<Vec<AwardRecord>> {
    read_award_dir(&paths.staging_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn award(id: &str) -> AwardRecord {
        AwardRecord {
            id: id.to_string(),
            title: "Title".to_string(),
            abstract_text: "Abstract".to_string(),
            pi_name: "Pat Doe".to_string(),
            pi_email: "pat@uni.edu".to_string(),
            institution: "Uni".to_string(),
            amount: "100".to_string(),
            program: Some("CHE".to_string()),
            start_date: None,
        }
    }

    #[test]
    fn staged_awards_round_trip_through_normalization() {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths = DataPaths::new(dir.path().to_path_buf());
        stage_award(&paths, &award("2")).expect("stage");
        stage_award(&paths, &award("1")).expect("stage");
        let loaded = load_staged_awards(&paths).expect("load");
        assert_eq!(loaded, vec![award("1"), award("2")]);
        assert_eq!(
            staged_ids(&paths).expect("ids").into_iter().collect::<Vec<_>>(),
            vec!["1", "2"]
        );
    }

    #[test]
    fn unstage_removes_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths = DataPaths::new(dir.path().to_path_buf());
        stage_award(&paths, &award("3")).expect("stage");
        unstage_award(&paths, "3").expect("unstage");
        unstage_award(&paths, "3").expect("unstage again");
        assert!(staged_ids(&paths).expect("ids").is_empty());
    }

    #[test]
    fn staging_does_not_mark_processed() {
        use crate::store::{FsStore, RecordStore};
        let dir = tempfile::tempdir().expect("temp dir");
        let paths = DataPaths::new(dir.path().to_path_buf());
        stage_award(&paths, &award("9")).expect("stage");
        let store = FsStore::new(paths);
        assert_eq!(store.locate("9").expect("locate"), None);
    }
}
